use crate::movement::config::ConfigError;
use glam::Vec3;
use log::info;
use serde::Deserialize;
use std::path::Path;

/// A static box, rotated around world up.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CourseBlock {
    pub center: Vec3,
    pub half_extents: Vec3,
    /// Degrees around +Z
    #[serde(default)]
    pub yaw: f32,
}

impl CourseBlock {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
            yaw: 0.0,
        }
    }
}

/// The level the character runs around in: a handful of boxes and a spawn point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Course {
    #[serde(default)]
    pub name: String,
    pub spawn: Vec3,
    /// Degrees, 0 looks down +X
    #[serde(default)]
    pub spawn_yaw: f32,
    pub blocks: Vec<CourseBlock>,
}

impl Course {
    /// Width of the built-in corridor, wall face to wall face.
    pub const CORRIDOR_WIDTH: f32 = 400.0;
    const WALL_HEIGHT: f32 = 800.0;
    const WALL_THICKNESS: f32 = 50.0;

    /// A floor and two parallel walls along +Y. The walls start at y = 500 and are 2000 long, the
    /// spawn is on the floor facing down the corridor, 100 units from the left wall.
    pub fn corridor() -> Self {
        let half_wall = Vec3::new(Self::WALL_THICKNESS / 2.0, 1000.0, Self::WALL_HEIGHT / 2.0);
        Self {
            name: "corridor".into(),
            spawn: Vec3::new(100.0, 0.0, 97.0),
            spawn_yaw: 90.0,
            blocks: vec![
                // top face at z = 0
                CourseBlock::new(Vec3::new(0.0, 1000.0, -50.0), Vec3::new(2000.0, 3000.0, 50.0)),
                // left wall, face at x = 0
                CourseBlock::new(
                    Vec3::new(-Self::WALL_THICKNESS / 2.0, 1500.0, Self::WALL_HEIGHT / 2.0),
                    half_wall,
                ),
                // right wall, face at x = CORRIDOR_WIDTH
                CourseBlock::new(
                    Vec3::new(
                        Self::CORRIDOR_WIDTH + Self::WALL_THICKNESS / 2.0,
                        1500.0,
                        Self::WALL_HEIGHT / 2.0,
                    ),
                    half_wall,
                ),
            ],
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let course: Course = serde_json::from_str(json)?;
        course.validate()?;
        Ok(course)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let course = Self::from_json_str(&std::fs::read_to_string(path)?)?;
        info!(
            "Loaded course \"{}\" with {} blocks from {}",
            course.name,
            course.blocks.len(),
            path.display()
        );
        Ok(course)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.spawn.is_finite() {
            return Err(ConfigError::Invalid {
                field: "spawn",
                reason: format!("{} is not a finite position", self.spawn),
            });
        }

        if let Some(block) = self
            .blocks
            .iter()
            .find(|block| !block.center.is_finite() || !block.half_extents.cmpgt(Vec3::ZERO).all())
        {
            return Err(ConfigError::Invalid {
                field: "blocks",
                reason: format!("block at {} has invalid extents {}", block.center, block.half_extents),
            });
        }

        Ok(())
    }
}
