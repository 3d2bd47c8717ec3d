use crate::game::course::Course;
use crate::game::scenario::Scenario;
use crate::movement::config::{ConfigError, MovementConfig};
use clap::{Parser, value_parser};
use glam::Vec3;
use itertools::Itertools;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "wallrun")]
#[command(version)]
#[command(about = "Headless wall running character simulation")]
pub struct CliArgs {
    /// Movement tunables as JSON. Missing fields keep their defaults.
    #[arg(long, env = "WALLRUN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Course description as JSON, the built-in corridor if omitted.
    #[arg(long, env = "WALLRUN_COURSE")]
    pub course: Option<PathBuf>,

    #[arg(long, default_value_t = 60, value_parser = value_parser!(u32).range(1..=1000))]
    pub tick_rate: u32,

    /// Simulated time in seconds
    #[arg(long, default_value_t = 5.0)]
    pub seconds: f32,

    /// Overrides the course spawn, e.g. "(100, 0, 97)"
    #[arg(long, value_parser = value_parser!(Vector3))]
    pub spawn: Option<Vector3>,

    #[arg(long, value_enum, default_value_t = Scenario::WallRun)]
    pub scenario: Scenario,
}

impl CliArgs {
    pub fn movement_config(&self) -> Result<MovementConfig, ConfigError> {
        match &self.config {
            Some(path) => MovementConfig::load(path),
            None => Ok(MovementConfig::default()),
        }
    }

    pub fn course(&self) -> Result<Course, ConfigError> {
        let mut course = match &self.course {
            Some(path) => Course::load(path)?,
            None => Course::corridor(),
        };

        if let Some(spawn) = &self.spawn {
            course.spawn = spawn.into();
        }
        Ok(course)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<&Vector3> for Vec3 {
    fn from(value: &Vector3) -> Self {
        Vec3::new(value.x, value.y, value.z)
    }
}

fn trim_brackets(input: &str) -> &str {
    let mut chars = input.chars();
    chars.next(); // skip first
    chars.next_back(); // skip last
    chars.as_str()
}

impl FromStr for Vector3 {
    type Err = String;

    // (-a, b, c)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let string: String = s.chars().filter(|&c| !c.is_whitespace()).collect();
        if !string.starts_with("(") || !string.ends_with(")") {
            return Err("Missing start or end bracket".to_string());
        }

        let trimmed_str = trim_brackets(string.as_str());
        let splits = trimmed_str.split(',').collect_vec();

        if splits.len() != 3 {
            return Err(format!(
                "Comma splitting resulted in {} splits, not 3!",
                splits.len()
            ));
        }

        let components: Vec<f32> = splits
            .iter()
            .map(|&split| {
                split
                    .parse::<f32>()
                    .map_err(|err| format!("Failed to parse component \"{}\": {}", split, err))
            })
            .collect::<Result<_, _>>()?;

        Ok(Vector3 {
            x: components[0],
            y: components[1],
            z: components[2],
        })
    }
}
