use crate::physics::surface_probe::SurfaceContact;
use glam::{EulerRot, Quat, Vec3};
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum LocomotionMode {
    #[default]
    Grounded,
    Falling,
    WallRunning,
    Jumping,
}

impl LocomotionMode {
    pub const ALL: [LocomotionMode; 4] = [
        LocomotionMode::Grounded,
        LocomotionMode::Falling,
        LocomotionMode::WallRunning,
        LocomotionMode::Jumping,
    ];

    pub const fn is_airborne(self) -> bool {
        matches!(self, LocomotionMode::Falling | LocomotionMode::Jumping)
    }
}

impl Display for LocomotionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LocomotionMode::Grounded => "Grounded",
            LocomotionMode::Falling => "Falling",
            LocomotionMode::WallRunning => "WallRunning",
            LocomotionMode::Jumping => "Jumping",
        };
        f.write_str(name)
    }
}

/// Body/camera orientation in radians. Yaw is measured from +X towards +Y (Z-up), a positive roll
/// lowers the right shoulder.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Facing {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Facing {
    pub fn from_yaw(yaw: f32) -> Self {
        Self {
            yaw,
            ..Facing::default()
        }
    }

    /// Yaw that looks along the horizontal part of `direction`. Returns `None` for (near) vertical directions.
    pub fn yaw_of(direction: Vec3) -> Option<f32> {
        let horizontal = Vec3::new(direction.x, direction.y, 0.0);
        if horizontal.length_squared() < 1.0e-8 {
            return None;
        }
        Some(horizontal.y.atan2(horizontal.x))
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), self.yaw.sin(), 0.0)
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Z)
    }

    pub fn left(&self) -> Vec3 {
        -self.right()
    }

    /// Maps a character-local (forward, right) direction into world space.
    pub fn local_to_world(&self, local: glam::Vec2) -> Vec3 {
        self.forward() * local.x + self.right() * local.y
    }

    pub fn to_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::ZYX, self.yaw, self.pitch, self.roll)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterKinematicState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub facing: Facing,
    pub mode: LocomotionMode,
    pub time_in_mode: f32,
}

impl CharacterKinematicState {
    pub fn new(position: Vec3, facing: Facing) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            facing,
            mode: LocomotionMode::Grounded,
            time_in_mode: 0.0,
        }
    }

    pub fn horizontal_velocity(&self) -> Vec3 {
        Vec3::new(self.velocity.x, self.velocity.y, 0.0)
    }

    /// Speed in the horizontal plane.
    pub fn lateral_speed(&self) -> f32 {
        self.horizontal_velocity().length()
    }
}

/// Exists exactly as long as the character is in [`LocomotionMode::WallRunning`].
///
/// `surface` is a copy of the last contact and not a handle into the physics world, the wall may be
/// moved or removed while we are running along it.
#[derive(Debug, Clone, PartialEq)]
pub struct WallRunSession {
    pub started_at: f32,
    pub elapsed: f32,
    pub entry_velocity: Vec3,
    pub surface: SurfaceContact,
}

impl WallRunSession {
    pub fn new(started_at: f32, entry_velocity: Vec3, surface: SurfaceContact) -> Self {
        Self {
            started_at,
            elapsed: 0.0,
            entry_velocity,
            surface,
        }
    }

    /// Time left until `cap`.
    pub fn remaining(&self, cap: f32) -> f32 {
        (cap - self.elapsed).max(0.0)
    }
}
