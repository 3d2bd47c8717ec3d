use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// All tunables of the movement core. Nothing in [`crate::movement`] or [`crate::physics::surface_probe`]
/// reads global state, everything is passed in through this struct.
///
/// Angles are in degrees, distances in units (centimetres), speeds in units/s.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // Capsule, 42 x 96
    pub capsule_radius: f32,
    pub capsule_half_height: f32,
    pub character_mass: f32,

    // Walking / air
    pub gravity: f32,
    pub max_walk_speed: f32,
    pub max_acceleration: f32,
    pub braking_deceleration: f32,
    pub air_control: f32,
    pub jump_velocity: f32,
    pub max_fall_speed: f32,
    pub turn_rate: f32,

    // Probing
    pub wall_probe_distance: f32,
    pub wall_angle_tolerance: f32,
    pub min_height_above_ground: f32,
    pub ground_contact_tolerance: f32,
    pub probe_forward: bool,

    // Wall run
    pub min_wall_run_speed: f32,
    pub min_intent_toward_wall: f32,
    pub min_wall_run_duration: f32,
    pub max_wall_run_duration: f32,
    pub wall_gravity_scale: f32,
    pub exit_push: f32,
    pub reattach_delay: f32,
    pub reattach_angle: f32,

    // Camera
    pub max_camera_roll: f32,
    pub roll_in_duration: f32,
    pub roll_out_duration: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            capsule_radius: 42.0,
            capsule_half_height: 96.0,
            character_mass: 80.0,
            gravity: 980.0,
            max_walk_speed: 600.0,
            max_acceleration: 2048.0,
            braking_deceleration: 2048.0,
            air_control: 0.2,
            jump_velocity: 600.0,
            max_fall_speed: 4000.0,
            turn_rate: 45.0,
            wall_probe_distance: 75.0,
            wall_angle_tolerance: 10.0,
            min_height_above_ground: 50.0,
            ground_contact_tolerance: 2.0,
            probe_forward: true,
            min_wall_run_speed: 200.0,
            min_intent_toward_wall: 0.0,
            min_wall_run_duration: 0.1,
            max_wall_run_duration: 1.5,
            wall_gravity_scale: 0.05,
            exit_push: 300.0,
            reattach_delay: 0.35,
            reattach_angle: 30.0,
            max_camera_roll: 15.0,
            roll_in_duration: 0.25,
            roll_out_duration: 0.3,
        }
    }
}

impl MovementConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: MovementConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loading movement config from {}", path.as_ref().display());
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("capsule_radius", self.capsule_radius),
            ("capsule_half_height", self.capsule_half_height),
            ("character_mass", self.character_mass),
            ("wall_probe_distance", self.wall_probe_distance),
            ("max_wall_run_duration", self.max_wall_run_duration),
            ("roll_in_duration", self.roll_in_duration),
            ("roll_out_duration", self.roll_out_duration),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{} must be a positive number", value),
                });
            }
        }

        let non_negative = [
            ("gravity", self.gravity),
            ("max_walk_speed", self.max_walk_speed),
            ("max_acceleration", self.max_acceleration),
            ("braking_deceleration", self.braking_deceleration),
            ("jump_velocity", self.jump_velocity),
            ("max_fall_speed", self.max_fall_speed),
            ("turn_rate", self.turn_rate),
            ("min_height_above_ground", self.min_height_above_ground),
            ("ground_contact_tolerance", self.ground_contact_tolerance),
            ("min_wall_run_speed", self.min_wall_run_speed),
            ("min_wall_run_duration", self.min_wall_run_duration),
            ("wall_gravity_scale", self.wall_gravity_scale),
            ("exit_push", self.exit_push),
            ("reattach_delay", self.reattach_delay),
            ("reattach_angle", self.reattach_angle),
            ("max_camera_roll", self.max_camera_roll),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{} must not be negative", value),
                });
            }
        }

        if self.capsule_half_height < self.capsule_radius {
            return Err(ConfigError::Invalid {
                field: "capsule_half_height",
                reason: format!(
                    "{} is smaller than the capsule radius ({})",
                    self.capsule_half_height, self.capsule_radius
                ),
            });
        }

        if !(0.0..=1.0).contains(&self.air_control) {
            return Err(ConfigError::Invalid {
                field: "air_control",
                reason: format!("{} is outside of [0, 1]", self.air_control),
            });
        }

        // Anything steeper would let floors and ceilings through and break the tangent computation.
        if !(self.wall_angle_tolerance > 0.0 && self.wall_angle_tolerance <= 45.0) {
            return Err(ConfigError::Invalid {
                field: "wall_angle_tolerance",
                reason: format!("{} is outside of (0, 45] degrees", self.wall_angle_tolerance),
            });
        }

        if !(-1.0..1.0).contains(&self.min_intent_toward_wall) {
            return Err(ConfigError::Invalid {
                field: "min_intent_toward_wall",
                reason: format!("{} is outside of [-1, 1)", self.min_intent_toward_wall),
            });
        }

        if self.min_wall_run_duration >= self.max_wall_run_duration {
            return Err(ConfigError::Invalid {
                field: "min_wall_run_duration",
                reason: format!(
                    "{} has to be below max_wall_run_duration ({})",
                    self.min_wall_run_duration, self.max_wall_run_duration
                ),
            });
        }

        Ok(())
    }

    /// Sine of the tolerance angle, i.e. the largest allowed `|normal.z|` for a wall.
    pub fn max_wall_normal_z(&self) -> f32 {
        self.wall_angle_tolerance.to_radians().sin()
    }
}
