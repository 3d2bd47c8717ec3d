use crate::movement::config::MovementConfig;
use crate::movement::intent::MovementIntent;
use crate::movement::state::{CharacterKinematicState, Facing, LocomotionMode};
use glam::Vec3;

/// Per-mode physics knobs. Looked up once per tick, see [`ModeProfile::for_mode`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ModeProfile {
    pub gravity_scale: f32,
    /// Fraction of `max_acceleration` available to steer the horizontal velocity.
    pub acceleration_scale: f32,
    /// Whether to decelerate when there is no movement input.
    pub braking: bool,
}

impl ModeProfile {
    pub fn for_mode(mode: LocomotionMode, config: &MovementConfig) -> Self {
        match mode {
            LocomotionMode::Grounded => ModeProfile {
                gravity_scale: 0.0,
                acceleration_scale: 1.0,
                braking: true,
            },
            LocomotionMode::Falling | LocomotionMode::Jumping => ModeProfile {
                gravity_scale: 1.0,
                acceleration_scale: config.air_control,
                braking: false,
            },
            // Only the gravity is used, the WallRunController steers along the wall.
            LocomotionMode::WallRunning => ModeProfile {
                gravity_scale: config.wall_gravity_scale,
                acceleration_scale: 0.0,
                braking: false,
            },
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LocomotionStep {
    pub velocity: Vec3,
    pub facing: Facing,
}

/// Moves `current` towards `target` by at most `max_delta`.
pub fn approach(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let length = delta.length();
    if length <= max_delta || length < 1.0e-6 {
        target
    } else {
        current + delta * (max_delta / length)
    }
}

/// Walking and air movement, i.e. everything but the wall run.
pub fn step(
    state: &CharacterKinematicState,
    intent: &MovementIntent,
    config: &MovementConfig,
    dt: f32,
) -> LocomotionStep {
    let profile = ModeProfile::for_mode(state.mode, config);

    let mut facing = state.facing;
    // Yaw grows counter-clockwise, a positive turn goes clockwise (right).
    facing.yaw -= intent.turn * config.turn_rate.to_radians() * dt;

    let wish = facing.local_to_world(intent.direction);
    let horizontal = state.horizontal_velocity();

    let new_horizontal = if wish != Vec3::ZERO {
        let acceleration = config.max_acceleration * profile.acceleration_scale;
        approach(horizontal, wish * config.max_walk_speed, acceleration * dt)
    } else if profile.braking {
        approach(horizontal, Vec3::ZERO, config.braking_deceleration * dt)
    } else {
        horizontal
    };

    let mut vertical = state.velocity.z - config.gravity * profile.gravity_scale * dt;
    if state.mode == LocomotionMode::Grounded {
        vertical = vertical.max(0.0);
    }
    vertical = vertical.max(-config.max_fall_speed);

    LocomotionStep {
        velocity: Vec3::new(new_horizontal.x, new_horizontal.y, vertical),
        facing,
    }
}
