use crate::movement::config::MovementConfig;
use crate::movement::intent::MovementIntent;
use crate::movement::locomotion::ModeProfile;
use crate::movement::state::{CharacterKinematicState, Facing, LocomotionMode};
use crate::physics::surface_probe::SurfaceContact;
use glam::Vec3;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WallRunStep {
    pub velocity: Vec3,
    pub facing: Facing,
}

/// Kinematics while attached to a wall: reduced gravity, velocity along the wall, camera roll
/// towards the wall and the push-off when leaving.
pub struct WallRunController {
    gravity: f32,
    gravity_scale: f32,
    braking_deceleration: f32,
    jump_velocity: f32,
    exit_push: f32,
    max_roll: f32,
    roll_in_duration: f32,
    roll_out_duration: f32,
}

impl WallRunController {
    pub fn new(config: &MovementConfig) -> Self {
        Self {
            gravity: config.gravity,
            gravity_scale: ModeProfile::for_mode(LocomotionMode::WallRunning, config).gravity_scale,
            braking_deceleration: config.braking_deceleration,
            jump_velocity: config.jump_velocity,
            exit_push: config.exit_push,
            max_roll: config.max_camera_roll.to_radians(),
            roll_in_duration: config.roll_in_duration,
            roll_out_duration: config.roll_out_duration,
        }
    }

    /// One tick of wall running. The camera roll grows with `state.time_in_mode`. Speed along the
    /// wall is kept unless the intent pulls back against the run direction, which brakes.
    pub fn step(
        &self,
        state: &CharacterKinematicState,
        contact: &SurfaceContact,
        intent: &MovementIntent,
        dt: f32,
    ) -> WallRunStep {
        let tangent = self.run_direction(state, contact);

        let mut forward_speed = state.horizontal_velocity().dot(tangent).max(0.0);
        let pull_back = -state.facing.local_to_world(intent.direction).dot(tangent);
        if pull_back > 0.0 {
            let braking = self.braking_deceleration * pull_back.min(1.0) * dt;
            forward_speed = (forward_speed - braking).max(0.0);
        }

        let vertical = state.velocity.z - self.gravity * self.gravity_scale * dt;
        let velocity = tangent * forward_speed + Vec3::Z * vertical;

        let mut facing = state.facing;
        if let Some(yaw) = Facing::yaw_of(tangent) {
            facing.yaw = yaw;
        }
        facing.roll = self.target_roll(state.time_in_mode + dt, contact, tangent);

        WallRunStep { velocity, facing }
    }

    /// The tangent, signed to follow the current horizontal velocity, or the facing if we're
    /// barely moving.
    pub fn run_direction(&self, state: &CharacterKinematicState, contact: &SurfaceContact) -> Vec3 {
        let horizontal = state.horizontal_velocity();
        if horizontal.length_squared() > 1.0e-4 && horizontal.dot(contact.tangent).abs() > 1.0e-4 {
            contact.tangent_along(horizontal)
        } else {
            contact.tangent_along(state.facing.forward())
        }
    }

    fn target_roll(&self, elapsed: f32, contact: &SurfaceContact, tangent: Vec3) -> f32 {
        let progress = (elapsed / self.roll_in_duration).clamp(0.0, 1.0);
        self.roll_sign(contact, tangent) * self.max_roll * progress
    }

    /// -1 when the wall is on the left of the run direction, +1 when it is on the right.
    fn roll_sign(&self, contact: &SurfaceContact, tangent: Vec3) -> f32 {
        let right = tangent.cross(Vec3::Z);
        // The normal points away from the wall, so a wall on the left has a normal pointing right.
        if contact.normal.dot(right) > 0.0 { -1.0 } else { 1.0 }
    }

    /// Velocity when leaving the wall: forward speed along the wall plus a push away from it.
    /// `dot(result, surface.normal) >= 0` always holds.
    pub fn exit_velocity(&self, velocity: Vec3, surface: &SurfaceContact, jump: bool) -> Vec3 {
        let normal = surface.normal;
        let horizontal = Vec3::new(velocity.x, velocity.y, 0.0);
        let tangent = surface.tangent_along(horizontal);
        let forward = tangent * horizontal.dot(tangent).max(0.0);

        let vertical = if jump { self.jump_velocity } else { velocity.z };

        let mut exit = forward + normal * self.exit_push + Vec3::Z * vertical;

        // A tilted wall lets a large vertical speed point back into it.
        let away = exit.dot(normal);
        if away < self.exit_push {
            exit += normal * (self.exit_push - away);
        }
        exit
    }

    /// Eases the roll back to neutral while not wall running.
    pub fn ease_roll(&self, facing: Facing, dt: f32) -> Facing {
        let max_delta = self.max_roll / self.roll_out_duration * dt;
        let roll = if facing.roll.abs() <= max_delta {
            0.0
        } else {
            facing.roll - facing.roll.signum() * max_delta
        };
        Facing { roll, ..facing }
    }
}
