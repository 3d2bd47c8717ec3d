use crate::movement::state::LocomotionMode;
use glam::{Quat, Vec3};

/// What one simulation tick did to the character, for whoever drives the camera or replicates
/// the character.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CharacterMovementInformation {
    pub delta_movement: Vec3,
    pub absolute_position: Vec3,
    /// Yaw in radians
    pub orientation: f32,
    /// Full body/camera rotation including the wall run roll.
    pub rotation: Quat,
    pub mode: LocomotionMode,
}
