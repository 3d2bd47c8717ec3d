use glam::Vec3;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    /// Unit normal of the surface that was hit, pointing away from it.
    pub normal: Vec3,
    pub distance: f32,
}

/// The collision capabilities the movement core needs from a physics engine.
pub trait PhysicsWorld {
    /// `direction` has to be normalized. Hits further away than `max_distance` are ignored.
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;

    /// Sweeps the character body from `position` along `desired_translation` and returns the
    /// translation that could actually be applied.
    fn move_character(&mut self, position: Vec3, desired_translation: Vec3) -> Vec3;
}
