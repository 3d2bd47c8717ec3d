//! Detection of wall-runnable surfaces and of the ground below the character.
//!
//! Everything in here is a pure query against a [`PhysicsWorld`]. It is safe to call every tick and
//! never mutates the world or the character.

use crate::movement::config::MovementConfig;
use crate::movement::state::{CharacterKinematicState, Facing};
use crate::physics::world::{PhysicsWorld, RayHit};
use glam::Vec3;
use log::trace;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum WallSide {
    #[default]
    Left,
    Right,
    Forward,
}

/// One-tick snapshot of a qualifying wall. Never kept around by the probe.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceContact {
    pub normal: Vec3,
    pub point: Vec3,
    /// Unit direction along the wall, perpendicular to `normal` and world up.
    pub tangent: Vec3,
    pub distance: f32,
    pub side: WallSide,
}

impl SurfaceContact {
    pub fn new(normal: Vec3, point: Vec3, tangent: Vec3, distance: f32, side: WallSide) -> Self {
        Self {
            normal,
            point,
            tangent,
            distance,
            side,
        }
    }

    /// The tangent flipped (if needed) so it does not point against `direction`.
    /// Falls back to the stored tangent when `direction` has no component along the wall.
    pub fn tangent_along(&self, direction: Vec3) -> Vec3 {
        if self.tangent.dot(direction) < 0.0 {
            -self.tangent
        } else {
            self.tangent
        }
    }
}

/// `normalize(cross(normal, up))`, `None` for normals (nearly) parallel to up.
pub fn wall_tangent(normal: Vec3) -> Option<Vec3> {
    let tangent = normal.cross(Vec3::Z).normalize_or_zero();
    if tangent == Vec3::ZERO { None } else { Some(tangent) }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProbeResult {
    /// Height of the feet above the ground, if there is ground within reach.
    pub ground_distance: Option<f32>,
    pub ground_contact: bool,
    pub wall: Option<SurfaceContact>,
}

pub struct SurfaceProbe {
    max_normal_z: f32,
    half_height: f32,
    min_height_above_ground: f32,
    ground_contact_tolerance: f32,
    max_distance: f32,
    probe_forward: bool,
}

impl SurfaceProbe {
    /// How far below the feet we look for ground. Anything further away counts as "high enough".
    const GROUND_PROBE_SLACK: f32 = 10.0;

    pub fn new(config: &MovementConfig) -> Self {
        Self {
            max_normal_z: config.max_wall_normal_z(),
            half_height: config.capsule_half_height,
            min_height_above_ground: config.min_height_above_ground,
            ground_contact_tolerance: config.ground_contact_tolerance,
            max_distance: config.wall_probe_distance,
            probe_forward: config.probe_forward,
        }
    }

    pub fn sample<W: PhysicsWorld + ?Sized>(&self, world: &W, state: &CharacterKinematicState) -> ProbeResult {
        let ground_distance = self.ground_distance(world, state.position);
        let ground_contact = ground_distance.is_some_and(|distance| distance <= self.ground_contact_tolerance);
        let wall = self.probe_above_ground(world, state.position, &state.facing, self.max_distance, ground_distance);

        ProbeResult {
            ground_distance,
            ground_contact,
            wall,
        }
    }

    /// Height of the character's feet above the ground directly below.
    pub fn ground_distance<W: PhysicsWorld + ?Sized>(&self, world: &W, position: Vec3) -> Option<f32> {
        let reach = self.half_height
            + self
                .min_height_above_ground
                .max(self.ground_contact_tolerance)
            + Self::GROUND_PROBE_SLACK;
        world
            .cast_ray(position, Vec3::NEG_Z, reach)
            .map(|hit| (hit.distance - self.half_height).max(0.0))
    }

    pub fn probe<W: PhysicsWorld + ?Sized>(
        &self,
        world: &W,
        position: Vec3,
        facing: &Facing,
        max_distance: f32,
    ) -> Option<SurfaceContact> {
        let ground_distance = self.ground_distance(world, position);
        self.probe_above_ground(world, position, facing, max_distance, ground_distance)
    }

    fn probe_above_ground<W: PhysicsWorld + ?Sized>(
        &self,
        world: &W,
        position: Vec3,
        facing: &Facing,
        max_distance: f32,
        ground_distance: Option<f32>,
    ) -> Option<SurfaceContact> {
        if ground_distance.is_some_and(|height| height < self.min_height_above_ground) {
            trace!("Too close to the ground for wall running ({:?})", ground_distance);
            return None;
        }

        let left = self.cast_side(world, position, facing.left(), max_distance, WallSide::Left);
        let right = self.cast_side(world, position, facing.right(), max_distance, WallSide::Right);

        // A wall straight ahead only counts while we're already next to one.
        let forward = if self.probe_forward && (left.is_some() || right.is_some()) {
            self.cast_side(world, position, facing.forward(), max_distance, WallSide::Forward)
        } else {
            None
        };

        [left, right, forward]
            .into_iter()
            .flatten()
            .min_by(|a, b| a.0.distance.total_cmp(&b.0.distance))
            .and_then(|(hit, side)| self.to_contact(hit, side, facing))
    }

    fn cast_side<W: PhysicsWorld + ?Sized>(
        &self,
        world: &W,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        side: WallSide,
    ) -> Option<(RayHit, WallSide)> {
        world
            .cast_ray(origin, direction, max_distance)
            .filter(|hit| self.is_wall_like(hit.normal))
            .map(|hit| (hit, side))
    }

    pub fn is_wall_like(&self, normal: Vec3) -> bool {
        normal.is_finite() && normal.length_squared() > 1.0e-6 && normal.normalize().z.abs() <= self.max_normal_z
    }

    fn to_contact(&self, hit: RayHit, side: WallSide, facing: &Facing) -> Option<SurfaceContact> {
        let normal = hit.normal.normalize();
        let tangent = wall_tangent(normal)?;
        let contact = SurfaceContact::new(normal, hit.point, tangent, hit.distance, side);
        let tangent = contact.tangent_along(facing.forward());
        Some(SurfaceContact { tangent, ..contact })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::world::test_support::{FixedHitWorld, PlaneWorld};
    use std::f32::consts::FRAC_PI_2;

    fn tilted_normal(elevation_degrees: f32) -> Vec3 {
        let elevation = elevation_degrees.to_radians();
        Vec3::new(elevation.cos(), 0.0, elevation.sin())
    }

    fn world_with_normal(normal: Vec3) -> FixedHitWorld {
        FixedHitWorld {
            lateral: Some(RayHit {
                point: Vec3::new(0.0, 0.0, 400.0),
                normal,
                distance: 20.0,
            }),
            ground_distance: None,
        }
    }

    #[test]
    fn rejects_floor_like_normal() {
        let probe = SurfaceProbe::new(&MovementConfig::default());
        let world = world_with_normal(tilted_normal(89.0));
        assert_eq!(probe.probe(&world, Vec3::ZERO, &Facing::from_yaw(FRAC_PI_2), 75.0), None);
    }

    #[test]
    fn accepts_slightly_tilted_wall() {
        let probe = SurfaceProbe::new(&MovementConfig::default());
        let world = world_with_normal(tilted_normal(5.0));
        let contact = probe
            .probe(&world, Vec3::ZERO, &Facing::from_yaw(FRAC_PI_2), 75.0)
            .expect("5 degrees is within the tolerance");
        assert!(contact.tangent.dot(contact.normal).abs() < 1.0e-5);
        assert!(contact.tangent.z.abs() < 1.0e-5);
    }

    #[test]
    fn rejects_degenerate_normals() {
        let probe = SurfaceProbe::new(&MovementConfig::default());
        assert!(!probe.is_wall_like(Vec3::ZERO));
        assert!(!probe.is_wall_like(Vec3::new(f32::NAN, 0.0, 0.0)));
        assert!(!probe.is_wall_like(Vec3::Z));
        assert!(!probe.is_wall_like(Vec3::NEG_Z));
        assert!(probe.is_wall_like(Vec3::NEG_Y));
    }

    #[test]
    fn picks_nearer_side() {
        let config = MovementConfig::default();
        let probe = SurfaceProbe::new(&config);
        // Facing +Y: left is -X, right is +X.
        let world = PlaneWorld::floor_only(config.capsule_half_height)
            .with_plane(Vec3::new(-30.0, 0.0, 0.0), Vec3::X)
            .with_plane(Vec3::new(50.0, 0.0, 0.0), Vec3::NEG_X);
        let contact = probe
            .probe(&world, Vec3::new(0.0, 0.0, 500.0), &Facing::from_yaw(FRAC_PI_2), 75.0)
            .unwrap();
        assert_eq!(contact.side, WallSide::Left);
        assert!((contact.distance - 30.0).abs() < 1.0e-3);
        assert!(contact.normal.abs_diff_eq(Vec3::X, 1.0e-6));
        // Aligned with the facing direction.
        assert!(contact.tangent.abs_diff_eq(Vec3::Y, 1.0e-6));
    }

    #[test]
    fn nothing_out_of_range() {
        let config = MovementConfig::default();
        let probe = SurfaceProbe::new(&config);
        let world = PlaneWorld::floor_only(config.capsule_half_height).with_plane(Vec3::new(-100.0, 0.0, 0.0), Vec3::X);
        assert_eq!(
            probe.probe(&world, Vec3::new(0.0, 0.0, 500.0), &Facing::from_yaw(FRAC_PI_2), 75.0),
            None
        );
    }

    #[test]
    fn nothing_close_to_the_ground() {
        let config = MovementConfig::default();
        let probe = SurfaceProbe::new(&config);
        let world = PlaneWorld::floor_only(config.capsule_half_height).with_plane(Vec3::new(-30.0, 0.0, 0.0), Vec3::X);
        let facing = Facing::from_yaw(FRAC_PI_2);

        // Feet 20 units above the floor
        let low = Vec3::new(0.0, 0.0, config.capsule_half_height + 20.0);
        assert_eq!(probe.probe(&world, low, &facing, 75.0), None);

        let high = Vec3::new(0.0, 0.0, config.capsule_half_height + 80.0);
        assert!(probe.probe(&world, high, &facing, 75.0).is_some());
    }

    #[test]
    fn forward_wall_only_next_to_a_side_wall() {
        let config = MovementConfig::default();
        let probe = SurfaceProbe::new(&config);
        let facing = Facing::from_yaw(FRAC_PI_2);
        let position = Vec3::new(0.0, 0.0, 500.0);

        let front_only =
            PlaneWorld::floor_only(config.capsule_half_height).with_plane(Vec3::new(0.0, 20.0, 0.0), Vec3::NEG_Y);
        assert_eq!(probe.probe(&front_only, position, &facing, 75.0), None);

        let corner = front_only.with_plane(Vec3::new(-40.0, 0.0, 0.0), Vec3::X);
        let contact = probe.probe(&corner, position, &facing, 75.0).unwrap();
        assert_eq!(contact.side, WallSide::Forward);
    }

    #[test]
    fn ground_sample() {
        let config = MovementConfig::default();
        let probe = SurfaceProbe::new(&config);
        let world = PlaneWorld::floor_only(config.capsule_half_height);

        let mut state = CharacterKinematicState::new(Vec3::new(0.0, 0.0, config.capsule_half_height), Facing::default());
        let standing = probe.sample(&world, &state);
        assert!(standing.ground_contact);
        assert_eq!(standing.wall, None);

        state.position.z += 1000.0;
        let airborne = probe.sample(&world, &state);
        assert!(!airborne.ground_contact);
        assert_eq!(airborne.ground_distance, None);
    }
}
