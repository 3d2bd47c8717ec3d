use crate::game::course::{Course, CourseBlock};
use crate::physics::physics_simulator::PhysicsSimulator;
use itertools::Itertools;
use log::trace;
use nalgebra::Isometry3;
use rapier3d::dynamics::RigidBodyHandle;
use rapier3d::geometry::{Collider, ColliderBuilder, ColliderHandle};
use rapier3d::prelude::vector;

pub enum ColliderFactory {}

impl ColliderFactory {
    /// Adds one collider per block, all attached to the fixed body `handle`.
    pub fn process_course(simulator: &mut PhysicsSimulator, handle: RigidBodyHandle, course: &Course) -> Vec<ColliderHandle> {
        let colliders = course
            .blocks
            .iter()
            .inspect(|block| trace!("Adding block collider at {} ({})", block.center, block.half_extents))
            .map(Collider::from)
            .collect_vec();

        simulator.insert_colliders(colliders, handle)
    }
}

impl From<&CourseBlock> for Collider {
    fn from(value: &CourseBlock) -> Self {
        let half = value.half_extents;
        let center = value.center;
        let position = Isometry3::new(
            vector![center.x, center.y, center.z],
            vector![0.0, 0.0, value.yaw.to_radians()],
        );

        ColliderBuilder::cuboid(half.x, half.y, half.z)
            .position(position)
            .build()
    }
}
