use crate::game::course::Course;
use crate::movement::config::MovementConfig;
use crate::physics::collider_factory::ColliderFactory;
use crate::physics::physics_simulator::PhysicsSimulator;
use crate::physics::world::{PhysicsWorld, RayHit};
use glam::Vec3;
use log::{debug, warn};
use rapier3d::control::{CharacterLength, KinematicCharacterController};
use rapier3d::prelude::*;

/// The rapier scene the character lives in: the static course and the character capsule, driven by
/// a [`KinematicCharacterController`].
pub struct PhysicsState {
    physics_simulator: PhysicsSimulator,
    course_body: RigidBodyHandle,
    course_colliders: Vec<ColliderHandle>,
    character_controller: KinematicCharacterController,
    character_collider: ColliderHandle,
    character_mass: f32,
}

impl PhysicsState {
    /// Gap the controller keeps between the capsule and the geometry. Has to stay below the ground
    /// contact tolerance, or standing on the floor would never count as ground contact.
    const SKIN: f32 = 0.5;

    pub fn new(config: &MovementConfig, course: &Course, dt: f32) -> Self {
        let mut physics_simulator = PhysicsSimulator::new().with_gravity(config.gravity);
        physics_simulator.set_timestep(dt);

        if Self::SKIN >= config.ground_contact_tolerance {
            warn!(
                "Ground contact tolerance {} is below the controller offset {}, the character will never be grounded",
                config.ground_contact_tolerance,
                Self::SKIN
            );
        }

        let course_body = physics_simulator.insert_rigid_body(RigidBodyBuilder::fixed().build());
        let course_colliders = ColliderFactory::process_course(&mut physics_simulator, course_body, course);

        let character = ColliderBuilder::capsule_z(
            config.capsule_half_height - config.capsule_radius,
            config.capsule_radius,
        )
        .translation(course.spawn.into())
        .build();
        let character_collider = physics_simulator.insert_collider(character);

        let mut state = Self {
            physics_simulator,
            course_body,
            course_colliders,
            character_controller: KinematicCharacterController {
                up: Vector::z_axis(),
                offset: CharacterLength::Absolute(Self::SKIN),
                // The movement state machine decides about ground contact.
                snap_to_ground: None,
                ..KinematicCharacterController::default()
            },
            character_collider,
            character_mass: config.character_mass,
        };

        // The query pipeline only knows about colliders after a step.
        state.update_fixed();
        debug!(
            "Physics scene for \"{}\" ready with {} colliders",
            course.name,
            state.physics_simulator.collider_count()
        );
        state
    }

    /// Swaps the static geometry for `course`. The character stays where it is.
    pub fn replace_course(&mut self, course: &Course) {
        for collider in self.course_colliders.drain(..) {
            self.physics_simulator.drop_collider(collider, false);
        }
        self.course_colliders = ColliderFactory::process_course(&mut self.physics_simulator, self.course_body, course);
        self.update_fixed();
    }

    pub fn update_fixed(&mut self) {
        self.physics_simulator.step();
    }

    pub fn character_position(&self) -> Vec3 {
        self.physics_simulator
            .collider_translation(self.character_collider)
    }

    pub fn course_collider_count(&self) -> usize {
        self.course_colliders.len()
    }
}

impl PhysicsWorld for PhysicsState {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self.physics_simulator
            .cast_ray(origin, direction, max_distance, Some(self.character_collider))
            .map(|(_, distance, normal)| RayHit {
                point: origin + direction * distance,
                normal,
                distance,
            })
    }

    fn move_character(&mut self, position: Vec3, desired_translation: Vec3) -> Vec3 {
        // The state machine owns the position, the collider just follows it.
        self.physics_simulator
            .teleport_collider(self.character_collider, position);

        let movement = self.physics_simulator.move_character(
            &self.character_controller,
            self.character_collider,
            self.character_mass,
            desired_translation,
        );

        let translation = movement.translation;
        let achieved = Vec3::new(translation.x, translation.y, translation.z);
        self.physics_simulator
            .teleport_collider(self.character_collider, position + achieved);
        achieved
    }
}
