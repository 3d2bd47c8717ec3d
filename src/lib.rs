//! Wall running for a kinematic, capsule shaped character on top of rapier.
//!
//! The movement core ([`movement`], [`physics::surface_probe`]) only talks to the physics engine
//! through the [`physics::world::PhysicsWorld`] trait, [`physics::physics_state::PhysicsState`] is
//! the rapier implementation of it.

pub mod game;
pub mod movement;
pub mod physics;
pub mod settings;
