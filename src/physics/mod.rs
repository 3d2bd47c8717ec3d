pub mod character_movement_information;
pub mod collider_factory;
pub mod physics_simulator;
pub mod physics_state;
pub mod surface_probe;
pub mod world;
