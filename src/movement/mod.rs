pub mod config;
pub mod intent;
pub mod locomotion;
pub mod state;
pub mod state_machine;
pub mod wall_run_controller;
