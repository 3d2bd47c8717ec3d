pub mod application;
pub mod course;
pub mod game_time;
pub mod scenario;
