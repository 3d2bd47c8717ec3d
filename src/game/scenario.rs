use crate::movement::intent::{MovementIntent, ScriptedInput};
use clap::ValueEnum;
use glam::Vec2;

/// Built-in input scripts for the corridor course. The character spawns facing down the corridor
/// with the left wall close by.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Stand still
    Idle,
    /// Run up, jump towards the left wall and ride it until the duration cap kicks us off
    WallRun,
    /// Like wall-run, but jump over to the right wall half way
    WallToWall,
    /// Run into the left wall and cancel the run right away
    Cancel,
}

impl Scenario {
    pub fn script(self, tick_rate: u32) -> ScriptedInput {
        let ticks = |seconds: f32| (seconds * tick_rate as f32).round() as u32;

        let forward = MovementIntent::forward();
        let forward_left = MovementIntent::new(Vec2::new(1.0, -1.0), false, false);
        let forward_right = MovementIntent::new(Vec2::new(1.0, 1.0), false, false);

        match self {
            Scenario::Idle => ScriptedInput::new().then(ticks(1.0), MovementIntent::idle()),
            Scenario::WallRun => ScriptedInput::new()
                .then(ticks(0.8), forward)
                .then(1, forward_left.with_jump())
                .then(ticks(3.0), forward_left),
            Scenario::WallToWall => ScriptedInput::new()
                .then(ticks(0.8), forward)
                .then(1, forward_left.with_jump())
                .then(ticks(1.0), forward_left)
                .then(1, forward_right.with_jump())
                .then(ticks(3.0), forward_right),
            Scenario::Cancel => ScriptedInput::new()
                .then(ticks(0.8), forward)
                .then(1, forward_left.with_jump())
                .then(ticks(1.0), forward_left.with_cancel())
                .then(ticks(1.0), forward),
        }
    }
}
