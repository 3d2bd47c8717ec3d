use crate::game::course::Course;
use crate::game::game_time::FixedTimestep;
use crate::movement::config::MovementConfig;
use crate::movement::intent::InputAdapter;
use crate::movement::state::{Facing, LocomotionMode};
use crate::movement::state_machine::{MovementStateMachine, TickReport, Transition};
use crate::physics::physics_state::PhysicsState;
use anyhow::bail;
use log::{debug, info, trace};

/// What happened during a run, for logging and for tests.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub ticks: u64,
    /// Simulation time and the transition that happened at it
    pub transitions: Vec<(f32, Transition)>,
    pub wall_runs: u32,
    pub longest_wall_run: f32,
    pub max_height: f32,
    pub invariant_violations: u32,
}

impl RunStats {
    pub fn entered(&self, mode: LocomotionMode) -> bool {
        self.transitions.iter().any(|(_, transition)| transition.to == mode)
    }

    fn record(&mut self, clock: f32, report: &TickReport) {
        self.ticks += 1;
        self.max_height = self.max_height.max(report.movement.absolute_position.z);

        if let Some(transition) = report.transition {
            self.transitions.push((clock, transition));
            if transition.to == LocomotionMode::WallRunning {
                self.wall_runs += 1;
            }
        }

        if let Some(session) = &report.ended_session {
            self.longest_wall_run = self.longest_wall_run.max(session.elapsed);
        }
    }
}

/// Headless game loop: one character with an input source on a course.
pub struct GameApplication {
    physics: PhysicsState,
    movement: MovementStateMachine,
    input: Box<dyn InputAdapter>,
    time: FixedTimestep,
    stats: RunStats,
}

impl GameApplication {
    /// Anything below this is considered to have fallen out of the world.
    const KILL_Z: f32 = -10_000.0;

    pub fn new(config: MovementConfig, course: &Course, input: Box<dyn InputAdapter>, tick_rate: u32) -> Self {
        let time = FixedTimestep::new(tick_rate);
        let physics = PhysicsState::new(&config, course, time.tick());
        let facing = Facing::from_yaw(course.spawn_yaw.to_radians());
        let movement = MovementStateMachine::new(config, course.spawn, facing);

        Self {
            physics,
            movement,
            input,
            time,
            stats: RunStats::default(),
        }
    }

    pub fn movement(&self) -> &MovementStateMachine {
        &self.movement
    }

    pub fn physics(&self) -> &PhysicsState {
        &self.physics
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Advances by one frame of `delta_time` seconds, simulating as many fixed ticks as fit.
    pub fn update(&mut self, delta_time: f32) -> Vec<TickReport> {
        let ticks = self.time.advance_time(delta_time);
        (0..ticks).map(|_| self.update_fixed()).collect()
    }

    pub fn update_fixed(&mut self) -> TickReport {
        let intent = self.input.sample(self.movement.state());
        let report = self
            .movement
            .tick(&mut self.physics, &intent, self.time.tick());
        self.physics.update_fixed();

        if !self.movement.invariant_holds() {
            self.stats.invariant_violations += 1;
        }
        self.stats.record(self.movement.clock(), &report);

        if let Some(transition) = report.transition {
            debug!(
                "[{:.3}s] {} -> {} ({:?}) at {}",
                self.movement.clock(),
                transition.from,
                transition.to,
                transition.reason,
                report.movement.absolute_position
            );
        }
        report
    }

    /// Simulates `seconds` of game time and returns the statistics of the run.
    pub fn run(&mut self, seconds: f32) -> anyhow::Result<RunStats> {
        info!(
            "Simulating {}s at {} Hz",
            seconds,
            (1.0 / self.time.tick()).round()
        );

        while self.time.elapsed() < seconds as f64 {
            let tick = self.time.tick();
            self.update(tick);

            let position = self.movement.state().position;
            if !position.is_finite() {
                bail!("Character position became {} after {} ticks", position, self.stats.ticks);
            }
            if position.z < Self::KILL_Z {
                bail!("Character fell out of the world at {}", position);
            }
            trace!("{:.3}s: {}", self.time.elapsed(), position);
        }

        let stats = &self.stats;
        info!(
            "Done after {} ticks: {} wall runs, longest {:.2}s, peak height {:.1}, ended {} at {}",
            stats.ticks,
            stats.wall_runs,
            stats.longest_wall_run,
            stats.max_height,
            self.movement.mode(),
            self.movement.state().position
        );

        if stats.invariant_violations > 0 {
            bail!("Wall run session invariant violated in {} ticks", stats.invariant_violations);
        }

        Ok(self.stats.clone())
    }
}
