use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wallrun::game::application::GameApplication;
use wallrun::game::course::Course;
use wallrun::game::scenario::Scenario;
use wallrun::movement::config::MovementConfig;
use wallrun::movement::intent::{InputAdapter, MovementIntent};
use wallrun::movement::state::{CharacterKinematicState, Facing, LocomotionMode};
use wallrun::movement::state_machine::{MovementStateMachine, TransitionReason};
use wallrun::physics::physics_state::PhysicsState;

const TICK_RATE: u32 = 60;

fn corridor_app(scenario: Scenario) -> GameApplication {
    GameApplication::new(
        MovementConfig::default(),
        &Course::corridor(),
        Box::new(scenario.script(TICK_RATE)),
        TICK_RATE,
    )
}

#[test_log::test]
fn wall_run_until_the_cap() {
    let cap = MovementConfig::default().max_wall_run_duration;
    let mut app = corridor_app(Scenario::WallRun);
    let stats = app.run(5.0).expect("a clean run");

    assert!(stats.entered(LocomotionMode::WallRunning), "{:?}", stats.transitions);
    assert_eq!(stats.invariant_violations, 0);
    assert!(stats.longest_wall_run <= cap);
    assert!(stats.longest_wall_run > 1.0, "rode the wall for {}s", stats.longest_wall_run);

    // Every wall run was entered from a fall.
    let entries = stats
        .transitions
        .iter()
        .filter(|(_, transition)| transition.to == LocomotionMode::WallRunning);
    for (_, transition) in entries {
        assert_eq!(transition.from, LocomotionMode::Falling);
        assert_eq!(transition.reason, TransitionReason::WallContact);
    }

    assert_eq!(app.movement().mode(), LocomotionMode::Grounded);
}

#[test_log::test]
fn wall_to_wall() {
    let mut app = corridor_app(Scenario::WallToWall);
    let stats = app.run(5.0).expect("a clean run");

    assert!(stats.wall_runs >= 2, "{:?}", stats.transitions);
    assert!(
        stats
            .transitions
            .iter()
            .any(|(_, transition)| transition.from == LocomotionMode::WallRunning
                && transition.reason == TransitionReason::Jump)
    );
    assert_eq!(stats.invariant_violations, 0);
}

#[test_log::test]
fn cancelled_runs_are_short() {
    let mut app = corridor_app(Scenario::Cancel);
    let stats = app.run(4.0).expect("a clean run");

    assert!(
        stats
            .transitions
            .iter()
            .any(|(_, transition)| transition.reason == TransitionReason::Cancelled),
        "{:?}",
        stats.transitions
    );
    assert!(stats.longest_wall_run < 0.05);
}

#[test_log::test]
fn idle_character_stays_put() {
    let mut app = corridor_app(Scenario::Idle);
    let spawn = Course::corridor().spawn;
    app.run(2.0).expect("a clean run");

    assert_eq!(app.movement().mode(), LocomotionMode::Grounded);
    assert!(app.movement().state().position.abs_diff_eq(spawn, 1.0e-3));
    assert!(app.physics().character_position().abs_diff_eq(spawn, 1.0e-3));
}

struct RandomInput {
    rng: StdRng,
}

impl InputAdapter for RandomInput {
    fn sample(&mut self, _state: &CharacterKinematicState) -> MovementIntent {
        let direction = Vec2::new(self.rng.random_range(-1.0..=1.0), self.rng.random_range(-1.0..=1.0));
        let jump = self.rng.random_bool(0.05);
        let cancel = self.rng.random_bool(0.02);
        MovementIntent::new(direction, jump, cancel).with_turn(self.rng.random_range(-1.0..=1.0))
    }
}

#[test_log::test]
fn random_input_keeps_the_invariants() {
    let config = MovementConfig::default();
    let cap = config.max_wall_run_duration;
    let course = Course::corridor();
    let dt = 1.0 / TICK_RATE as f32;

    for seed in 0..4 {
        let mut input = RandomInput {
            rng: StdRng::seed_from_u64(seed),
        };
        let mut physics = PhysicsState::new(&config, &course, dt);
        let facing = Facing::from_yaw(course.spawn_yaw.to_radians());
        let mut machine = MovementStateMachine::new(config.clone(), course.spawn, facing);

        for _ in 0..(10 * TICK_RATE) {
            let previous = machine.mode();
            let intent = input.sample(machine.state());
            let report = machine.tick(&mut physics, &intent, dt);
            physics.update_fixed();

            assert!(machine.invariant_holds(), "seed {}", seed);
            assert!(machine.session().is_none_or(|session| session.elapsed <= cap));

            match report.transition {
                Some(transition) => {
                    assert_eq!(transition.from, previous);
                    assert_eq!(transition.to, machine.mode());
                    if transition.to == LocomotionMode::WallRunning {
                        assert_eq!(transition.from, LocomotionMode::Falling);
                    }
                }
                None => assert_eq!(previous, machine.mode()),
            }

            if let Some(session) = report.ended_session {
                assert_eq!(previous, LocomotionMode::WallRunning);
                assert!(session.elapsed <= cap);
                assert!(
                    machine.state().velocity.dot(session.surface.normal) >= 0.0,
                    "seed {}: left the wall into it with {}",
                    seed,
                    machine.state().velocity
                );
            }
        }
    }
}
