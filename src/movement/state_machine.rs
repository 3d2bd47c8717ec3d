use crate::movement::config::MovementConfig;
use crate::movement::intent::MovementIntent;
use crate::movement::locomotion;
use crate::movement::state::{CharacterKinematicState, Facing, LocomotionMode, WallRunSession};
use crate::movement::wall_run_controller::WallRunController;
use crate::physics::character_movement_information::CharacterMovementInformation;
use crate::physics::surface_probe::{ProbeResult, SurfaceContact, SurfaceProbe};
use crate::physics::world::PhysicsWorld;
use glam::Vec3;
use log::{debug, trace, warn};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransitionReason {
    Jump,
    /// Neither ground nor a wall below/next to us.
    LostSupport,
    WallContact,
    WallContactLost,
    DurationCap,
    Cancelled,
    Landed,
    Apex,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: LocomotionMode,
    pub to: LocomotionMode,
    pub reason: TransitionReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub transition: Option<Transition>,
    /// The session that was closed during this tick, if we left the wall.
    pub ended_session: Option<WallRunSession>,
    pub probe: ProbeResult,
    pub movement: CharacterMovementInformation,
}

/// The wall we've most recently left, to keep us from instantly re-attaching to it.
#[derive(Debug, Copy, Clone)]
struct LastWall {
    normal: Vec3,
    left_at: f32,
}

/// Owns the character's [`CharacterKinematicState`] and decides, once per tick, which
/// [`LocomotionMode`] it is in. The kinematics are delegated to the [`WallRunController`] while
/// wall running and to [`locomotion`] otherwise.
pub struct MovementStateMachine {
    config: MovementConfig,
    probe: SurfaceProbe,
    controller: WallRunController,
    state: CharacterKinematicState,
    session: Option<WallRunSession>,
    last_wall: Option<LastWall>,
    /// Simulation time in seconds
    clock: f32,
}

impl MovementStateMachine {
    /// Ticks longer than this are suspicious (debugger, hitch) but still simulated.
    const LONG_TICK: f32 = 0.25;
    /// Accumulated float error tolerated when checking whether a tick reaches the duration cap.
    const CAP_DRIFT: f32 = 1.0e-4;

    pub fn new(config: MovementConfig, position: Vec3, facing: Facing) -> Self {
        Self::with_state(config, CharacterKinematicState::new(position, facing))
    }

    /// Starts from an arbitrary state. A wall run can't be resumed without a contact, so
    /// `WallRunning` is turned into `Falling`.
    pub fn with_state(config: MovementConfig, mut state: CharacterKinematicState) -> Self {
        if state.mode == LocomotionMode::WallRunning {
            warn!("Cannot start in WallRunning without a wall, starting to fall instead");
            state.mode = LocomotionMode::Falling;
            state.time_in_mode = 0.0;
        }

        Self {
            probe: SurfaceProbe::new(&config),
            controller: WallRunController::new(&config),
            config,
            state,
            session: None,
            last_wall: None,
            clock: 0.0,
        }
    }

    pub fn state(&self) -> &CharacterKinematicState {
        &self.state
    }

    pub fn mode(&self) -> LocomotionMode {
        self.state.mode
    }

    pub fn session(&self) -> Option<&WallRunSession> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// A session exists iff we're wall running, and it never outlives the duration cap.
    pub fn invariant_holds(&self) -> bool {
        let session_matches = self.session.is_some() == (self.state.mode == LocomotionMode::WallRunning);
        let within_cap = self
            .session
            .as_ref()
            .is_none_or(|session| session.elapsed <= self.config.max_wall_run_duration);
        session_matches && within_cap
    }

    pub fn tick<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W, intent: &MovementIntent, dt: f32) -> TickReport {
        let probe = self.probe.sample(&*world, &self.state);

        if !(dt.is_finite() && dt > 0.0) {
            warn!("Skipping tick with invalid delta time {}", dt);
            return TickReport {
                transition: None,
                ended_session: None,
                probe,
                movement: self.movement_information(Vec3::ZERO),
            };
        }

        if dt > Self::LONG_TICK {
            warn!("Long tick of {}s, movement may tunnel", dt);
        }

        let (mut transition, mut ended_session) = self.evaluate_transitions(&probe, intent);

        // A wall run ends exactly at the cap, the rest of that tick is spent falling.
        let cap = self.config.max_wall_run_duration;
        let wall_time_left = self.session.as_ref().map(|session| session.remaining(cap));
        let reaches_cap = wall_time_left.is_some_and(|left| dt >= left - Self::CAP_DRIFT);
        let wall_dt = match wall_time_left {
            Some(left) if reaches_cap => left.min(dt),
            _ => dt,
        };

        let mut achieved = self.advance(world, &probe, intent, wall_dt);

        if reaches_cap {
            if let Some(session) = self.session.as_mut() {
                session.elapsed = cap;
            }
            let (cap_transition, cap_session) =
                self.transition_to(LocomotionMode::Falling, TransitionReason::DurationCap);
            // Attaching and hitting the cap within the same tick is still a single transition.
            transition = match (transition, cap_transition) {
                (Some(earlier), Some(cap_transition)) => Some(Transition {
                    from: earlier.from,
                    ..cap_transition
                }),
                (_, cap_transition) => cap_transition,
            };
            ended_session = cap_session;

            let rest = dt - wall_dt;
            if rest > 0.0 {
                achieved += self.advance(world, &probe, intent, rest);
            }
        }

        debug_assert!(self.invariant_holds());
        trace!(
            "{} at {} with velocity {} (ground: {:?})",
            self.state.mode, self.state.position, self.state.velocity, probe.ground_distance
        );

        TickReport {
            transition,
            ended_session,
            probe,
            movement: self.movement_information(achieved),
        }
    }

    /// Transition rules, in priority order. At most one transition happens per tick.
    fn evaluate_transitions(
        &mut self,
        probe: &ProbeResult,
        intent: &MovementIntent,
    ) -> (Option<Transition>, Option<WallRunSession>) {
        let mode = self.state.mode;

        if intent.jump_requested {
            let can_jump = match mode {
                LocomotionMode::Grounded | LocomotionMode::Falling => probe.ground_contact,
                LocomotionMode::WallRunning => self
                    .session
                    .as_ref()
                    .is_some_and(|session| session.elapsed >= self.config.min_wall_run_duration),
                LocomotionMode::Jumping => false,
            };

            if can_jump {
                return self.jump();
            } else if mode == LocomotionMode::WallRunning {
                debug!("Ignoring jump, the wall run has only just started");
            }
        }

        // Grounded needs ground, a wall next to us does not keep us standing. A jump only turns
        // into a fall at its apex.
        let lost_support = match mode {
            LocomotionMode::Falling | LocomotionMode::Jumping => false,
            LocomotionMode::Grounded => !probe.ground_contact,
            LocomotionMode::WallRunning => !probe.ground_contact && probe.wall.is_none(),
        };
        if lost_support {
            return self.transition_to(LocomotionMode::Falling, TransitionReason::LostSupport);
        }

        if mode == LocomotionMode::Falling {
            if let Some(contact) = probe.wall {
                if self.can_attach(&contact, intent) {
                    return self.attach(contact);
                }
            }
        }

        if mode == LocomotionMode::WallRunning {
            // The duration cap is enforced within the tick that reaches it, see `tick`.
            if probe.wall.is_none() {
                return self.transition_to(LocomotionMode::Falling, TransitionReason::WallContactLost);
            } else if intent.run_cancel_requested {
                return self.transition_to(LocomotionMode::Falling, TransitionReason::Cancelled);
            }
        }

        if mode.is_airborne() && probe.ground_contact && self.state.velocity.z <= 0.0 {
            return self.transition_to(LocomotionMode::Grounded, TransitionReason::Landed);
        }

        if mode == LocomotionMode::Jumping && self.state.velocity.z <= 0.0 {
            return self.transition_to(LocomotionMode::Falling, TransitionReason::Apex);
        }

        (None, None)
    }

    fn can_attach(&self, contact: &SurfaceContact, intent: &MovementIntent) -> bool {
        let lateral_speed = self.state.lateral_speed();
        if lateral_speed < self.config.min_wall_run_speed {
            trace!("Too slow for a wall run: {}", lateral_speed);
            return false;
        }

        let wish = self.state.facing.local_to_world(intent.direction);
        if wish.dot(-contact.normal) <= self.config.min_intent_toward_wall {
            trace!("Not steering towards the wall");
            return false;
        }

        if let Some(last) = self.last_wall {
            let same_wall = last.normal.dot(contact.normal) >= self.config.reattach_angle.to_radians().cos();
            if same_wall && self.clock - last.left_at < self.config.reattach_delay {
                trace!("Just left this wall");
                return false;
            }
        }

        true
    }

    fn attach(&mut self, contact: SurfaceContact) -> (Option<Transition>, Option<WallRunSession>) {
        let entry_velocity = self.state.velocity;
        // Attaching stops any fall, from here on only the scaled gravity pulls us down.
        self.state.velocity.z = self.state.velocity.z.max(0.0);
        self.session = Some(WallRunSession::new(self.clock, entry_velocity, contact));
        debug!(
            "Wall run started on {:?} wall (normal {}, entry speed {})",
            contact.side,
            contact.normal,
            entry_velocity.length()
        );
        self.set_mode(LocomotionMode::WallRunning, TransitionReason::WallContact)
    }

    fn jump(&mut self) -> (Option<Transition>, Option<WallRunSession>) {
        if self.state.mode == LocomotionMode::WallRunning {
            return self.leave_wall(LocomotionMode::Jumping, TransitionReason::Jump);
        }

        self.state.velocity.z = self.config.jump_velocity;
        self.set_mode(LocomotionMode::Jumping, TransitionReason::Jump)
    }

    fn transition_to(
        &mut self,
        to: LocomotionMode,
        reason: TransitionReason,
    ) -> (Option<Transition>, Option<WallRunSession>) {
        if self.state.mode == LocomotionMode::WallRunning {
            return self.leave_wall(to, reason);
        }

        if to == LocomotionMode::Grounded {
            self.state.velocity.z = 0.0;
        }
        self.set_mode(to, reason)
    }

    /// Closes the session and kicks us off the wall.
    fn leave_wall(
        &mut self,
        to: LocomotionMode,
        reason: TransitionReason,
    ) -> (Option<Transition>, Option<WallRunSession>) {
        let session = self.session.take();
        if let Some(session) = &session {
            let jump = reason == TransitionReason::Jump;
            self.state.velocity = self
                .controller
                .exit_velocity(self.state.velocity, &session.surface, jump);
            self.last_wall = Some(LastWall {
                normal: session.surface.normal,
                left_at: self.clock,
            });
            debug!(
                "Wall run ended after {}s ({:?}), exit velocity {}",
                session.elapsed, reason, self.state.velocity
            );
        }

        let (transition, _) = self.set_mode(to, reason);
        (transition, session)
    }

    fn set_mode(
        &mut self,
        to: LocomotionMode,
        reason: TransitionReason,
    ) -> (Option<Transition>, Option<WallRunSession>) {
        let transition = Transition {
            from: self.state.mode,
            to,
            reason,
        };
        debug!("{} -> {} ({:?})", transition.from, transition.to, reason);
        self.state.mode = to;
        self.state.time_in_mode = 0.0;
        (Some(transition), None)
    }

    /// Integrates and moves the character for `dt`, advancing all clocks.
    fn advance<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        probe: &ProbeResult,
        intent: &MovementIntent,
        dt: f32,
    ) -> Vec3 {
        self.integrate(probe, intent, dt);

        let desired = self.state.velocity * dt;
        let achieved = world.move_character(self.state.position, desired);
        self.state.position += achieved;

        if let Some(session) = self.session.as_mut() {
            session.elapsed += dt;
        }
        self.state.time_in_mode += dt;
        self.clock += dt;
        achieved
    }

    /// Per-mode kinematics for this tick.
    fn integrate(&mut self, probe: &ProbeResult, intent: &MovementIntent, dt: f32) {
        match (self.state.mode, self.session.as_mut(), probe.wall) {
            (LocomotionMode::WallRunning, Some(session), Some(contact)) => {
                let step = self.controller.step(&self.state, &contact, intent, dt);
                session.surface = SurfaceContact {
                    tangent: self.controller.run_direction(&self.state, &contact),
                    ..contact
                };
                self.state.velocity = step.velocity;
                self.state.facing = step.facing;
            }
            _ => {
                let step = locomotion::step(&self.state, intent, &self.config, dt);
                self.state.velocity = step.velocity;
                self.state.facing = self.controller.ease_roll(step.facing, dt);
            }
        }
    }

    fn movement_information(&self, delta_movement: Vec3) -> CharacterMovementInformation {
        CharacterMovementInformation {
            delta_movement,
            absolute_position: self.state.position,
            orientation: self.state.facing.yaw,
            rotation: self.state.facing.to_quat(),
            mode: self.state.mode,
        }
    }
}
