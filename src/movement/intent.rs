use crate::movement::state::CharacterKinematicState;
use glam::Vec2;
use log::warn;
use std::collections::HashMap;

/// What the player wants to do during one tick. Built fresh each tick and never retained.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct MovementIntent {
    /// Character-local direction: x is forward, y is right. Either unit length or zero.
    pub direction: Vec2,
    pub jump_requested: bool,
    pub run_cancel_requested: bool,
    /// Yaw input in [-1, 1], positive turns right.
    pub turn: f32,
}

impl MovementIntent {
    /// Sanitizes raw input: directions are normalized (tiny or non-finite ones become zero) and
    /// the turn axis is clamped.
    pub fn new(direction: Vec2, jump_requested: bool, run_cancel_requested: bool) -> Self {
        Self {
            direction: Self::sanitize_direction(direction),
            jump_requested,
            run_cancel_requested,
            turn: 0.0,
        }
    }

    pub fn idle() -> Self {
        Self::default()
    }

    pub fn forward() -> Self {
        Self::new(Vec2::X, false, false)
    }

    pub fn with_turn(mut self, turn: f32) -> Self {
        self.turn = if turn.is_finite() { turn.clamp(-1.0, 1.0) } else { 0.0 };
        self
    }

    pub fn with_jump(mut self) -> Self {
        self.jump_requested = true;
        self
    }

    pub fn with_cancel(mut self) -> Self {
        self.run_cancel_requested = true;
        self
    }

    fn sanitize_direction(direction: Vec2) -> Vec2 {
        if !direction.is_finite() {
            warn!("Discarding non-finite movement direction {:?}", direction);
            return Vec2::ZERO;
        }
        if direction.length_squared() < 1.0e-6 {
            return Vec2::ZERO;
        }
        direction.normalize_or_zero()
    }
}

/// Anything that can produce one [`MovementIntent`] per tick: a keyboard, a gamepad, a replay.
pub trait InputAdapter {
    fn sample(&mut self, state: &CharacterKinematicState) -> MovementIntent;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Button {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
    Jump,
    CancelRun,
}

/// Keeps the pressed state of the movement buttons, like a scancode map fed from window events.
#[derive(Debug, Default)]
pub struct KeyboardInput {
    buttons: HashMap<Button, bool>,
    jump_consumed: bool,
}

impl KeyboardInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, button: Button, pressed: bool) {
        if button == Button::Jump && !pressed {
            self.jump_consumed = false;
        }
        self.buttons.insert(button, pressed);
    }

    pub fn pressed(&self, button: Button) -> bool {
        self.buttons.get(&button).copied().unwrap_or(false)
    }

    fn axis(&self, positive: Button, negative: Button) -> f32 {
        let mut value = 0.0;
        if self.pressed(positive) {
            value += 1.0;
        }
        if self.pressed(negative) {
            value -= 1.0;
        }
        value
    }
}

impl InputAdapter for KeyboardInput {
    fn sample(&mut self, _state: &CharacterKinematicState) -> MovementIntent {
        let direction = Vec2::new(
            self.axis(Button::Forward, Button::Backward),
            self.axis(Button::StrafeRight, Button::StrafeLeft),
        );

        // A held jump button only jumps once, it has to be released in between.
        let jump = self.pressed(Button::Jump) && !self.jump_consumed;
        if jump {
            self.jump_consumed = true;
        }

        MovementIntent::new(direction, jump, self.pressed(Button::CancelRun))
            .with_turn(self.axis(Button::TurnRight, Button::TurnLeft))
    }
}

/// Plays back a list of `(ticks, intent)` segments, then idles.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    segments: Vec<(u32, MovementIntent)>,
    segment: usize,
    ticks_in_segment: u32,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, ticks: u32, intent: MovementIntent) -> Self {
        self.segments.push((ticks, intent));
        self
    }

    pub fn is_finished(&self) -> bool {
        self.segment >= self.segments.len()
    }
}

impl InputAdapter for ScriptedInput {
    fn sample(&mut self, _state: &CharacterKinematicState) -> MovementIntent {
        while let Some(&(ticks, intent)) = self.segments.get(self.segment) {
            if self.ticks_in_segment < ticks {
                self.ticks_in_segment += 1;
                return intent;
            }
            self.segment += 1;
            self.ticks_in_segment = 0;
        }
        MovementIntent::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::state::Facing;
    use glam::Vec3;

    fn state() -> CharacterKinematicState {
        CharacterKinematicState::new(Vec3::ZERO, Facing::default())
    }

    #[test]
    fn directions_are_normalized() {
        let intent = MovementIntent::new(Vec2::new(3.0, 4.0), false, false);
        assert!((intent.direction.length() - 1.0).abs() < 1.0e-6);
        assert_eq!(MovementIntent::new(Vec2::new(1.0e-5, 0.0), false, false).direction, Vec2::ZERO);
        assert_eq!(MovementIntent::new(Vec2::new(f32::NAN, 1.0), false, false).direction, Vec2::ZERO);
        assert_eq!(MovementIntent::new(Vec2::new(f32::INFINITY, 1.0), false, false).direction, Vec2::ZERO);
    }

    #[test]
    fn turn_is_clamped() {
        assert_eq!(MovementIntent::idle().with_turn(5.0).turn, 1.0);
        assert_eq!(MovementIntent::idle().with_turn(f32::NAN).turn, 0.0);
    }

    #[test]
    fn keyboard_diagonal() {
        let mut keyboard = KeyboardInput::new();
        keyboard.set(Button::Forward, true);
        keyboard.set(Button::StrafeLeft, true);
        let intent = keyboard.sample(&state());
        let expected = Vec2::new(1.0, -1.0).normalize();
        assert!(intent.direction.abs_diff_eq(expected, 1.0e-6));
        assert!(!intent.jump_requested);
    }

    #[test]
    fn keyboard_jump_needs_release() {
        let mut keyboard = KeyboardInput::new();
        keyboard.set(Button::Jump, true);
        assert!(keyboard.sample(&state()).jump_requested);
        assert!(!keyboard.sample(&state()).jump_requested);
        keyboard.set(Button::Jump, false);
        keyboard.set(Button::Jump, true);
        assert!(keyboard.sample(&state()).jump_requested);
    }

    #[test]
    fn script_plays_segments_in_order() {
        let mut script = ScriptedInput::new()
            .then(2, MovementIntent::forward())
            .then(1, MovementIntent::idle().with_jump());
        let s = state();
        assert_eq!(script.sample(&s), MovementIntent::forward());
        assert_eq!(script.sample(&s), MovementIntent::forward());
        assert!(script.sample(&s).jump_requested);
        assert_eq!(script.sample(&s), MovementIntent::idle());
        assert!(script.is_finished());
    }
}
