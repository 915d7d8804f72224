//! Input events and their accumulation into per-tick commands

use std::collections::VecDeque;

use glam::Vec2;

use crate::sim::{TickInput, WeaponId};

/// Host input, already translated from devices
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Held movement direction (zero to stop)
    Move(Vec2),
    /// Pointer position in playfield coordinates
    Aim(Vec2),
    FireDown,
    FireUp,
    SelectWeapon(WeaponId),
    /// +1 next, -1 previous
    CycleWeapon(i32),
    Dash,
    ShieldSkill,
    Pause,
    /// Toggle the demo autopilot
    Autopilot,
    Quit,
}

/// Source of input events, polled once per tick
pub trait InputSource {
    fn poll(&mut self) -> Vec<InputEvent>;
}

/// Held state plus one-shot commands waiting for the next tick
#[derive(Debug, Clone, Default)]
pub struct InputState {
    input: TickInput,
    quit: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: InputEvent) {
        let input = &mut self.input;
        match event {
            InputEvent::Move(dir) => input.move_dir = dir,
            InputEvent::Aim(pos) => input.aim = Some(pos),
            InputEvent::FireDown => input.fire = true,
            InputEvent::FireUp => input.fire = false,
            InputEvent::SelectWeapon(id) => input.select_weapon = Some(id),
            InputEvent::CycleWeapon(step) => input.cycle_weapon = step.signum(),
            InputEvent::Dash => input.dash = true,
            InputEvent::ShieldSkill => input.shield = true,
            InputEvent::Pause => input.pause = !input.pause,
            InputEvent::Autopilot => input.idle_mode = !input.idle_mode,
            InputEvent::Quit => self.quit = true,
        }
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        for event in events {
            self.apply(event);
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn set_autopilot(&mut self, on: bool) {
        self.input.idle_mode = on;
    }

    /// Commands for the current tick
    pub fn current(&self) -> &TickInput {
        &self.input
    }

    /// Clear one-shot inputs after a tick has consumed them
    pub fn end_tick(&mut self) {
        let input = &mut self.input;
        input.aim = None;
        input.dash = false;
        input.shield = false;
        input.pause = false;
        input.select_weapon = None;
        input.cycle_weapon = 0;
    }
}

/// Replays a fixed list of per-tick event batches, then stays silent
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<Vec<InputEvent>>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = Vec<InputEvent>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.frames.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        self.frames.pop_front().unwrap_or_default()
    }
}
