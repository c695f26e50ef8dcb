//! Host input snapshot
//!
//! The host reports which keys are held and where the pointer is. `InputState`
//! keeps the previous snapshot so one-shot actions (pause clicks, menu
//! confirms) fire on the press only.

use glam::Vec2;

use crate::sim::TickInput;

/// Keys and pointer as held right now
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub pointer: Option<Vec2>,
    pub pointer_down: bool,
}

/// Current and previous snapshot
#[derive(Debug, Clone, Default)]
pub struct InputState {
    current: InputSnapshot,
    previous: InputSnapshot,
    /// Let the autopilot drive
    pub autopilot: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held state with a new frame's snapshot
    pub fn update(&mut self, snapshot: InputSnapshot) {
        self.previous = self.current;
        self.current = snapshot;
    }

    pub fn current(&self) -> &InputSnapshot {
        &self.current
    }

    pub fn jump_pressed(&self) -> bool {
        self.current.jump && !self.previous.jump
    }

    pub fn pointer_pressed(&self) -> bool {
        self.current.pointer_down && !self.previous.pointer_down
    }

    /// Input for the next simulation tick
    ///
    /// Jump passes through as held; the player's own latch handles repeats.
    /// The pointer press is an edge and is consumed, so a frame that runs
    /// several substeps reports it once.
    pub fn tick_input(&mut self) -> TickInput {
        let input = TickInput {
            left: self.current.left,
            right: self.current.right,
            jump: self.current.jump,
            pointer: self.current.pointer,
            pointer_pressed: self.pointer_pressed(),
            autopilot: self.autopilot,
        };
        self.previous.pointer_down = self.current.pointer_down;
        input
    }
}
