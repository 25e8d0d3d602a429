use std::collections::HashSet;

use super::frame::InputFrame;
use super::state::InputState;
use super::types::{Key, MouseButton};

/// Frozen input for one tick.
///
/// Captured once per frame so update code never sees events that arrive
/// halfway through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    pub focused: bool,
    pub cursor: Option<(f32, f32)>,
    keys_down: HashSet<Key>,
    keys_pressed: HashSet<Key>,
    buttons_down: HashSet<MouseButton>,
    cursor_delta: (f32, f32),
    motion_delta: (f32, f32),
    scroll: (f32, f32),
}

impl InputSnapshot {
    pub fn capture(state: &InputState, frame: &InputFrame) -> Self {
        Self {
            focused: state.focused,
            cursor: state.cursor,
            keys_down: state.keys_down.clone(),
            keys_pressed: frame.keys_pressed.clone(),
            buttons_down: state.buttons_down.clone(),
            cursor_delta: frame.cursor_delta,
            motion_delta: frame.motion_delta,
            scroll: frame.scroll,
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Went down during this tick. Auto-repeat does not count.
    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    /// Raw device motion when there was any this tick, else the cursor delta.
    pub fn look_delta(&self) -> (f32, f32) {
        if self.motion_delta != (0.0, 0.0) {
            self.motion_delta
        } else {
            self.cursor_delta
        }
    }

    pub fn scroll(&self) -> (f32, f32) {
        self.scroll
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.keys_down.insert(key);
        self
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.buttons_down.insert(button);
        self
    }

    pub fn with_motion(mut self, dx: f32, dy: f32) -> Self {
        self.motion_delta = (dx, dy);
        self
    }
}
