use std::collections::HashSet;

use super::types::{Key, MouseButton};

/// What changed since the last tick.
///
/// [`super::InputState`] holds what is currently down. The runtime clears
/// this after every frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    pub keys_pressed: HashSet<Key>,
    pub buttons_pressed: HashSet<MouseButton>,

    /// Summed cursor movement, logical pixels.
    pub cursor_delta: (f32, f32),
    pub motion_delta: (f32, f32),
    /// Lines.
    pub scroll: (f32, f32),

    pub event_count: usize,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
        self.buttons_pressed.clear();
        self.cursor_delta = (0.0, 0.0);
        self.motion_delta = (0.0, 0.0);
        self.scroll = (0.0, 0.0);
        self.event_count = 0;
    }
}
