use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{ButtonState, InputEvent, Key, MouseButton};

/// Held keys and buttons plus the last cursor position.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,
    /// Logical pixels; `None` while the cursor is outside the window.
    pub cursor: Option<(f32, f32)>,
    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Folds `ev` into the held state and records transitions in `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        frame.event_count += 1;
        match ev {
            InputEvent::Focused(focused) => {
                self.focused = focused;
                if !focused {
                    // Releases are not delivered while unfocused.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::CursorMoved { x, y } => {
                if let Some((px, py)) = self.cursor {
                    frame.cursor_delta.0 += x - px;
                    frame.cursor_delta.1 += y - py;
                }
                self.cursor = Some((x, y));
            }

            InputEvent::CursorLeft => self.cursor = None,

            InputEvent::RawMotion { dx, dy } => {
                frame.motion_delta.0 += dx;
                frame.motion_delta.1 += dy;
            }

            InputEvent::Key { key, state, repeat } => match state {
                ButtonState::Pressed if !repeat => {
                    if self.keys_down.insert(key) {
                        frame.keys_pressed.insert(key);
                    }
                }
                ButtonState::Pressed => {}
                ButtonState::Released => {
                    self.keys_down.remove(&key);
                }
            },

            InputEvent::Button { button, state } => match state {
                ButtonState::Pressed => {
                    if self.buttons_down.insert(button) {
                        frame.buttons_pressed.insert(button);
                    }
                }
                ButtonState::Released => {
                    self.buttons_down.remove(&button);
                }
            },

            InputEvent::Scroll { x, y } => {
                frame.scroll.0 += x;
                frame.scroll.1 += y;
            }
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: ButtonState, repeat: bool) -> InputEvent {
        InputEvent::Key { key, state, repeat }
    }

    #[test]
    fn key_transitions_are_recorded_once() {
        let (mut state, mut frame) = (InputState::default(), InputFrame::default());
        state.apply_event(&mut frame, key(Key::W, ButtonState::Pressed, false));
        state.apply_event(&mut frame, key(Key::W, ButtonState::Pressed, true));
        assert!(state.key_down(Key::W));
        assert_eq!(frame.keys_pressed.len(), 1);
        assert_eq!(frame.event_count, 2);

        state.apply_event(&mut frame, key(Key::W, ButtonState::Released, false));
        assert!(!state.key_down(Key::W));
    }

    #[test]
    fn cursor_and_motion_deltas_accumulate() {
        let (mut state, mut frame) = (InputState::default(), InputFrame::default());
        state.apply_event(&mut frame, InputEvent::CursorMoved { x: 10.0, y: 10.0 });
        assert_eq!(frame.cursor_delta, (0.0, 0.0));
        state.apply_event(&mut frame, InputEvent::CursorMoved { x: 13.0, y: 8.0 });
        state.apply_event(&mut frame, InputEvent::CursorMoved { x: 14.0, y: 8.0 });
        assert_eq!(frame.cursor_delta, (4.0, -2.0));

        state.apply_event(&mut frame, InputEvent::RawMotion { dx: 1.5, dy: -0.5 });
        state.apply_event(&mut frame, InputEvent::RawMotion { dx: 1.5, dy: -0.5 });
        assert_eq!(frame.motion_delta, (3.0, -1.0));

        frame.clear();
        assert_eq!(frame.motion_delta, (0.0, 0.0));
        assert_eq!(frame.event_count, 0);
        // Position survives the tick; only deltas reset.
        assert_eq!(state.cursor, Some((14.0, 8.0)));
    }

    #[test]
    fn cursor_reentry_does_not_jump() {
        let (mut state, mut frame) = (InputState::default(), InputFrame::default());
        state.apply_event(&mut frame, InputEvent::CursorMoved { x: 0.0, y: 0.0 });
        state.apply_event(&mut frame, InputEvent::CursorLeft);
        state.apply_event(&mut frame, InputEvent::CursorMoved { x: 300.0, y: 200.0 });
        assert_eq!(frame.cursor_delta, (0.0, 0.0));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let (mut state, mut frame) = (InputState::default(), InputFrame::default());
        state.apply_event(&mut frame, key(Key::A, ButtonState::Pressed, false));
        state.apply_event(
            &mut frame,
            InputEvent::Button { button: MouseButton::Left, state: ButtonState::Pressed },
        );
        state.apply_event(&mut frame, InputEvent::Focused(false));
        assert!(state.keys_down.is_empty());
        assert!(!state.button_down(MouseButton::Left));
    }
}
