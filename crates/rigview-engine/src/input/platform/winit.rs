use winit::event::{DeviceEvent, ElementState, MouseButton as WinitButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::Window;

use crate::input::{ButtonState, InputEvent, Key, MouseButton};

/// Logical pixels per wheel line for touchpads reporting pixel deltas.
const PIXELS_PER_LINE: f32 = 20.0;

const KEY_BINDINGS: &[(KeyCode, Key)] = &[
    (KeyCode::KeyW, Key::W),
    (KeyCode::KeyA, Key::A),
    (KeyCode::KeyS, Key::S),
    (KeyCode::KeyD, Key::D),
    (KeyCode::Escape, Key::Escape),
];

/// Converts a window event into an [`InputEvent`], or `None` when input
/// tracking does not care about it.
pub fn translate_window_event(window: &Window, event: &WindowEvent) -> Option<InputEvent> {
    let ev = match event {
        WindowEvent::Focused(focused) => InputEvent::Focused(*focused),
        WindowEvent::CursorLeft { .. } => InputEvent::CursorLeft,
        WindowEvent::CursorMoved { position, .. } => {
            let p = position.to_logical::<f32>(window.scale_factor());
            InputEvent::CursorMoved { x: p.x, y: p.y }
        }
        WindowEvent::MouseInput { state, button, .. } => InputEvent::Button {
            button: map_button(*button),
            state: map_state(*state),
        },
        WindowEvent::MouseWheel { delta, .. } => {
            let (x, y) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                MouseScrollDelta::PixelDelta(p) => {
                    let p = p.to_logical::<f32>(window.scale_factor());
                    (p.x / PIXELS_PER_LINE, p.y / PIXELS_PER_LINE)
                }
            };
            InputEvent::Scroll { x, y }
        }
        WindowEvent::KeyboardInput { event, .. } => InputEvent::Key {
            key: map_key(event.physical_key),
            state: map_state(event.state),
            repeat: event.repeat,
        },
        _ => return None,
    };
    Some(ev)
}

/// Only raw mouse motion is used from device events.
pub fn translate_device_event(event: &DeviceEvent) -> Option<InputEvent> {
    match *event {
        DeviceEvent::MouseMotion { delta: (dx, dy) } => Some(InputEvent::RawMotion { dx: dx as f32, dy: dy as f32 }),
        _ => None,
    }
}

fn map_state(state: ElementState) -> ButtonState {
    match state {
        ElementState::Pressed => ButtonState::Pressed,
        ElementState::Released => ButtonState::Released,
    }
}

fn map_button(button: WinitButton) -> MouseButton {
    match button {
        WinitButton::Left => MouseButton::Left,
        WinitButton::Right => MouseButton::Right,
        WinitButton::Middle => MouseButton::Middle,
        _ => MouseButton::Other,
    }
}

fn map_key(key: PhysicalKey) -> Key {
    match key {
        PhysicalKey::Code(code) => KEY_BINDINGS
            .iter()
            .find(|(bound, _)| *bound == code)
            .map_or(Key::Other, |(_, key)| *key),
        PhysicalKey::Unidentified(_) => Key::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_keys_map_by_position() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyW)), Key::W);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Escape)), Key::Escape);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::NumpadAdd)), Key::Other);
    }

    #[test]
    fn extra_mouse_buttons_collapse() {
        assert_eq!(map_button(WinitButton::Back), MouseButton::Other);
        assert_eq!(map_button(WinitButton::Other(7)), MouseButton::Other);
        assert_eq!(map_button(WinitButton::Right), MouseButton::Right);
    }

    #[test]
    fn raw_motion_is_translated() {
        let ev = translate_device_event(&DeviceEvent::MouseMotion { delta: (3.0, -2.0) });
        assert_eq!(ev, Some(InputEvent::RawMotion { dx: 3.0, dy: -2.0 }));
    }
}
