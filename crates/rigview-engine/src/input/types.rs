/// Keys the viewer binds, by physical position (US layout names).
///
/// Everything else arrives as `Key::Other` so held-key bookkeeping still
/// sees it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Escape,
    Other,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: Key, state: ButtonState, repeat: bool },
    Button { button: MouseButton, state: ButtonState },

    /// Cursor position in logical pixels.
    CursorMoved { x: f32, y: f32 },
    CursorLeft,

    /// Unaccelerated device motion. Keeps arriving while the cursor is locked.
    RawMotion { dx: f32, dy: f32 },

    /// Wheel movement in lines; pixel deltas are converted by the platform layer.
    Scroll { x: f32, y: f32 },

    Focused(bool),
}
