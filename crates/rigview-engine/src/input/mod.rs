//! Keyboard and mouse state.
//!
//! The runtime turns winit events into [`InputEvent`]s, folds them into
//! [`InputState`] and [`InputFrame`], and gives each tick an
//! [`InputSnapshot`].

mod frame;
pub(crate) mod platform;
mod snapshot;
mod state;
mod types;

pub use frame::InputFrame;
pub use snapshot::InputSnapshot;
pub use state::InputState;
pub use types::{ButtonState, InputEvent, Key, MouseButton};
