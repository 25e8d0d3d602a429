//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the window, and wires them to the frame
//! orchestrator and the application.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
