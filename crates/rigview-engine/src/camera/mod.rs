//! Free-look camera driven by per-tick input snapshots.

mod controller;
mod projection;

pub use controller::{CameraConfig, CameraController, CursorMode, PITCH_LIMIT, look_factor};
pub use projection::{Perspective, aspect_ratio};
