//! rigview engine crate.
//!
//! Owns the platform + GPU runtime: device and surface setup, the per-slot
//! frame orchestrator, GPU resource tables, the free-look camera and the
//! winit event loop that ties them together.

pub mod camera;
pub mod core;
pub mod device;
pub mod frame;
pub mod input;
pub mod logging;
pub mod render;
pub mod resources;
pub mod time;
pub mod window;
