//! GPU device + surface management.
//!
//! Creates the wgpu instance, adapter, device and queue, and configures the
//! window surface (swapchain). Per-frame acquisition lives in `frame`.

mod error;
mod gpu;
mod init;
mod surface;

pub use error::{SurfaceErrorAction, classify_surface_error};
pub use gpu::Gpu;
pub use init::GpuInit;
pub use surface::frames_in_flight;
