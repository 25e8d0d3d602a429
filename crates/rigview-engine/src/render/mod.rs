//! Render pipeline building blocks.
//!
//! Conventions:
//! - world space is left-handed, +Y up, one block per unit
//! - the camera matrix lives in a uniform at bind group 0
//! - textured materials add their texture and sampler at bind group 1

mod ctx;
pub(crate) mod pipeline;

pub use ctx::RenderCtx;
pub use pipeline::CameraUniform;
