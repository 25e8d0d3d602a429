//! GPU resource layer.
//!
//! Buffers, textures and materials (pipeline + bindings) are owned by
//! [`GpuResources`] and addressed through generational handles. Every object
//! is created and destroyed explicitly; destroyed handles resolve to
//! [`DeviceError::StaleHandle`].

mod error;
mod handle;
mod store;
mod validate;

pub use error::DeviceError;
pub use handle::{Handle, HandleTable};
pub use store::{
    BufferHandle, GpuBuffer, GpuMesh, GpuResources, GpuTexture, Material, MaterialDesc, MaterialHandle,
    MaterialKind, MeshDraw, TextureHandle,
};
pub use validate::{MipLevel, check_upload_range};
