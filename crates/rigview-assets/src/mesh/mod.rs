//! Cuboid geometry: flat-shaded indexed triangle lists built from models.

mod builder;
mod textured;
mod vertex;

pub use builder::{Face, MeshBuilder, build_model_mesh};
pub use textured::{TexturedMeshBuilder, box_uv_rect, build_textured_model_mesh};
pub use vertex::{MeshData, TexturedVertex, Vertex};
