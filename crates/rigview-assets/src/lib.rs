//! CPU-side assets for **rigview**.
//!
//! Everything in this crate is plain data: it turns model descriptions and
//! sprite images into vertex/index buffers and packed texture sheets that the
//! engine uploads once at startup.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`model`] | `Model`, `Bone`, `Cuboid` (bone/cuboid model descriptions) |
//! | [`mesh`] | `Vertex`, `TexturedVertex`, `MeshBuilder`, `TexturedMeshBuilder` |
//! | [`atlas`] | `AtlasPacker`, `Sheet`, `AtlasMeta`, `TextureAtlas` |
//! | [`loader`] | `ResourceLoader`, `DirLoader`, `MemoryLoader` |
//! | [`error`] | `ResourceError`, `ModelError`, `PackingError`, `AtlasError` |
//!
//! # Quick start
//!
//! ```rust
//! use rigview_assets::mesh::build_model_mesh;
//! use rigview_assets::model::Model;
//!
//! let src = r#"{
//!     "bones": [
//!         { "name": "body", "pivot": [0, 24, 0],
//!           "cubes": [ { "origin": [-4, 12, -2], "size": [8, 12, 4], "uv": [16, 16] } ] },
//!         { "name": "waist", "pivot": [0, 12, 0], "neverRender": true }
//!     ]
//! }"#;
//!
//! let model = Model::from_json_str(src).unwrap();
//! let mesh = build_model_mesh(&model);
//! assert_eq!(mesh.vertices.len(), 24);
//! assert_eq!(mesh.indices.len(), 36);
//! ```

pub mod atlas;
pub mod error;
pub mod loader;
pub mod mesh;
pub mod model;

pub use error::{AtlasError, ModelError, PackingError, ResourceError};
pub use image::RgbaImage;
