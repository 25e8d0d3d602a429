//! Texture atlas: packing, sheet composition and metadata-driven loading.

mod build;
mod meta;
mod pack;
mod sheet;

pub use build::{AtlasItem, TextureAtlas};
pub use meta::{AtlasMeta, AtlasNode, Element, Textures};
pub use pack::{AtlasHolder, AtlasPacker, pack};
pub use sheet::{Placement, PixelRect, Sheet, UvRect, mip_chain};
