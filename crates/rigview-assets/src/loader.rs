//! Resource loading: raw bytes and decoded RGBA8 textures.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use crate::error::ResourceError;

/// Extensions tried, in order, for texture paths that carry none.
const TEXTURE_EXTENSIONS: &[&str] = &["png", "tga"];

/// Source of asset bytes.
///
/// Paths are `/`-separated and relative to whatever root the loader serves.
pub trait ResourceLoader {
    fn load_file(&self, path: &str) -> Result<Vec<u8>, ResourceError>;

    /// Loads and decodes an image, widening RGB/grey sources to RGBA8.
    ///
    /// Paths without an extension try `.png` then `.tga`.
    fn load_texture(&self, path: &str) -> Result<RgbaImage, ResourceError> {
        for candidate in texture_candidates(path) {
            match self.load_file(&candidate) {
                Ok(bytes) => return decode_rgba(&candidate, &bytes),
                Err(ResourceError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(ResourceError::NotFound { path: path.to_string() })
    }
}

fn texture_candidates(path: &str) -> Vec<String> {
    if Path::new(path).extension().is_some() {
        return vec![path.to_string()];
    }
    TEXTURE_EXTENSIONS.iter().map(|ext| format!("{path}.{ext}")).collect()
}

/// Decodes `bytes` using the format implied by `path`'s extension, falling
/// back to content sniffing.
pub fn decode_rgba(path: &str, bytes: &[u8]) -> Result<RgbaImage, ResourceError> {
    let decoded = match ImageFormat::from_path(path) {
        Ok(format) => image::load_from_memory_with_format(bytes, format),
        Err(_) => image::load_from_memory(bytes),
    };
    decoded
        .map(|img| img.to_rgba8())
        .map_err(|e| ResourceError::Decode { path: path.to_string(), message: e.to_string() })
}

/// Serves files below a root directory.
#[derive(Debug, Clone)]
pub struct DirLoader {
    root: PathBuf,
}

impl DirLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceLoader for DirLoader {
    fn load_file(&self, path: &str) -> Result<Vec<u8>, ResourceError> {
        let full = self.root.join(path);
        std::fs::read(&full).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ResourceError::NotFound { path: full.display().to_string() },
            _ => ResourceError::Io { path: full.display().to_string(), source },
        })
    }
}

/// In-memory file table.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), bytes.into());
    }

    pub fn with(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }
}

impl ResourceLoader for MemoryLoader {
    fn load_file(&self, path: &str) -> Result<Vec<u8>, ResourceError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound { path: path.to_string() })
    }
}
