use std::collections::{BTreeMap, HashMap};

use image::RgbaImage;

use super::meta::AtlasMeta;
use super::pack::AtlasPacker;
use super::sheet::{Sheet, UvRect, mip_chain};
use crate::error::AtlasError;
use crate::loader::ResourceLoader;

/// A logical atlas item resolved to sheet coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasItem {
    pub quad: Option<i64>,
    /// One rect per texture element, in declaration order.
    pub uvs: Vec<UvRect>,
}

/// Packed sheet, its pixels (with mip chain) and the resolved items.
#[derive(Debug, Clone)]
pub struct TextureAtlas {
    pub resource_pack_name: String,
    pub texture_name: String,
    sheet: Sheet,
    /// Level 0 first.
    mips: Vec<RgbaImage>,
    items: BTreeMap<String, AtlasItem>,
}

impl TextureAtlas {
    /// Reads the metadata at `meta_path` and builds the atlas from it.
    pub fn load(loader: &dyn ResourceLoader, meta_path: &str) -> Result<Self, AtlasError> {
        let bytes = loader.load_file(meta_path)?;
        let meta = AtlasMeta::from_json_slice(meta_path, &bytes)?;
        Self::from_meta(loader, &meta, None)
    }

    /// Loads every referenced texture, packs, composes and resolves items.
    ///
    /// `max_size` caps the sheet edge; pass the device texture limit.
    pub fn from_meta(
        loader: &dyn ResourceLoader,
        meta: &AtlasMeta,
        max_size: Option<u32>,
    ) -> Result<Self, AtlasError> {
        let mut sprites = HashMap::new();
        let mut packer = AtlasPacker::new().with_padding(meta.padding);
        if let Some(max) = max_size {
            packer = packer.with_max_size(max);
        }
        for path in meta.required_textures() {
            let img = loader.load_texture(path)?;
            packer.add(path, img.width(), img.height());
            sprites.insert(path.to_string(), img);
        }

        let sheet = packer.pack()?;
        let base = sheet.compose(&sprites)?;
        let mips = mip_chain(&base, meta.num_mip_levels);

        let mut items = BTreeMap::new();
        for (name, node) in &meta.texture_data {
            let uvs = node
                .paths()
                .into_iter()
                .map(|path| {
                    sheet.uv_rect(path).ok_or_else(|| AtlasError::MissingSprite {
                        item: name.clone(),
                        path: path.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            items.insert(name.clone(), AtlasItem { quad: node.quad, uvs });
        }

        log::info!(
            "atlas '{}': {} sprites, {} items, {}x{} sheet, {} mip levels",
            meta.texture_name,
            sheet.len(),
            items.len(),
            sheet.width(),
            sheet.height(),
            mips.len()
        );

        Ok(Self {
            resource_pack_name: meta.resource_pack_name.clone(),
            texture_name: meta.texture_name.clone(),
            sheet,
            mips,
            items,
        })
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    pub fn image(&self) -> &RgbaImage {
        &self.mips[0]
    }

    pub fn mips(&self) -> &[RgbaImage] {
        &self.mips
    }

    pub fn item(&self, name: &str) -> Option<&AtlasItem> {
        self.items.get(name)
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, &AtlasItem)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v))
    }
}
