use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::error::ResourceError;

/// Atlas metadata document (`terrain_texture.json` style).
#[derive(Debug, Clone, Deserialize)]
pub struct AtlasMeta {
    #[serde(default)]
    pub resource_pack_name: String,
    pub texture_name: String,
    #[serde(default)]
    pub padding: u32,
    #[serde(default = "default_mip_levels")]
    pub num_mip_levels: u32,
    pub texture_data: BTreeMap<String, AtlasNode>,
}

fn default_mip_levels() -> u32 {
    1
}

/// One logical item: a face index and one or more texture elements.
#[derive(Debug, Clone, Deserialize)]
pub struct AtlasNode {
    pub quad: Option<i64>,
    pub textures: Textures,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Textures {
    Many(Vec<Element>),
    One(Element),
}

/// A texture reference, either a bare path or an object with extra colors.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Element {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        overlay_color: Option<String>,
        #[serde(default)]
        tint_color: Option<String>,
    },
}

impl Element {
    pub fn path(&self) -> &str {
        match self {
            Element::Path(p) | Element::Detailed { path: p, .. } => p,
        }
    }
}

impl AtlasNode {
    /// Texture paths in declaration order. Every array element is kept.
    pub fn paths(&self) -> Vec<&str> {
        match &self.textures {
            Textures::One(e) => vec![e.path()],
            Textures::Many(list) => list.iter().map(Element::path).collect(),
        }
    }
}

impl AtlasMeta {
    pub fn from_json_slice(path: &str, bytes: &[u8]) -> Result<Self, ResourceError> {
        serde_json::from_slice(bytes).map_err(|e| ResourceError::malformed(path, e))
    }

    /// Every distinct texture path referenced by any item, sorted.
    pub fn required_textures(&self) -> BTreeSet<&str> {
        self.texture_data.values().flat_map(AtlasNode::paths).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const META: &str = r##"{
        "resource_pack_name": "vanilla",
        "texture_name": "atlas.terrain",
        "padding": 8,
        "num_mip_levels": 4,
        "texture_data": {
            "stone": { "textures": "textures/blocks/stone" },
            "grass": {
                "textures": [
                    "textures/blocks/grass_top",
                    { "path": "textures/blocks/dirt", "tint_color": "#79c05a" },
                    "textures/blocks/grass_side"
                ]
            },
            "lamp": { "quad": 1, "textures": { "path": "textures/blocks/lamp" } }
        }
    }"##;

    #[test]
    fn parses_all_element_shapes() {
        let meta = AtlasMeta::from_json_slice("meta.json", META.as_bytes()).unwrap();
        assert_eq!(meta.resource_pack_name, "vanilla");
        assert_eq!(meta.texture_name, "atlas.terrain");
        assert_eq!((meta.padding, meta.num_mip_levels), (8, 4));

        assert_eq!(meta.texture_data["stone"].paths(), ["textures/blocks/stone"]);
        assert_eq!(meta.texture_data["lamp"].quad, Some(1));
        assert_eq!(meta.texture_data["lamp"].paths(), ["textures/blocks/lamp"]);
    }

    #[test]
    fn array_keeps_every_element_in_order() {
        let meta = AtlasMeta::from_json_slice("meta.json", META.as_bytes()).unwrap();
        assert_eq!(
            meta.texture_data["grass"].paths(),
            ["textures/blocks/grass_top", "textures/blocks/dirt", "textures/blocks/grass_side"]
        );
        assert_eq!(meta.required_textures().len(), 5);
    }

    #[test]
    fn missing_fields_are_malformed() {
        let err = AtlasMeta::from_json_slice("meta.json", br#"{ "padding": 1 }"#).unwrap_err();
        assert!(matches!(err, ResourceError::Malformed { .. }));
    }
}
