use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable overriding [`ViewerConfig::asset_root`].
pub const ASSETS_ENV: &str = "RIGVIEW_ASSETS";

/// What the viewer loads at startup. Paths are relative to `asset_root`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub asset_root: PathBuf,
    pub model_path: String,
    /// Box-UV skin for the model. Without one the model is flat shaded.
    pub skin_path: Option<String>,
    /// Atlas metadata; the preview board is skipped when `None`.
    pub atlas_meta_path: Option<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            model_path: "models/humanoid.geo.json".to_string(),
            skin_path: None,
            atlas_meta_path: Some("textures/terrain_texture.json".to_string()),
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> Self {
        Self::default().with_asset_root(std::env::var_os(ASSETS_ENV))
    }

    /// Replaces the asset root when `root` is set and non-empty.
    pub fn with_asset_root(mut self, root: Option<OsString>) -> Self {
        if let Some(root) = root.filter(|r| !r.is_empty()) {
            self.asset_root = PathBuf::from(root);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_replaces_root_only() {
        let config = ViewerConfig::default().with_asset_root(Some("/srv/rigs".into()));
        assert_eq!(config.asset_root, PathBuf::from("/srv/rigs"));
        assert_eq!(config.model_path, ViewerConfig::default().model_path);
    }

    #[test]
    fn empty_override_is_ignored() {
        let config = ViewerConfig::default().with_asset_root(Some(OsString::new()));
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(ViewerConfig::default().with_asset_root(None), ViewerConfig::default());
    }
}
