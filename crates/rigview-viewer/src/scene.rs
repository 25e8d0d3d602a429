use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use rigview_assets::atlas::{AtlasMeta, TextureAtlas};
use rigview_assets::loader::{DirLoader, ResourceLoader};
use rigview_assets::RgbaImage;
use rigview_assets::mesh::{
    MeshData, TexturedMeshBuilder, TexturedVertex, Vertex, build_model_mesh, build_textured_model_mesh,
};
use rigview_assets::model::Model;

use crate::config::ViewerConfig;

/// Sheet edge cap at pack time; wgpu's default 2D texture limit. The upload
/// checks the sheet again against the adapter's actual limit.
const MAX_SHEET_SIZE: u32 = 8192;

/// Where the atlas preview board stands, in world units.
const BOARD_ORIGIN: Vec3 = Vec3::new(1.25, 0.25, 0.5);
const BOARD_WIDTH: f32 = 1.5;

/// CPU-side scene, ready for upload.
pub struct SceneAssets {
    pub model: Model,
    pub mesh: ModelMesh,
    pub atlas: Option<AtlasPreview>,
}

pub enum ModelMesh {
    Flat(MeshData<Vertex>),
    Skinned { mesh: MeshData<TexturedVertex>, skin: RgbaImage },
}

impl ModelMesh {
    pub fn is_empty(&self) -> bool {
        match self {
            ModelMesh::Flat(m) => m.is_empty(),
            ModelMesh::Skinned { mesh, .. } => mesh.is_empty(),
        }
    }

    pub fn counts(&self) -> (usize, usize) {
        match self {
            ModelMesh::Flat(m) => (m.vertices.len(), m.indices.len()),
            ModelMesh::Skinned { mesh, .. } => (mesh.vertices.len(), mesh.indices.len()),
        }
    }
}

pub struct AtlasPreview {
    pub atlas: TextureAtlas,
    pub board: MeshData<TexturedVertex>,
}

/// Loads the model and optional atlas named by `config`. Any failure is fatal.
pub fn load(config: &ViewerConfig) -> Result<SceneAssets> {
    let loader = DirLoader::new(&config.asset_root);

    let bytes = loader.load_file(&config.model_path)?;
    let model = Model::from_json_slice(&bytes)
        .with_context(|| format!("invalid model description '{}'", config.model_path))?;
    for warning in model.validate() {
        log::warn!("{}: {warning}", config.model_path);
    }

    let mesh = match &config.skin_path {
        Some(path) => {
            let skin = loader.load_texture(path).with_context(|| format!("failed to load skin '{path}'"))?;
            let mesh = build_textured_model_mesh(&model, skin.width(), skin.height());
            ModelMesh::Skinned { mesh, skin }
        }
        None => ModelMesh::Flat(build_model_mesh(&model)),
    };
    let (vertices, indices) = mesh.counts();
    log::info!(
        "model '{}': {} bones, {} rendered cuboids, {vertices} vertices, {indices} indices",
        config.model_path,
        model.bones().len(),
        model.rendered_cuboid_count(),
    );
    anyhow::ensure!(!mesh.is_empty(), "model '{}' has no visible geometry", config.model_path);

    let atlas = match &config.atlas_meta_path {
        Some(path) => Some(load_atlas(&loader, path)?),
        None => None,
    };

    Ok(SceneAssets { model, mesh, atlas })
}

fn load_atlas(loader: &dyn ResourceLoader, path: &str) -> Result<AtlasPreview> {
    let bytes = loader.load_file(path)?;
    let meta = AtlasMeta::from_json_slice(path, &bytes)?;
    let atlas = TextureAtlas::from_meta(loader, &meta, Some(MAX_SHEET_SIZE))
        .with_context(|| format!("failed to build atlas '{path}'"))?;
    for (name, item) in atlas.items() {
        log::debug!("atlas item '{name}': {} element(s), quad {:?}", item.uvs.len(), item.quad);
    }
    let board = preview_board(atlas.sheet().width(), atlas.sheet().height());
    Ok(AtlasPreview { atlas, board })
}

/// A flat board whose south face shows the whole sheet.
///
/// With zero depth the box-UV net collapses so the south face maps exactly
/// onto `(0, 0, width, height)` in texels.
pub fn preview_board(sheet_width: u32, sheet_height: u32) -> MeshData<TexturedVertex> {
    let (w, h) = (sheet_width.max(1) as f32, sheet_height.max(1) as f32);
    let size = Vec3::new(BOARD_WIDTH, BOARD_WIDTH * h / w, 0.0);

    let mut builder = TexturedMeshBuilder::new(sheet_width, sheet_height);
    builder.add_cuboid(BOARD_ORIGIN, size, Vec2::ZERO, Vec3::new(w, h, 0.0), false);
    builder.finish()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;

    fn temp_assets(name: &str, model: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("rigview-viewer-{name}-{}", std::process::id()));
        fs::create_dir_all(root.join("models")).unwrap();
        fs::write(root.join("models/rig.json"), model).unwrap();
        root
    }

    fn config(root: PathBuf) -> ViewerConfig {
        ViewerConfig {
            asset_root: root,
            model_path: "models/rig.json".into(),
            skin_path: None,
            atlas_meta_path: None,
        }
    }

    #[test]
    fn board_south_face_spans_the_sheet() {
        let board = preview_board(256, 128);
        assert_eq!(board.vertices.len(), 24);
        // South is the first face emitted.
        let uvs: Vec<[f32; 2]> = board.vertices[..4].iter().map(|v| v.uv).collect();
        for uv in &uvs {
            assert!(uv[0] == 0.0 || uv[0] == 1.0);
            assert!(uv[1] == 0.0 || uv[1] == 1.0);
        }
        let height = board.vertices.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max) - BOARD_ORIGIN.y;
        assert!((height - BOARD_WIDTH / 2.0).abs() < 1e-6);
    }

    #[test]
    fn loads_model_without_atlas() {
        let root = temp_assets(
            "ok",
            r#"{ "bones": [
                { "name": "body", "pivot": [0, 24, 0],
                  "cubes": [ { "origin": [-4, 12, -2], "size": [8, 12, 4], "uv": [16, 16] } ] },
                { "name": "waist", "pivot": [0, 12, 0], "neverRender": true }
            ] }"#,
        );
        let scene = load(&config(root.clone())).unwrap();
        assert!(matches!(scene.mesh, ModelMesh::Flat(_)));
        assert_eq!(scene.mesh.counts(), (24, 36));
        assert_eq!(scene.model.bones().len(), 2);
        assert!(scene.atlas.is_none());
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn skin_switches_to_textured_geometry() {
        let root = temp_assets(
            "skin",
            r#"{ "bones": [
                { "name": "arm", "pivot": [0, 0, 0], "mirror": true,
                  "cubes": [ { "origin": [4, 12, -2], "size": [4, 12, 4], "uv": [40, 16] } ] }
            ] }"#,
        );
        fs::create_dir_all(root.join("skins")).unwrap();
        RgbaImage::new(64, 64).save(root.join("skins/rig.png")).unwrap();

        let mut cfg = config(root.clone());
        cfg.skin_path = Some("skins/rig".into());
        let scene = load(&cfg).unwrap();
        match &scene.mesh {
            ModelMesh::Skinned { mesh, skin } => {
                assert_eq!(skin.dimensions(), (64, 64));
                assert_eq!(mesh.indices.len(), 36);
                // Mirrored arm: the first south corner takes the right edge of its rect.
                assert_eq!(mesh.vertices[0].uv[0], 48.0 / 64.0);
            }
            ModelMesh::Flat(_) => panic!("expected skinned mesh"),
        }
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn missing_skin_is_fatal() {
        let root = temp_assets(
            "noskin",
            r#"{ "bones": [ { "name": "b", "pivot": [0, 0, 0],
                "cubes": [ { "origin": [0, 0, 0], "size": [1, 1, 1] } ] } ] }"#,
        );
        let mut cfg = config(root.clone());
        cfg.skin_path = Some("skins/absent".into());
        let err = load(&cfg).err().unwrap();
        assert!(format!("{err:#}").contains("skins/absent"));
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn invisible_model_is_rejected() {
        let root = temp_assets("empty", r#"{ "bones": [ { "name": "root", "pivot": [0, 0, 0] } ] }"#);
        assert!(load(&config(root.clone())).is_err());
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn missing_model_is_fatal() {
        let cfg = config(std::env::temp_dir().join("rigview-viewer-does-not-exist"));
        let err = load(&cfg).err().unwrap();
        assert!(format!("{err:#}").contains("models/rig.json"));
    }
}
