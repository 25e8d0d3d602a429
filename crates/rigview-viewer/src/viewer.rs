use anyhow::Context;
use rigview_engine::camera::{CameraConfig, CameraController};
use rigview_engine::core::{App, AppControl, FrameCtx, StartCtx};
use rigview_engine::input::Key;
use rigview_engine::render::RenderCtx;
use rigview_engine::resources::{
    DeviceError, GpuMesh, GpuResources, MaterialDesc, MaterialHandle, MaterialKind, MeshDraw, MipLevel,
    TextureHandle,
};

use crate::scene::{ModelMesh, SceneAssets};

/// Everything uploaded at startup. Read-only afterwards.
struct GpuScene {
    resources: GpuResources,
    meshes: Vec<GpuMesh>,
    materials: Vec<MaterialHandle>,
    textures: Vec<TextureHandle>,
    draws: Vec<MeshDraw>,
}

impl GpuScene {
    fn upload(ctx: &RenderCtx<'_>, assets: &SceneAssets) -> Result<Self, DeviceError> {
        let mut scene = GpuScene {
            resources: GpuResources::new(ctx),
            meshes: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            draws: Vec::new(),
        };

        match &assets.mesh {
            ModelMesh::Flat(mesh) => {
                let material = scene.resources.create_material(
                    ctx,
                    &MaterialDesc { label: "rigview model", kind: MaterialKind::Untextured },
                )?;
                scene.materials.push(material);
                let mesh = scene.resources.upload_mesh(ctx, mesh, "rigview model")?;
                scene.meshes.push(mesh);
                scene.draws.push(mesh.with_material(material));
            }
            ModelMesh::Skinned { mesh, skin } => {
                let level = MipLevel { width: skin.width(), height: skin.height(), pixels: skin.as_raw() };
                let texture = scene.resources.create_texture_rgba8(ctx, "rigview skin", &[level])?;
                scene.textures.push(texture);
                let material = scene.resources.create_material(
                    ctx,
                    &MaterialDesc { label: "rigview skinned model", kind: MaterialKind::Textured(texture) },
                )?;
                scene.materials.push(material);
                let mesh = scene.resources.upload_mesh(ctx, mesh, "rigview skinned model")?;
                scene.meshes.push(mesh);
                scene.draws.push(mesh.with_material(material));
            }
        }

        if let Some(preview) = &assets.atlas {
            let levels: Vec<MipLevel<'_>> = preview
                .atlas
                .mips()
                .iter()
                .map(|img| MipLevel { width: img.width(), height: img.height(), pixels: img.as_raw() })
                .collect();
            let texture = scene.resources.create_texture_rgba8(ctx, &preview.atlas.texture_name, &levels)?;
            scene.textures.push(texture);

            let material = scene.resources.create_material(
                ctx,
                &MaterialDesc { label: "rigview atlas board", kind: MaterialKind::Textured(texture) },
            )?;
            scene.materials.push(material);
            let board = scene.resources.upload_mesh(ctx, &preview.board, "rigview atlas board")?;
            scene.meshes.push(board);
            scene.draws.push(board.with_material(material));
        }

        Ok(scene)
    }

    /// Releases in dependency order: materials before the textures they bind.
    fn destroy(mut self) -> Result<(), DeviceError> {
        for material in self.materials.drain(..) {
            self.resources.destroy_material(material)?;
        }
        for texture in self.textures.drain(..) {
            self.resources.destroy_texture(texture)?;
        }
        for mesh in self.meshes.drain(..) {
            self.resources.destroy_mesh(mesh)?;
        }
        Ok(())
    }
}

/// The model viewer application.
pub struct Viewer {
    assets: SceneAssets,
    camera: CameraController,
    scene: Option<GpuScene>,
}

impl Viewer {
    pub fn new(assets: SceneAssets, camera: CameraConfig) -> Self {
        Self { assets, camera: CameraController::new(camera), scene: None }
    }
}

impl App for Viewer {
    fn on_start(&mut self, ctx: &mut StartCtx<'_>) -> anyhow::Result<()> {
        let scene = GpuScene::upload(&ctx.render, &self.assets).context("failed to upload scene")?;
        let (buffers, textures, materials) = scene.resources.live_counts();
        log::info!("scene uploaded: {buffers} buffers, {textures} textures, {materials} materials");
        for &texture in &scene.textures {
            if let Some((w, h, mips)) = scene.resources.texture_info(texture) {
                log::info!("texture {w}x{h}, {mips} mip level(s)");
            }
        }
        self.scene = Some(scene);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input.key_pressed(Key::Escape) {
            return AppControl::Exit;
        }

        let cursor = self.camera.update(ctx.input, ctx.time.dt);
        ctx.set_cursor_mode(cursor);

        let Some(scene) = &self.scene else {
            return AppControl::Continue;
        };

        let view_proj = self.camera.view_projection(ctx.aspect_ratio());
        let mut failure = None;
        let control = ctx.render(|rctx, commands| {
            scene.resources.write_camera(rctx, &view_proj);
            let mut pass = commands.main_pass();
            for draw in &scene.draws {
                if let Err(e) = scene.resources.draw_mesh(&mut pass, draw) {
                    failure = Some(e);
                    break;
                }
            }
        });

        if let Some(e) = failure {
            log::error!("draw failed: {e}");
            return AppControl::Exit;
        }
        control
    }

    fn on_exit(&mut self, _ctx: &RenderCtx<'_>) {
        if let Some(scene) = self.scene.take() {
            if let Err(e) = scene.destroy() {
                log::error!("failed to release scene: {e}");
            }
        }
    }
}
