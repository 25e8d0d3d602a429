use bytemuck::Pod;
use rigview_assets::mesh::MeshData;

use crate::render::pipeline::{self, PipelineSpec};
use crate::render::{CameraUniform, RenderCtx};

use super::handle::{Handle, HandleTable};
use super::validate::{MipLevel, aligned_buffer_size, check_mip_chain, check_upload_range};
use super::DeviceError;

pub struct GpuBuffer {
    buffer: wgpu::Buffer,
    size: u64,
    label: String,
}

pub struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    width: u32,
    height: u32,
    mip_levels: u32,
    label: String,
}

pub struct Material {
    pipeline: wgpu::RenderPipeline,
    textures: Option<wgpu::BindGroup>,
    kind: MaterialKind,
    label: String,
}

pub type BufferHandle = Handle<GpuBuffer>;
pub type TextureHandle = Handle<GpuTexture>;
pub type MaterialHandle = Handle<Material>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    /// Position + normal vertices, flat shaded, no culling.
    Untextured,
    /// Position + normal + uv vertices sampling `texture`, back faces culled.
    Textured(TextureHandle),
}

#[derive(Debug, Clone, Copy)]
pub struct MaterialDesc<'a> {
    pub label: &'a str,
    pub kind: MaterialKind,
}

/// Vertex and index buffers of an uploaded mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuMesh {
    pub vertices: BufferHandle,
    pub indices: BufferHandle,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn with_material(self, material: MaterialHandle) -> MeshDraw {
        MeshDraw { material, mesh: self }
    }
}

/// One indexed draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshDraw {
    pub material: MaterialHandle,
    pub mesh: GpuMesh,
}

const INDEX_SIZE: u64 = std::mem::size_of::<u32>() as u64;

/// Owner of every buffer, texture and pipeline the renderer creates.
///
/// Creation and destruction are explicit and paired. Whatever is still alive
/// when this is dropped gets destroyed and reported as a leak.
pub struct GpuResources {
    buffers: HandleTable<GpuBuffer>,
    textures: HandleTable<GpuTexture>,
    materials: HandleTable<Material>,

    camera_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    camera_ubo: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
}

impl GpuResources {
    pub fn new(ctx: &RenderCtx<'_>) -> Self {
        let camera_layout = pipeline::camera_layout(ctx.device);
        let texture_layout = pipeline::texture_layout(ctx.device);

        let camera_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("rigview camera ubo"),
            size: CameraUniform::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("rigview camera bind group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_ubo.as_entire_binding(),
            }],
        });

        Self {
            buffers: HandleTable::new(),
            textures: HandleTable::new(),
            materials: HandleTable::new(),
            camera_layout,
            texture_layout,
            camera_ubo,
            camera_bind_group,
        }
    }

    // ── buffers ───────────────────────────────────────────────────────────

    /// Allocates an uninitialized buffer; `COPY_DST` is always added.
    pub fn create_buffer(
        &mut self,
        ctx: &RenderCtx<'_>,
        size: u64,
        usage: wgpu::BufferUsages,
        label: &str,
    ) -> Result<BufferHandle, DeviceError> {
        let max = ctx.device.limits().max_buffer_size;
        let size = aligned_buffer_size(label, size, max)?;
        let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Ok(self.buffers.insert(GpuBuffer { buffer, size, label: label.to_string() }))
    }

    pub fn upload(
        &self,
        ctx: &RenderCtx<'_>,
        handle: BufferHandle,
        offset: u64,
        bytes: &[u8],
    ) -> Result<(), DeviceError> {
        let buf = self.buffers.get(handle).ok_or(DeviceError::StaleHandle { kind: "buffer" })?;
        check_upload_range(buf.size, offset, bytes.len() as u64)?;
        if !bytes.is_empty() {
            ctx.queue.write_buffer(&buf.buffer, offset, bytes);
        }
        Ok(())
    }

    pub fn destroy_buffer(&mut self, handle: BufferHandle) -> Result<(), DeviceError> {
        let buf = self.buffers.remove(handle).ok_or(DeviceError::StaleHandle { kind: "buffer" })?;
        buf.buffer.destroy();
        Ok(())
    }

    pub fn buffer_size(&self, handle: BufferHandle) -> Option<u64> {
        self.buffers.get(handle).map(|b| b.size)
    }

    /// Uploads `mesh` into a fresh vertex and index buffer pair.
    pub fn upload_mesh<V: Pod>(
        &mut self,
        ctx: &RenderCtx<'_>,
        mesh: &MeshData<V>,
        label: &str,
    ) -> Result<GpuMesh, DeviceError> {
        let vertex_bytes = mesh.vertex_bytes();
        let index_bytes = mesh.index_bytes();

        let vertices = self.create_buffer(ctx, vertex_bytes.len() as u64, wgpu::BufferUsages::VERTEX, &format!("{label} vertices"))?;
        let indices = match self.create_buffer(ctx, index_bytes.len() as u64, wgpu::BufferUsages::INDEX, &format!("{label} indices")) {
            Ok(h) => h,
            Err(e) => {
                let _ = self.destroy_buffer(vertices);
                return Err(e);
            }
        };

        let mesh_handles = GpuMesh { vertices, indices, index_count: mesh.index_count() };
        let uploaded = self
            .upload(ctx, vertices, 0, vertex_bytes)
            .and_then(|()| self.upload(ctx, indices, 0, index_bytes));
        if let Err(e) = uploaded {
            self.destroy_mesh(mesh_handles)?;
            return Err(e);
        }

        log::debug!(
            "uploaded mesh '{label}': {} vertices, {} indices",
            mesh.vertices.len(),
            mesh.indices.len()
        );
        Ok(mesh_handles)
    }

    pub fn destroy_mesh(&mut self, mesh: GpuMesh) -> Result<(), DeviceError> {
        let vertices = self.destroy_buffer(mesh.vertices);
        let indices = self.destroy_buffer(mesh.indices);
        vertices.and(indices)
    }

    // ── textures ──────────────────────────────────────────────────────────

    /// Creates an sRGB RGBA8 texture from a base level and its mip chain,
    /// sampled nearest with repeat addressing.
    pub fn create_texture_rgba8(
        &mut self,
        ctx: &RenderCtx<'_>,
        label: &str,
        levels: &[MipLevel<'_>],
    ) -> Result<TextureHandle, DeviceError> {
        let max = ctx.device.limits().max_texture_dimension_2d;
        check_mip_chain(label, levels, max)?;
        let (width, height) = (levels[0].width, levels[0].height);
        let mip_levels = levels.len() as u32;

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, level) in levels.iter().enumerate() {
            ctx.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                level.pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(level.width * 4),
                    rows_per_image: Some(level.height),
                },
                wgpu::Extent3d {
                    width: level.width,
                    height: level.height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        log::info!("texture '{label}': {width}x{height}, {mip_levels} mip level(s)");
        Ok(self.textures.insert(GpuTexture {
            texture,
            view,
            sampler,
            width,
            height,
            mip_levels,
            label: label.to_string(),
        }))
    }

    /// Destroys a texture no material refers to.
    pub fn destroy_texture(&mut self, handle: TextureHandle) -> Result<(), DeviceError> {
        let tex = self.textures.get(handle).ok_or(DeviceError::StaleHandle { kind: "texture" })?;
        let in_use = self
            .materials
            .iter()
            .any(|(_, m)| m.kind == MaterialKind::Textured(handle));
        if in_use {
            return Err(DeviceError::TextureInUse { label: tex.label.clone() });
        }
        if let Some(tex) = self.textures.remove(handle) {
            tex.texture.destroy();
        }
        Ok(())
    }

    /// `(width, height, mip_levels)` of a live texture.
    pub fn texture_info(&self, handle: TextureHandle) -> Option<(u32, u32, u32)> {
        self.textures.get(handle).map(|t| (t.width, t.height, t.mip_levels))
    }

    // ── materials ─────────────────────────────────────────────────────────

    /// Builds the pipeline for a material. Call once per material, not per frame.
    pub fn create_material(
        &mut self,
        ctx: &RenderCtx<'_>,
        desc: &MaterialDesc<'_>,
    ) -> Result<MaterialHandle, DeviceError> {
        let (pipeline, textures) = match desc.kind {
            MaterialKind::Untextured => {
                let pipeline = pipeline::build_pipeline(
                    ctx,
                    PipelineSpec {
                        label: desc.label,
                        shader_source: include_str!("../render/shaders/model.wgsl"),
                        vertex: pipeline::vertex_layout(),
                        bind_group_layouts: &[&self.camera_layout],
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: None,
                    },
                );
                (pipeline, None)
            }
            MaterialKind::Textured(handle) => {
                let tex = self.textures.get(handle).ok_or(DeviceError::StaleHandle { kind: "texture" })?;
                let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(desc.label),
                    layout: &self.texture_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&tex.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&tex.sampler),
                        },
                    ],
                });
                // Box faces wind clockwise on screen under the left-handed projection.
                let pipeline = pipeline::build_pipeline(
                    ctx,
                    PipelineSpec {
                        label: desc.label,
                        shader_source: include_str!("../render/shaders/textured.wgsl"),
                        vertex: pipeline::textured_vertex_layout(),
                        bind_group_layouts: &[&self.camera_layout, &self.texture_layout],
                        front_face: wgpu::FrontFace::Cw,
                        cull_mode: Some(wgpu::Face::Back),
                    },
                );
                (pipeline, Some(bind_group))
            }
        };

        log::debug!("material '{}' ({:?})", desc.label, desc.kind);
        Ok(self.materials.insert(Material {
            pipeline,
            textures,
            kind: desc.kind,
            label: desc.label.to_string(),
        }))
    }

    pub fn destroy_material(&mut self, handle: MaterialHandle) -> Result<(), DeviceError> {
        self.materials
            .remove(handle)
            .map(drop)
            .ok_or(DeviceError::StaleHandle { kind: "material" })
    }

    // ── per frame ─────────────────────────────────────────────────────────

    pub fn write_camera(&self, ctx: &RenderCtx<'_>, view_proj: &glam::Mat4) {
        let uniform = CameraUniform::new(view_proj);
        ctx.queue.write_buffer(&self.camera_ubo, 0, bytemuck::bytes_of(&uniform));
    }

    /// Binds `draw`'s material and buffers and records one indexed draw.
    pub fn draw_mesh(&self, pass: &mut wgpu::RenderPass<'_>, draw: &MeshDraw) -> Result<(), DeviceError> {
        let material = self
            .materials
            .get(draw.material)
            .ok_or(DeviceError::StaleHandle { kind: "material" })?;
        let vertices = self
            .buffers
            .get(draw.mesh.vertices)
            .ok_or(DeviceError::StaleHandle { kind: "buffer" })?;
        let indices = self
            .buffers
            .get(draw.mesh.indices)
            .ok_or(DeviceError::StaleHandle { kind: "buffer" })?;

        let capacity = indices.size / INDEX_SIZE;
        if u64::from(draw.mesh.index_count) > capacity {
            return Err(DeviceError::IndexCountTooLarge { count: draw.mesh.index_count, capacity });
        }
        if draw.mesh.index_count == 0 {
            return Ok(());
        }

        pass.set_pipeline(&material.pipeline);
        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        if let Some(textures) = &material.textures {
            pass.set_bind_group(1, textures, &[]);
        }
        pass.set_vertex_buffer(0, vertices.buffer.slice(..));
        pass.set_index_buffer(indices.buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..draw.mesh.index_count, 0, 0..1);
        Ok(())
    }

    /// Number of live `(buffers, textures, materials)`.
    pub fn live_counts(&self) -> (usize, usize, usize) {
        (self.buffers.len(), self.textures.len(), self.materials.len())
    }
}

impl Drop for GpuResources {
    fn drop(&mut self) {
        for material in self.materials.drain() {
            log::warn!("material '{}' was not destroyed", material.label);
        }
        for tex in self.textures.drain() {
            log::warn!("texture '{}' was not destroyed", tex.label);
            tex.texture.destroy();
        }
        for buf in self.buffers.drain() {
            log::warn!("buffer '{}' ({} bytes) was not destroyed", buf.label, buf.size);
            buf.buffer.destroy();
        }
        self.camera_ubo.destroy();
    }
}
