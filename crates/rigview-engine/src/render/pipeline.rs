//! Shared pipeline state used by every material.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use rigview_assets::mesh::{TexturedVertex, Vertex};

use super::RenderCtx;

// ── blend ─────────────────────────────────────────────────────────────────

/// Straight-alpha "over": `src * srcA + dst * (1 - srcA)`.
pub(crate) fn over_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            dst_factor: wgpu::BlendFactor::Zero,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

pub(crate) fn depth_state(format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

// ── camera uniform ────────────────────────────────────────────────────────

/// Column-major view-projection matrix as laid out in the uniform buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub const SIZE: u64 = std::mem::size_of::<CameraUniform>() as u64;

    pub fn new(view_proj: &glam::Mat4) -> Self {
        Self { view_proj: view_proj.to_cols_array_2d() }
    }
}

fn camera_binding_size() -> Option<NonZeroU64> {
    NonZeroU64::new(CameraUniform::SIZE)
}

pub(crate) fn camera_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("rigview camera bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: camera_binding_size(),
            },
            count: None,
        }],
    })
}

pub(crate) fn texture_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("rigview texture bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

// ── vertex layouts ────────────────────────────────────────────────────────

const VERTEX_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x3, // position
    1 => Float32x3  // normal
];

const TEXTURED_VERTEX_ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x3, // position
    1 => Float32x3, // normal
    2 => Float32x2  // uv
];

pub(crate) fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}

pub(crate) fn textured_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<TexturedVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &TEXTURED_VERTEX_ATTRS,
    }
}

// ── pipeline ──────────────────────────────────────────────────────────────

pub(crate) struct PipelineSpec<'a> {
    pub label: &'a str,
    pub shader_source: &'a str,
    pub vertex: wgpu::VertexBufferLayout<'static>,
    pub bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub front_face: wgpu::FrontFace,
    pub cull_mode: Option<wgpu::Face>,
}

/// Builds a render pipeline against the surface and depth formats in `ctx`.
///
/// The shader module only lives for the duration of this call.
pub(crate) fn build_pipeline(ctx: &RenderCtx<'_>, spec: PipelineSpec<'_>) -> wgpu::RenderPipeline {
    let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(spec.label),
        source: wgpu::ShaderSource::Wgsl(spec.shader_source.into()),
    });

    let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(spec.label),
        bind_group_layouts: spec.bind_group_layouts,
        immediate_size: 0,
    });

    ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(&layout),

        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[spec.vertex],
        },

        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.surface_format,
                blend: Some(over_blend()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: spec.front_face,
            cull_mode: spec.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: Some(depth_state(ctx.depth_format)),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_match_vertex_structs() {
        let plain = vertex_layout();
        assert_eq!(plain.array_stride, 24);
        assert_eq!(plain.attributes[1].offset, 12);

        let textured = textured_vertex_layout();
        assert_eq!(textured.array_stride, 32);
        assert_eq!(textured.attributes[2].offset, 24);
        assert_eq!(textured.attributes[2].format, wgpu::VertexFormat::Float32x2);
    }

    #[test]
    fn camera_uniform_is_one_matrix() {
        assert_eq!(CameraUniform::SIZE, 64);
        let m = glam::Mat4::from_translation(glam::vec3(1.0, 2.0, 3.0));
        let u = CameraUniform::new(&m);
        assert_eq!(u.view_proj[3], [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn blend_is_straight_alpha_over() {
        let b = over_blend();
        assert_eq!(b.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(b.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
        assert_eq!(depth_state(wgpu::TextureFormat::Depth32Float).depth_compare, wgpu::CompareFunction::Less);
    }
}
