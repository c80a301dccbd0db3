use crate::data_structures::{
    geometry::{ColorVertex, Vertex},
    instance::{ColorInstance, MatrixInstance},
    texture::Texture,
};

use super::basic::mk_render_pipeline;

/// Pipeline for instance batches.
///
/// Slot 0 carries the shared geometry, slot 1 the packed instance matrices and
/// slot 2 the packed instance colours.
pub fn mk_instanced_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    entity_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Instanced Pipeline Layout"),
        bind_group_layouts: &[Some(entity_bind_group_layout)],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Instanced Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("instanced.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        color_format,
        Some(wgpu::BlendState::REPLACE),
        Some(Texture::DEPTH_FORMAT),
        &[ColorVertex::desc(), MatrixInstance::desc(), ColorInstance::desc()],
        wgpu::PrimitiveTopology::TriangleList,
        Some(wgpu::Face::Back),
        shader,
    )
}
