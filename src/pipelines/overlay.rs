use crate::data_structures::{geometry::Vertex, overlay::PointInstance, texture::Texture};

use super::basic::mk_render_pipeline;

/// Pipeline for the point overlay. It binds no uniforms: points are already in NDC.
pub fn mk_overlay_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Overlay Pipeline Layout"),
        bind_group_layouts: &[],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Overlay Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("overlay.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        color_format,
        Some(wgpu::BlendState::ALPHA_BLENDING),
        Some(Texture::DEPTH_FORMAT),
        &[PointInstance::desc()],
        wgpu::PrimitiveTopology::TriangleList,
        None,
        shader,
    )
}
