//! Render pipelines and the bind group layout shared by all drawables.
//!
//! Pipelines are created once per surface format and reused for every object
//! of the matching kind.

pub mod basic;
pub mod entity;
pub mod instanced;
pub mod overlay;

use crate::data_structures::geometry::Topology;

#[derive(Debug)]
pub struct Pipelines {
    pub triangles: wgpu::RenderPipeline,
    pub lines: wgpu::RenderPipeline,
    pub instanced: wgpu::RenderPipeline,
    pub overlay: wgpu::RenderPipeline,
    pub entity_layout: wgpu::BindGroupLayout,
}

impl Pipelines {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        let entity_layout = entity::mk_entity_bind_group_layout(device);
        Self {
            triangles: basic::mk_basic_pipeline(
                device,
                color_format,
                &entity_layout,
                Topology::Triangles,
            ),
            lines: basic::mk_basic_pipeline(device, color_format, &entity_layout, Topology::Lines),
            instanced: instanced::mk_instanced_pipeline(device, color_format, &entity_layout),
            overlay: overlay::mk_overlay_pipeline(device, color_format),
            entity_layout,
        }
    }

    /// The single-entity pipeline for `topology`.
    pub fn basic(&self, topology: Topology) -> &wgpu::RenderPipeline {
        match topology {
            Topology::Triangles => &self.triangles,
            Topology::Lines => &self.lines,
        }
    }
}
