//! Single posed drawables: axes, plain shapes and loaded meshes.
//!
//! An [`Entity`] owns its vertex buffer, one transform uniform and one mesh
//! type uniform. None of these are ever shared with another drawable; only the
//! camera buffer bound at slot 0 of its bind group is common to the scene.

use cgmath::{Matrix4, SquareMatrix, Vector3, Zero};

use crate::{
    data_structures::geometry::{Geometry, MeshType},
    error::Result,
    pipelines::entity::mk_entity_bind_group,
    resources::buffer::{
        MATRIX_BYTES, ensure_size, mk_id_buffer, mk_uniform_buffer, mk_vertex_buffer,
    },
    transform::{compose, to_floats},
};

/// CPU-side transform of a drawable.
///
/// `set_eulers` replaces the matrix with a fresh rotation about the pivot,
/// `set_position` and `set_scale` compound onto whatever is there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityTransform {
    pivot: Vector3<f32>,
    matrix: Matrix4<f32>,
}

impl EntityTransform {
    pub fn new(pivot: Vector3<f32>) -> Self {
        Self {
            pivot,
            matrix: Matrix4::identity(),
        }
    }

    pub fn pivot(&self) -> Vector3<f32> {
        self.pivot
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        self.matrix
    }

    pub fn set_eulers(&mut self, pitch: f32, yaw: f32, roll: f32) {
        self.matrix = compose(self.pivot, pitch, yaw, roll);
    }

    /// Post-multiplies a translation, i.e. moves along the current local axes.
    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.matrix = self.matrix * Matrix4::from_translation(position);
    }

    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.matrix = self.matrix * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z);
    }
}

impl Default for EntityTransform {
    fn default() -> Self {
        Self::new(Vector3::zero())
    }
}

/// A drawable with its own geometry, transform and GPU resources.
#[derive(Debug)]
pub struct Entity {
    pub geometry: Geometry,
    pub mesh_type: MeshType,
    pub transform: EntityTransform,
    vertex_buffer: Option<wgpu::Buffer>,
    transform_buffer: wgpu::Buffer,
    #[allow(dead_code)]
    mesh_type_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl Entity {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
        geometry: Geometry,
        mesh_type: MeshType,
    ) -> Result<Self> {
        Self::with_pivot(device, layout, camera_buffer, geometry, mesh_type, Vector3::zero())
    }

    /// Like [`Entity::new`] but rotations happen about `pivot` instead of the origin.
    pub fn with_pivot(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
        geometry: Geometry,
        mesh_type: MeshType,
        pivot: Vector3<f32>,
    ) -> Result<Self> {
        let label = geometry.label.clone();
        let vertex_buffer = if geometry.is_empty() {
            None
        } else {
            let buffer = mk_vertex_buffer(
                device,
                &format!("{} Vertex Buffer", label),
                geometry.vertices(),
            );
            ensure_size(&label, &buffer, geometry.byte_len())?;
            Some(buffer)
        };

        let transform_buffer =
            mk_uniform_buffer(device, &format!("{} Transform Buffer", label), MATRIX_BYTES);
        ensure_size(&label, &transform_buffer, MATRIX_BYTES)?;
        let mesh_type_buffer =
            mk_id_buffer(device, &format!("{} Mesh Type Buffer", label), mesh_type.id());

        let bind_group = mk_entity_bind_group(
            device,
            &format!("{} Bind Group", label),
            layout,
            camera_buffer,
            &transform_buffer,
            &mesh_type_buffer,
        );

        log::debug!(
            "created entity `{}` ({:?}, {} vertices)",
            label,
            mesh_type,
            geometry.vertex_count()
        );

        Ok(Self {
            geometry,
            mesh_type,
            transform: EntityTransform::new(pivot),
            vertex_buffer,
            transform_buffer,
            mesh_type_buffer,
            bind_group,
        })
    }

    pub fn label(&self) -> &str {
        &self.geometry.label
    }

    /// The point rotations are computed about.
    pub fn center(&self) -> Vector3<f32> {
        self.transform.pivot()
    }

    pub fn set_eulers(&mut self, pitch: f32, yaw: f32, roll: f32) {
        self.transform.set_eulers(pitch, yaw, roll);
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.transform.set_position(position);
    }

    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.transform.set_scale(scale);
    }

    pub fn is_drawable(&self) -> bool {
        self.vertex_buffer.is_some()
    }

    pub fn transform_buffer(&self) -> &wgpu::Buffer {
        &self.transform_buffer
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Enqueue the current transform. Takes effect for every draw submitted afterwards.
    pub fn write_to_buffer(&self, queue: &wgpu::Queue) {
        let floats = to_floats(&self.transform.matrix());
        queue.write_buffer(&self.transform_buffer, 0, bytemuck::cast_slice(&floats));
    }

    /// Bind and draw. Entities without geometry issue nothing.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        let Some(vertex_buffer) = &self.vertex_buffer else {
            log::trace!("skipping `{}`: no geometry", self.label());
            return;
        };
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        pass.draw(0..self.geometry.vertex_count(), 0..1);
    }

    /// Draws `instances` copies, with per-instance data bound from slot 1 onwards.
    ///
    /// Nothing is issued for zero instances; their buffers are empty and cannot be bound.
    pub fn draw_instanced(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        instance_buffers: &[&wgpu::Buffer],
        instances: u32,
    ) {
        let Some(vertex_buffer) = &self.vertex_buffer else {
            log::trace!("skipping `{}`: no geometry", self.label());
            return;
        };
        if instances == 0 {
            log::trace!("skipping `{}`: no instances", self.label());
            return;
        }
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        for (slot, buffer) in instance_buffers.iter().enumerate() {
            pass.set_vertex_buffer(slot as u32 + 1, buffer.slice(..));
        }
        pass.draw(0..self.geometry.vertex_count(), 0..instances);
    }

    /// Upload the transform, then draw.
    pub fn render(&self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>) {
        self.write_to_buffer(queue);
        self.draw(pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::tests::assert_mat_close;
    use cgmath::{InnerSpace, Vector4};

    #[test]
    fn default_pivot_is_origin() {
        let transform = EntityTransform::default();
        assert_eq!(transform.pivot(), Vector3::zero());
        assert_mat_close(transform.matrix(), Matrix4::identity());
    }

    #[test]
    fn set_eulers_replaces_previous_matrix() {
        let mut transform = EntityTransform::default();
        transform.set_position(Vector3::new(1.0, 2.0, 3.0));
        transform.set_eulers(0.0, 0.0, 0.0);
        assert_mat_close(transform.matrix(), Matrix4::identity());
    }

    #[test]
    fn set_eulers_rotates_about_own_pivot() {
        let pivot = Vector3::new(0.0, 0.0, -4.0);
        let mut transform = EntityTransform::new(pivot);
        transform.set_eulers(0.3, 0.9, 1.7);
        let moved = (transform.matrix() * pivot.extend(1.0)).truncate() - pivot;
        assert!(moved.magnitude() < 1e-4);
    }

    #[test]
    fn set_position_compounds() {
        let mut transform = EntityTransform::default();
        transform.set_position(Vector3::new(1.0, 0.0, 0.0));
        transform.set_position(Vector3::new(1.0, 0.0, 0.0));
        assert_mat_close(
            transform.matrix(),
            Matrix4::from_translation(Vector3::new(2.0, 0.0, 0.0)),
        );
    }

    #[test]
    fn set_scale_compounds_and_applies_in_local_space() {
        let mut transform = EntityTransform::default();
        transform.set_scale(Vector3::new(2.0, 2.0, 2.0));
        transform.set_scale(Vector3::new(2.0, 2.0, 2.0));
        transform.set_position(Vector3::new(1.0, 0.0, 0.0));
        // the translation is scaled by the accumulated factor of 4
        let origin = transform.matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((origin.x - 4.0).abs() < 1e-6);
    }
}
