//! Camera rig, projection and the shared camera uniform.
//!
//! The camera does not reuse the pivot logic of [`crate::transform::compose`]:
//! it always rotates about its own origin. Its view matrix is rebuilt from the
//! pose every frame while the projection is computed once at construction.

use cgmath::{Deg, Matrix4, Rad, SquareMatrix, Vector3};
use wgpu::util::DeviceExt;

use crate::{config::ProjectionConfig, transform::euler_rotation};

/// cgmath produces OpenGL clip space (z in -1..1), wgpu expects z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Camera pose. Angles are in degrees, the unit the camera input deltas use.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraRig {
    pub pitch: Deg<f32>,
    pub yaw: Deg<f32>,
    pub roll: Deg<f32>,
    pub translation: Vector3<f32>,
}

impl CameraRig {
    pub fn new(translation: Vector3<f32>) -> Self {
        Self {
            pitch: Deg(0.0),
            yaw: Deg(0.0),
            roll: Deg(0.0),
            translation,
        }
    }

    pub fn set_eulers(&mut self, pitch: f32, yaw: f32, roll: f32) {
        self.pitch = Deg(pitch);
        self.yaw = Deg(yaw);
        self.roll = Deg(roll);
    }

    pub fn set_translation(&mut self, translation: Vector3<f32>) {
        self.translation = translation;
    }

    /// World to camera space: move the camera to the origin, then rotate about it.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let Rad(pitch) = self.pitch.into();
        let Rad(yaw) = self.yaw.into();
        let Rad(roll) = self.roll.into();
        euler_rotation(pitch, yaw, roll) * Matrix4::from_translation(-self.translation)
    }
}

/// Fixed perspective projection. Resizing the surface does not recompute it.
#[derive(Clone, Copy, Debug)]
pub struct Projection {
    matrix: Matrix4<f32>,
}

impl Projection {
    pub fn new(width: u32, height: u32, config: &ProjectionConfig) -> Self {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let matrix = OPENGL_TO_WGPU_MATRIX
            * cgmath::perspective(config.fovy, aspect, config.znear, config.zfar);
        Self { matrix }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        self.matrix
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view: Matrix4::identity().into(),
            projection: Matrix4::identity().into(),
        }
    }

    pub fn update(&mut self, rig: &CameraRig, projection: &Projection) {
        self.view = rig.view_matrix().into();
        self.projection = projection.matrix().into();
    }

    pub fn view(&self) -> Matrix4<f32> {
        self.view.into()
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything needed to keep the shared camera buffer in sync with the rig.
///
/// The buffer is written once per frame by the scene and read by every
/// drawable's bind group.
#[derive(Debug)]
pub struct CameraResources {
    pub rig: CameraRig,
    pub projection: Projection,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, rig: CameraRig, projection: Projection) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update(&rig, &projection);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            rig,
            projection,
            uniform,
            buffer,
        }
    }

    /// Recompute the view from the current rig and enqueue the upload.
    pub fn write_to_buffer(&mut self, queue: &wgpu::Queue) {
        self.uniform.update(&self.rig, &self.projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::tests::assert_mat_close;
    use cgmath::{InnerSpace, Vector4};

    #[test]
    fn view_moves_camera_to_origin() {
        let rig = CameraRig::new(Vector3::new(0.0, 0.0, 4.0));
        let eye = rig.view_matrix() * Vector4::new(0.0, 0.0, 4.0, 1.0);
        assert!(eye.truncate().magnitude_squared() < 1e-10);
    }

    #[test]
    fn camera_rotates_about_its_own_origin() {
        let mut rig = CameraRig::new(Vector3::new(1.0, 2.0, 3.0));
        rig.set_eulers(30.0, 45.0, -10.0);
        // the camera position still maps to the origin of view space
        let eye = rig.view_matrix() * Vector4::new(1.0, 2.0, 3.0, 1.0);
        assert!(eye.truncate().magnitude_squared() < 1e-10);
    }

    #[test]
    fn view_is_rotation_then_translation() {
        let mut rig = CameraRig::new(Vector3::new(0.3, -0.6, 4.0));
        rig.set_eulers(2.0, 4.0, 6.0);
        let expected = euler_rotation(
            Rad::from(Deg(2.0f32)).0,
            Rad::from(Deg(4.0f32)).0,
            Rad::from(Deg(6.0f32)).0,
        ) * Matrix4::from_translation(Vector3::new(-0.3, 0.6, -4.0));
        assert_mat_close(rig.view_matrix(), expected);
    }

    #[test]
    fn projection_maps_near_plane_to_zero_depth() {
        let config = ProjectionConfig::default();
        let projection = Projection::new(800, 600, &config);
        let clip = projection.matrix() * Vector4::new(0.0, 0.0, -config.znear, 1.0);
        assert!((clip.z / clip.w).abs() < 1e-4);
    }

    #[test]
    fn uniform_follows_rig() {
        let mut rig = CameraRig::new(Vector3::new(0.0, 0.0, 4.0));
        let projection = Projection::new(640, 480, &ProjectionConfig::default());
        let mut uniform = CameraUniform::new();
        rig.set_translation(Vector3::new(1.0, 0.0, 0.0));
        uniform.update(&rig, &projection);
        assert_mat_close(uniform.view(), rig.view_matrix());
    }
}
