//! Pose composition for drawables.
//!
//! Every drawable in a scene carries an independent pose: pitch/yaw/roll
//! angles (radians) and a translation. [`compose`] turns the angles into a
//! rotation about an arbitrary pivot so that objects spin around their own
//! center instead of the world origin.
//!
//! The whole crate uses cgmath's convention (column-major storage, column
//! vectors, `M * v`), which is also the layout WGSL expects for `mat4x4<f32>`.
//! Matrices therefore go to the GPU untransposed.

use cgmath::{Matrix4, Rad, Vector3, Zero};

/// Independent Euler angles plus a translation.
///
/// Angles are never wrapped: repeated increments keep accumulating.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
    pub translation: Vector3<f32>,
}

impl Pose {
    pub fn new() -> Self {
        Self {
            pitch: 0.0,
            yaw: 0.0,
            roll: 0.0,
            translation: Vector3::zero(),
        }
    }

    pub fn set_eulers(&mut self, pitch: f32, yaw: f32, roll: f32) {
        self.pitch = pitch;
        self.yaw = yaw;
        self.roll = roll;
    }

    /// Rotation about `pivot` followed by this pose's translation.
    pub fn to_matrix(&self, pivot: Vector3<f32>) -> Matrix4<f32> {
        compose_with_translation(pivot, self.pitch, self.yaw, self.roll, self.translation)
    }

    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite()
            && self.yaw.is_finite()
            && self.roll.is_finite()
            && self.translation.x.is_finite()
            && self.translation.y.is_finite()
            && self.translation.z.is_finite()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new()
    }
}

/// Rotation only: yaw (Y) is applied to a point first, then pitch (X), then roll (Z).
pub fn euler_rotation(pitch: f32, yaw: f32, roll: f32) -> Matrix4<f32> {
    Matrix4::from_angle_z(Rad(roll))
        * Matrix4::from_angle_x(Rad(pitch))
        * Matrix4::from_angle_y(Rad(yaw))
}

/// Builds the transform rotating about `pivot`.
///
/// Applied to a point, the point is first moved so that `pivot` sits at the
/// origin, rotated by yaw, pitch and roll (in that order) and moved back.
/// `pivot` itself is a fixed point of the result.
pub fn compose(pivot: Vector3<f32>, pitch: f32, yaw: f32, roll: f32) -> Matrix4<f32> {
    let back_from_origin = Matrix4::from_translation(-pivot);
    let to_origin = Matrix4::from_translation(pivot);

    let yaw_mat = Matrix4::from_angle_y(Rad(yaw));
    let pitch_mat = Matrix4::from_angle_x(Rad(pitch));
    let roll_mat = Matrix4::from_angle_z(Rad(roll));

    to_origin * roll_mat * pitch_mat * (yaw_mat * back_from_origin)
}

/// [`compose`] followed by a world-space translation.
pub fn compose_with_translation(
    pivot: Vector3<f32>,
    pitch: f32,
    yaw: f32,
    roll: f32,
    translation: Vector3<f32>,
) -> Matrix4<f32> {
    Matrix4::from_translation(translation) * compose(pivot, pitch, yaw, roll)
}

/// The 16 floats of `m` in GPU (column-major) order.
pub fn to_floats(m: &Matrix4<f32>) -> [f32; 16] {
    let columns: [[f32; 4]; 4] = (*m).into();
    bytemuck::cast(columns)
}
