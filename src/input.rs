//! Keyboard to pose-delta mapping.
//!
//! Input keeps the accumulated object and camera poses. Each handled key adds
//! a fixed delta to one axis; the scene then receives the full accumulated
//! pose, never the delta alone.

use cgmath::Vector3;
use winit::keyboard::KeyCode;

use crate::{config::InputConfig, scene::Scene, transform::Pose};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    ObjectPitch,
    ObjectYaw,
    ObjectRoll,
    CameraPitch,
    CameraYaw,
    CameraRoll,
    CameraX,
    CameraY,
    CameraZ,
}

#[derive(Clone, Debug)]
pub struct InputState {
    config: InputConfig,
    /// Radians.
    pub object: Pose,
    /// Degrees for the angles.
    pub camera: Pose,
}

impl InputState {
    pub fn new(config: InputConfig, camera_translation: Vector3<f32>) -> Self {
        let mut camera = Pose::new();
        camera.translation = camera_translation;
        Self {
            config,
            object: Pose::new(),
            camera,
        }
    }

    /// The axis and signed delta bound to `key`.
    pub fn delta_for_key(&self, key: KeyCode) -> Option<(Axis, f32)> {
        let object = self.config.object_rotation;
        let rotation = self.config.camera_rotation;
        let step = self.config.camera_translation;
        let delta = match key {
            KeyCode::KeyX => (Axis::ObjectPitch, object),
            KeyCode::KeyY => (Axis::ObjectYaw, object),
            KeyCode::KeyZ => (Axis::ObjectRoll, object),
            KeyCode::KeyI => (Axis::CameraPitch, rotation),
            KeyCode::KeyO => (Axis::CameraYaw, rotation),
            KeyCode::KeyP => (Axis::CameraRoll, rotation),
            KeyCode::KeyQ => (Axis::CameraY, -step),
            KeyCode::KeyE => (Axis::CameraY, step),
            KeyCode::KeyA => (Axis::CameraX, -step),
            KeyCode::KeyD => (Axis::CameraX, step),
            KeyCode::KeyW => (Axis::CameraZ, -step),
            KeyCode::KeyS => (Axis::CameraZ, step),
            _ => return None,
        };
        Some(delta)
    }

    /// Adds `amount` to `axis`. A delta that would make the pose non-finite is dropped.
    pub fn apply_delta(&mut self, axis: Axis, amount: f32) -> bool {
        let mut object = self.object;
        let mut camera = self.camera;
        match axis {
            Axis::ObjectPitch => object.pitch += amount,
            Axis::ObjectYaw => object.yaw += amount,
            Axis::ObjectRoll => object.roll += amount,
            Axis::CameraPitch => camera.pitch += amount,
            Axis::CameraYaw => camera.yaw += amount,
            Axis::CameraRoll => camera.roll += amount,
            Axis::CameraX => camera.translation.x += amount,
            Axis::CameraY => camera.translation.y += amount,
            Axis::CameraZ => camera.translation.z += amount,
        }
        if !object.is_finite() || !camera.is_finite() {
            log::warn!("ignoring {} on {:?}: pose would become non-finite", amount, axis);
            return false;
        }
        self.object = object;
        self.camera = camera;
        true
    }

    /// Returns whether the key changed any pose.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match self.delta_for_key(key) {
            Some((axis, amount)) => self.apply_delta(axis, amount),
            None => false,
        }
    }

    /// Pushes the accumulated poses into the scene.
    pub fn apply_to(&self, scene: &mut Scene) {
        scene.set_object_eulers(self.object.pitch, self.object.yaw, self.object.roll);
        scene.set_camera_eulers(self.camera.pitch, self.camera.yaw, self.camera.roll);
        scene.set_camera_translation(self.camera.translation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{compose, tests::assert_mat_close};
    use cgmath::Zero;

    fn state() -> InputState {
        InputState::new(InputConfig::default(), Vector3::new(0.0, 0.0, 4.0))
    }

    #[test]
    fn twenty_pitch_presses_equal_pitch_one() {
        let mut input = state();
        for _ in 0..20 {
            assert!(input.handle_key(KeyCode::KeyX));
        }
        assert_mat_close(
            input.object.to_matrix(Vector3::zero()),
            compose(Vector3::zero(), 1.0, 0.0, 0.0),
        );
    }

    #[test]
    fn camera_keys_move_in_opposite_pairs() {
        let mut input = state();
        input.handle_key(KeyCode::KeyW);
        assert!((input.camera.translation.z - 3.7).abs() < 1e-6);
        input.handle_key(KeyCode::KeyS);
        assert!((input.camera.translation.z - 4.0).abs() < 1e-6);
        input.handle_key(KeyCode::KeyQ);
        input.handle_key(KeyCode::KeyA);
        assert!((input.camera.translation.y + 0.3).abs() < 1e-6);
        assert!((input.camera.translation.x + 0.3).abs() < 1e-6);
    }

    #[test]
    fn camera_rotation_uses_degree_steps() {
        let mut input = state();
        input.handle_key(KeyCode::KeyO);
        input.handle_key(KeyCode::KeyO);
        assert_eq!(input.camera.yaw, 4.0);
        assert_eq!(input.object.yaw, 0.0);
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut input = state();
        assert!(!input.handle_key(KeyCode::KeyM));
        assert_eq!(input.object, Pose::new());
    }

    #[test]
    fn non_finite_deltas_are_rejected() {
        let mut input = state();
        assert!(!input.apply_delta(Axis::ObjectRoll, f32::NAN));
        assert!(!input.apply_delta(Axis::CameraX, f32::INFINITY));
        assert!(input.object.is_finite() && input.camera.is_finite());

        input.apply_delta(Axis::CameraPitch, f32::MAX);
        assert!(!input.apply_delta(Axis::CameraPitch, f32::MAX));
        assert_eq!(input.camera.pitch, f32::MAX);
    }
}
