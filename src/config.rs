//! Tunables for a scene and its input mapping.
//!
//! All values have defaults matching the stock lattice scene. Override fields
//! before handing the config to [`crate::scene::Scene::new`].

use cgmath::{Deg, Vector3};

/// Gravity and floor-bounce parameters for an instance batch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub enabled: bool,
    /// Acceleration along +Y in units/s². Negative pulls down.
    pub gravity: f32,
    /// The floor sits at `-bound_y`.
    pub bound_y: f32,
    pub damping: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            gravity: -0.0008,
            bound_y: 2.0,
            damping: 0.9,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionConfig {
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fovy: Deg(45.0),
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SceneConfig {
    /// Cells per axis of the cube lattice; the batch holds `spacing³` instances.
    pub spacing: u32,
    /// Uniform scale applied to every lattice cube.
    pub instance_shrink: f32,
    pub physics: PhysicsConfig,
    pub camera_translation: Vector3<f32>,
    pub projection: ProjectionConfig,
    pub clear_colour: wgpu::Color,
    pub overlay_points: usize,
    /// Width of the per-frame random walk applied to overlay points.
    pub overlay_jitter: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            spacing: 10,
            instance_shrink: 0.1,
            physics: PhysicsConfig::default(),
            camera_translation: Vector3::new(0.0, 0.0, 4.0),
            projection: ProjectionConfig::default(),
            clear_colour: wgpu::Color {
                r: 0.05,
                g: 0.05,
                b: 0.08,
                a: 1.0,
            },
            overlay_points: 300,
            overlay_jitter: 0.01,
        }
    }
}

/// Fixed deltas applied per key press.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputConfig {
    /// Object rotation step in radians.
    pub object_rotation: f32,
    /// Camera rotation step in degrees.
    pub camera_rotation: f32,
    pub camera_translation: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            object_rotation: 0.05,
            camera_rotation: 2.0,
            camera_translation: 0.3,
        }
    }
}
