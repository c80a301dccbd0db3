//! Gravity with an inelastic floor bounce.
//!
//! The updater keeps the previous frame timestamp itself. The first call only
//! records the time so that the wall time elapsed before the first frame never
//! turns into one huge integration step.

use cgmath::{Matrix4, Vector3};

use crate::config::PhysicsConfig;

#[derive(Clone, Debug)]
pub struct Gravity {
    config: PhysicsConfig,
    last_time: Option<f64>,
}

impl Gravity {
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            last_time: None,
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Timestamp of the previous call in seconds, `None` before the first one.
    pub fn last_time(&self) -> Option<f64> {
        self.last_time
    }

    /// Records `time_millis` and returns the step in seconds since the previous call.
    pub fn step(&mut self, time_millis: f64) -> Option<f32> {
        let now = time_millis / 1000.0;
        let previous = self.last_time.replace(now);
        match previous {
            None => {
                log::debug!("physics clock started at {:.3}s", now);
                None
            }
            Some(previous) => Some((now - previous) as f32),
        }
    }

    /// Advances every instance by `dt` seconds.
    ///
    /// `matrices[i]` and `velocities[i]` describe the same instance. The
    /// translation is added in world space, the floor sits at `-bound_y`.
    ///
    /// # Panics
    ///
    /// If the two slices differ in length.
    pub fn integrate(
        &self,
        matrices: &mut [Matrix4<f32>],
        velocities: &mut [Vector3<f32>],
        dt: f32,
    ) {
        assert_eq!(
            matrices.len(),
            velocities.len(),
            "every instance needs exactly one velocity"
        );
        if dt <= 0.0 {
            return;
        }
        let PhysicsConfig {
            gravity,
            bound_y,
            damping,
            ..
        } = self.config;

        for (matrix, velocity) in matrices.iter_mut().zip(velocities.iter_mut()) {
            velocity.y += gravity * dt;

            matrix.w.x += velocity.x * dt;
            matrix.w.y += velocity.y * dt;
            matrix.w.z += velocity.z * dt;

            if matrix.w.y < -bound_y {
                matrix.w.y = -bound_y;
                if velocity.y < 0.0 {
                    velocity.y *= -damping;
                }
            }
        }
    }

    /// [`Gravity::step`] followed by [`Gravity::integrate`]. Returns whether anything moved.
    pub fn apply(
        &mut self,
        time_millis: f64,
        matrices: &mut [Matrix4<f32>],
        velocities: &mut [Vector3<f32>],
    ) -> bool {
        match self.step(time_millis) {
            Some(dt) if dt > 0.0 => {
                self.integrate(matrices, velocities, dt);
                true
            }
            _ => false,
        }
    }
}
