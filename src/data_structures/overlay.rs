//! 2D density point overlay drawn on top of the scene.
//!
//! Points are given in screen pixels and mapped to normalized device
//! coordinates once. Each frame they take a small random step and the whole
//! array is rewritten into the layer's own instance buffer.

use rand::{RngExt, SeedableRng, rngs::StdRng};

use crate::{
    data_structures::geometry::Vertex,
    error::Result,
    resources::buffer::{ensure_size, mk_instance_buffer},
};

/// Floats per overlay point (`vec4`).
pub const POINT_FLOATS: usize = 4;
/// Each point is drawn as a quad of two triangles.
pub const QUAD_VERTICES: u32 = 6;

/// Maps a pixel position to NDC. `z` and `w` are zeroed.
pub fn to_ndc(screen_size: [f32; 2], point: [f32; 4]) -> [f32; 4] {
    let offset_x = point[0] - screen_size[0] / 2.0;
    let offset_y = point[1] - screen_size[1] / 2.0;
    [
        (offset_x / screen_size[0]) * 2.0,
        (offset_y / screen_size[1]) * 2.0,
        0.0,
        0.0,
    ]
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointInstance {
    position: [f32; 4],
}

impl Vertex for PointInstance {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x4,
            }],
        }
    }
}

/// CPU state of the overlay.
#[derive(Debug)]
pub struct DensityPoints {
    points: Vec<[f32; 4]>,
    flat: Vec<f32>,
    jitter: f32,
    rng: StdRng,
}

impl DensityPoints {
    pub fn new(screen_points: &[[f32; 4]], screen_size: [f32; 2], jitter: f32, seed: u64) -> Self {
        let points: Vec<[f32; 4]> = screen_points
            .iter()
            .map(|p| to_ndc(screen_size, *p))
            .collect();
        let flat = points.iter().flatten().copied().collect();
        Self {
            points,
            flat,
            jitter,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// `count` points spread uniformly over the screen.
    pub fn random(count: usize, screen_size: [f32; 2], jitter: f32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let screen_points: Vec<[f32; 4]> = (0..count)
            .map(|_| {
                [
                    rng.random_range(0.0..screen_size[0].max(1.0)),
                    rng.random_range(0.0..screen_size[1].max(1.0)),
                    0.0,
                    0.0,
                ]
            })
            .collect();
        Self::new(&screen_points, screen_size, jitter, seed.wrapping_add(1))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[[f32; 4]] {
        &self.points
    }

    pub fn flat(&self) -> &[f32] {
        &self.flat
    }

    /// Moves every point's x and y by an offset in `[-jitter/2, jitter/2)`
    /// and refreshes the flat array in the same pass.
    pub fn jitter_step(&mut self) {
        if !self.jitter.is_finite() || self.jitter <= 0.0 {
            return;
        }
        let half = self.jitter / 2.0;
        for (point, chunk) in self
            .points
            .iter_mut()
            .zip(self.flat.chunks_exact_mut(POINT_FLOATS))
        {
            point[0] += self.rng.random_range(-half..half);
            point[1] += self.rng.random_range(-half..half);
            chunk.copy_from_slice(point);
        }
    }
}

/// The overlay with its GPU buffer.
#[derive(Debug)]
pub struct DensityLayer {
    label: String,
    pub points: DensityPoints,
    buffer: wgpu::Buffer,
}

impl DensityLayer {
    pub fn new(device: &wgpu::Device, label: &str, points: DensityPoints) -> Result<Self> {
        let buffer = mk_instance_buffer(device, &format!("{} Points Buffer", label), points.flat());
        ensure_size(
            label,
            &buffer,
            (points.len() * POINT_FLOATS * std::mem::size_of::<f32>()) as u64,
        )?;
        log::info!("overlay `{}`: {} points, {} bytes", label, points.len(), buffer.size());
        Ok(Self {
            label: label.to_string(),
            points,
            buffer,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn write_to_buffer(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(self.points.flat()));
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.points.is_empty() {
            return;
        }
        pass.set_vertex_buffer(0, self.buffer.slice(..));
        pass.draw(0..QUAD_VERTICES, 0..self.points.len() as u32);
    }

    /// Jitter, upload, then draw.
    pub fn render(&mut self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>) {
        self.points.jitter_step();
        self.write_to_buffer(queue);
        self.draw(pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_center_maps_to_origin() {
        assert_eq!(to_ndc([800.0, 600.0], [400.0, 300.0, 7.0, 7.0]), [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn screen_corners_map_to_unit_square() {
        assert_eq!(to_ndc([800.0, 600.0], [0.0, 0.0, 0.0, 0.0]), [-1.0, -1.0, 0.0, 0.0]);
        assert_eq!(to_ndc([800.0, 600.0], [800.0, 600.0, 0.0, 0.0]), [1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn flat_array_mirrors_points() {
        let points = DensityPoints::random(300, [800.0, 600.0], 0.01, 7);
        assert_eq!(points.len(), 300);
        assert_eq!(points.flat().len(), 300 * POINT_FLOATS);
        assert!(points.points().iter().all(|p| (-1.0..=1.0).contains(&p[0])));
    }

    #[test]
    fn jitter_stays_within_half_width() {
        let mut points = DensityPoints::new(&[[400.0, 300.0, 0.0, 0.0]], [800.0, 600.0], 0.01, 1);
        points.jitter_step();
        let [x, y, z, w] = points.points()[0];
        assert!(x.abs() <= 0.005 && y.abs() <= 0.005);
        assert_eq!((z, w), (0.0, 0.0));
        assert_eq!(points.flat(), &[x, y, z, w]);
    }

    #[test]
    fn non_finite_jitter_keeps_points_still() {
        for jitter in [f32::NAN, f32::INFINITY] {
            let mut points = DensityPoints::random(10, [100.0, 100.0], jitter, 3);
            let before = points.flat().to_vec();
            points.jitter_step();
            assert_eq!(points.flat(), before.as_slice());
        }
    }

    #[test]
    fn zero_jitter_keeps_points_still() {
        let mut points = DensityPoints::random(10, [100.0, 100.0], 0.0, 3);
        let before = points.flat().to_vec();
        points.jitter_step();
        assert_eq!(points.flat(), before.as_slice());
    }
}
