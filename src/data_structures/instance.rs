//! Instanced cube lattice.
//!
//! A batch of `spacing³` identical cubes, each with its own transform and
//! RGBA colour, drawn with a single instanced call. The CPU keeps one matrix,
//! one colour and one velocity per instance; index `i` refers to the same
//! instance in all three arrays for the lifetime of the batch. Matrices and
//! colours are packed into two flat `f32` arrays which are copied verbatim
//! into two vertex buffers of exactly the same byte size.

use cgmath::{InnerSpace, Matrix4, Vector3, Zero};

use crate::{
    config::{PhysicsConfig, SceneConfig},
    data_structures::{
        entity::Entity,
        geometry::{Geometry, MeshType, Vertex},
        physics::Gravity,
    },
    error::{Result, SceneError},
    resources::buffer::{ensure_size, mk_instance_buffer},
    transform::to_floats,
};

/// Floats per packed instance matrix.
pub const MATRIX_FLOATS: usize = 16;
/// Floats per packed instance colour.
pub const COLOR_FLOATS: usize = 4;

/// Assigns a colour to the instance sitting at a (centered) grid position.
pub type ColourFn = fn(Vector3<f32>) -> [f32; 4];

/// Gaussian falloff from the lattice center, 1 at the center.
pub fn density(position: Vector3<f32>, radius: f32) -> f32 {
    (-position.magnitude2() / (2.0 * radius * radius)).exp()
}

/// Dense cells are red, sparse ones blue.
pub fn colour_for_density(density: f32) -> [f32; 4] {
    let d = density.clamp(0.0, 1.0);
    [d, 0.0, 1.0 - d, 1.0]
}

pub fn density_colour(position: Vector3<f32>) -> [f32; 4] {
    colour_for_density(density(position, 2.5))
}

pub fn constant_blue(_: Vector3<f32>) -> [f32; 4] {
    [0.0, 0.0, 1.0, 1.0]
}

/// Vertex layout of one packed instance matrix (shader locations 5 to 8).
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MatrixInstance {
    model: [[f32; 4]; 4],
}

impl Vertex for MatrixInstance {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<MatrixInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            // A mat4 takes up 4 vertex slots, one per column.
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Vertex layout of one packed instance colour (shader location 9).
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColorInstance {
    color: [f32; 4],
}

impl Vertex for ColorInstance {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ColorInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 9,
                format: wgpu::VertexFormat::Float32x4,
            }],
        }
    }
}

/// CPU side of the batch: per-instance state plus its packed form.
#[derive(Clone, Debug)]
pub struct InstanceGrid {
    spacing: u32,
    matrices: Vec<Matrix4<f32>>,
    colors: Vec<[f32; 4]>,
    velocities: Vec<Vector3<f32>>,
    matrices_flat: Vec<f32>,
    colors_flat: Vec<f32>,
}

impl InstanceGrid {
    /// Fills a centered `spacing³` lattice with unit cells.
    ///
    /// Instances are created in x, y, z nested order (x outermost), which
    /// defines their index. Each cube is moved to its cell and shrunk by
    /// `shrink`.
    pub fn new(spacing: u32, shrink: f32, colour: ColourFn) -> Self {
        let count = (spacing as usize).pow(3);
        let hs = spacing as f32 / 2.0;
        let mut matrices = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);

        for x in 0..spacing {
            for y in 0..spacing {
                for z in 0..spacing {
                    let cell = Vector3::new(x as f32 - hs, y as f32 - hs, z as f32 - hs);
                    matrices.push(Matrix4::from_translation(cell) * Matrix4::from_scale(shrink));
                    colors.push(colour(cell));
                }
            }
        }

        let velocities = vec![Vector3::zero(); count];
        let mut grid = Self {
            spacing,
            matrices,
            colors,
            velocities,
            matrices_flat: vec![0.0; count * MATRIX_FLOATS],
            colors_flat: vec![0.0; count * COLOR_FLOATS],
        };
        grid.flatten();
        grid
    }

    /// Assembles a grid from existing per-instance arrays, which must agree in length.
    pub fn from_parts(
        spacing: u32,
        matrices: Vec<Matrix4<f32>>,
        colors: Vec<[f32; 4]>,
        velocities: Vec<Vector3<f32>>,
    ) -> Result<Self> {
        let count = (spacing as usize).pow(3);
        if matrices.len() != count || colors.len() != count || velocities.len() != count {
            return Err(SceneError::InstanceCountMismatch {
                matrices: matrices.len(),
                attributes: colors.len(),
                velocities: velocities.len(),
            });
        }
        let mut grid = Self {
            spacing,
            matrices,
            colors,
            velocities,
            matrices_flat: vec![0.0; count * MATRIX_FLOATS],
            colors_flat: vec![0.0; count * COLOR_FLOATS],
        };
        grid.flatten();
        Ok(grid)
    }

    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// Index of the cell at lattice coordinates `(x, y, z)`.
    pub fn grid_index(&self, x: u32, y: u32, z: u32) -> usize {
        let s = self.spacing as usize;
        assert!(
            x < self.spacing && y < self.spacing && z < self.spacing,
            "cell ({}, {}, {}) outside a lattice of {}",
            x,
            y,
            z,
            s
        );
        (x as usize * s + y as usize) * s + z as usize
    }

    /// Panics when `index` is not below [`InstanceGrid::len`].
    pub fn matrix(&self, index: usize) -> Matrix4<f32> {
        self.matrices[index]
    }

    pub fn color(&self, index: usize) -> [f32; 4] {
        self.colors[index]
    }

    pub fn velocity(&self, index: usize) -> Vector3<f32> {
        self.velocities[index]
    }

    pub fn set_matrix(&mut self, index: usize, matrix: Matrix4<f32>) {
        self.matrices[index] = matrix;
        self.matrices_flat[index * MATRIX_FLOATS..(index + 1) * MATRIX_FLOATS]
            .copy_from_slice(&to_floats(&matrix));
    }

    pub fn set_color(&mut self, index: usize, color: [f32; 4]) {
        self.colors[index] = color;
        self.colors_flat[index * COLOR_FLOATS..(index + 1) * COLOR_FLOATS].copy_from_slice(&color);
    }

    pub fn set_velocity(&mut self, index: usize, velocity: Vector3<f32>) {
        self.velocities[index] = velocity;
    }

    /// Repacks every matrix and colour into the flat arrays.
    pub fn flatten(&mut self) {
        for (chunk, matrix) in self
            .matrices_flat
            .chunks_exact_mut(MATRIX_FLOATS)
            .zip(self.matrices.iter())
        {
            chunk.copy_from_slice(&to_floats(matrix));
        }
        for (chunk, color) in self
            .colors_flat
            .chunks_exact_mut(COLOR_FLOATS)
            .zip(self.colors.iter())
        {
            chunk.copy_from_slice(color);
        }
    }

    pub fn matrices_flat(&self) -> &[f32] {
        &self.matrices_flat
    }

    pub fn colors_flat(&self) -> &[f32] {
        &self.colors_flat
    }

    /// Integrates gravity and repacks the matrices if anything moved.
    pub fn apply_gravity(&mut self, gravity: &mut Gravity, time_millis: f64) -> bool {
        let moved = gravity.apply(time_millis, &mut self.matrices, &mut self.velocities);
        if moved {
            self.flatten();
        }
        moved
    }
}

/// GPU side of the batch: the cube entity plus one buffer per packed array.
#[derive(Debug)]
pub struct CubeInstances {
    pub entity: Entity,
    pub grid: InstanceGrid,
    gravity: Option<Gravity>,
    matrix_buffer: wgpu::Buffer,
    color_buffer: wgpu::Buffer,
    uploaded: bool,
}

impl CubeInstances {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
        config: &SceneConfig,
    ) -> Result<Self> {
        let grid = InstanceGrid::new(config.spacing, config.instance_shrink, density_colour);
        Self::from_grid(device, layout, camera_buffer, grid, config.physics)
    }

    pub fn from_grid(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
        grid: InstanceGrid,
        physics: PhysicsConfig,
    ) -> Result<Self> {
        let mut geometry = Geometry::cube([0.0; 3], 1.0);
        geometry.label = "cube instances".to_string();
        let entity = Entity::new(device, layout, camera_buffer, geometry, MeshType::Cube)?;

        let matrix_buffer =
            mk_instance_buffer(device, "cube instances matrices", grid.matrices_flat());
        ensure_size(
            "cube instances matrices",
            &matrix_buffer,
            (grid.len() * MATRIX_FLOATS * std::mem::size_of::<f32>()) as u64,
        )?;
        let color_buffer = mk_instance_buffer(device, "cube instances colors", grid.colors_flat());
        ensure_size(
            "cube instances colors",
            &color_buffer,
            (grid.len() * COLOR_FLOATS * std::mem::size_of::<f32>()) as u64,
        )?;

        log::info!(
            "cube lattice: {} instances, {} + {} instance bytes, physics {}",
            grid.len(),
            matrix_buffer.size(),
            color_buffer.size(),
            if physics.enabled { "on" } else { "off" }
        );

        Ok(Self {
            entity,
            grid,
            gravity: physics.enabled.then(|| Gravity::new(physics)),
            matrix_buffer,
            color_buffer,
            uploaded: false,
        })
    }

    pub fn instance_count(&self) -> u32 {
        self.grid.len() as u32
    }

    pub fn has_physics(&self) -> bool {
        self.gravity.is_some()
    }

    pub fn matrix_buffer(&self) -> &wgpu::Buffer {
        &self.matrix_buffer
    }

    pub fn color_buffer(&self) -> &wgpu::Buffer {
        &self.color_buffer
    }

    /// Enqueue both packed arrays in full, plus the batch-wide transform.
    pub fn upload_all(&mut self, queue: &wgpu::Queue) {
        self.entity.write_to_buffer(queue);
        queue.write_buffer(
            &self.matrix_buffer,
            0,
            bytemuck::cast_slice(self.grid.matrices_flat()),
        );
        queue.write_buffer(
            &self.color_buffer,
            0,
            bytemuck::cast_slice(self.grid.colors_flat()),
        );
        self.uploaded = true;
    }

    /// One instanced draw over the whole batch.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) -> Result<()> {
        if !self.uploaded {
            return Err(SceneError::NotUploaded {
                label: self.entity.label().to_string(),
            });
        }
        if self.grid.is_empty() {
            return Ok(());
        }
        self.entity.draw_instanced(
            pass,
            &[&self.matrix_buffer, &self.color_buffer],
            self.instance_count(),
        );
        Ok(())
    }

    /// Runs the gravity updater if the batch has one. Returns whether any instance moved.
    pub fn apply_physics(&mut self, time_millis: f64) -> bool {
        match self.gravity.as_mut() {
            Some(gravity) => self.grid.apply_gravity(gravity, time_millis),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::SquareMatrix;

    #[test]
    fn lattice_of_ten_holds_a_thousand_instances() {
        let grid = InstanceGrid::new(10, 0.1, constant_blue);
        assert_eq!(grid.len(), 1000);
        assert_eq!(grid.matrices_flat().len(), 1000 * MATRIX_FLOATS);
        assert_eq!(grid.colors_flat().len(), 1000 * COLOR_FLOATS);
    }

    #[test]
    fn cells_are_centered_and_shrunk() {
        let grid = InstanceGrid::new(10, 0.1, constant_blue);
        for (x, y, z) in [(0, 0, 0), (3, 7, 1), (9, 9, 9), (5, 0, 2)] {
            let m = grid.matrix(grid.grid_index(x, y, z));
            assert_eq!(m.w.x, x as f32 - 5.0);
            assert_eq!(m.w.y, y as f32 - 5.0);
            assert_eq!(m.w.z, z as f32 - 5.0);
            assert_eq!((m.x.x, m.y.y, m.z.z), (0.1, 0.1, 0.1));
        }
    }

    #[test]
    fn x_is_the_outermost_loop() {
        let grid = InstanceGrid::new(4, 1.0, constant_blue);
        assert_eq!(grid.grid_index(0, 0, 1), 1);
        assert_eq!(grid.grid_index(0, 1, 0), 4);
        assert_eq!(grid.grid_index(1, 0, 0), 16);
        assert_eq!(grid.matrix(1).w.z, -1.0);
        assert_eq!(grid.matrix(16).w.x, -1.0);
    }

    #[test]
    fn packed_matrices_read_back_at_sixteen_float_offsets() {
        let grid = InstanceGrid::new(3, 0.1, constant_blue);
        let flat = grid.matrices_flat();
        for i in 0..grid.len() {
            let mut columns = [[0.0f32; 4]; 4];
            for (c, column) in columns.iter_mut().enumerate() {
                let start = MATRIX_FLOATS * i + 4 * c;
                column.copy_from_slice(&flat[start..start + 4]);
            }
            assert_eq!(Matrix4::from(columns), grid.matrix(i));
        }
    }

    #[test]
    fn set_matrix_keeps_packed_array_in_sync() {
        let mut grid = InstanceGrid::new(2, 0.1, constant_blue);
        let m = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
        grid.set_matrix(5, m);
        assert_eq!(&grid.matrices_flat()[5 * 16..6 * 16], &to_floats(&m));
        grid.set_color(5, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(&grid.colors_flat()[5 * 4..6 * 4], &[1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn mismatched_arrays_are_rejected() {
        let err = InstanceGrid::from_parts(
            2,
            vec![Matrix4::identity(); 8],
            vec![[0.0; 4]; 7],
            vec![Vector3::zero(); 8],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SceneError::InstanceCountMismatch {
                matrices: 8,
                attributes: 7,
                velocities: 8
            }
        ));
    }

    #[test]
    #[should_panic]
    fn out_of_range_index_panics() {
        let grid = InstanceGrid::new(2, 0.1, constant_blue);
        grid.matrix(8);
    }

    #[test]
    fn colour_function_sees_cell_position() {
        let grid = InstanceGrid::new(10, 0.1, density_colour);
        let center = grid.color(grid.grid_index(5, 5, 5));
        let corner = grid.color(grid.grid_index(0, 0, 0));
        assert_eq!(center, [1.0, 0.0, 0.0, 1.0]);
        assert!(corner[0] < 0.01 && corner[2] > 0.99);
    }

    #[test]
    fn zero_spacing_gives_an_empty_batch() {
        let mut grid = InstanceGrid::new(0, 0.1, density_colour);
        assert!(grid.is_empty());
        assert!(grid.matrices_flat().is_empty());
        assert!(grid.colors_flat().is_empty());

        let mut gravity = Gravity::new(PhysicsConfig {
            enabled: true,
            ..PhysicsConfig::default()
        });
        grid.apply_gravity(&mut gravity, 0.0);
        grid.apply_gravity(&mut gravity, 16.0);
        assert!(grid.is_empty());
    }

    #[test]
    fn seeded_velocity_bounces_off_the_floor() {
        let mut grid = InstanceGrid::new(2, 0.1, constant_blue);
        let mut gravity = Gravity::new(PhysicsConfig {
            enabled: true,
            gravity: 0.0,
            bound_y: 2.0,
            damping: 0.5,
        });
        let i = grid.grid_index(1, 0, 1);
        grid.set_velocity(i, Vector3::new(0.0, -10.0, 0.0));

        grid.apply_gravity(&mut gravity, 0.0);
        assert!(grid.apply_gravity(&mut gravity, 1000.0));

        assert_eq!(grid.matrix(i).w.y, -2.0);
        assert_eq!(grid.velocity(i), Vector3::new(0.0, 5.0, 0.0));
        assert_eq!(grid.matrices_flat()[MATRIX_FLOATS * i + 13], -2.0);
        // untouched neighbour
        assert_eq!(grid.velocity(0), Vector3::zero());
        assert_eq!(grid.matrix(0).w.y, -1.0);
    }

    #[test]
    fn gravity_moves_instances_and_repacks() {
        let mut grid = InstanceGrid::new(2, 0.1, constant_blue);
        let mut gravity = Gravity::new(PhysicsConfig {
            enabled: true,
            gravity: -1.0,
            bound_y: 100.0,
            damping: 0.9,
        });
        let before = grid.matrix(0).w.y;
        assert!(!grid.apply_gravity(&mut gravity, 0.0));
        assert!(grid.apply_gravity(&mut gravity, 1000.0));
        assert!(grid.matrix(0).w.y < before);
        assert_eq!(grid.matrices_flat()[13], grid.matrix(0).w.y);
    }
}
