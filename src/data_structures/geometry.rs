//! Raw vertex data and the built-in shapes of the scene.
//!
//! Vertices are interleaved `f32` arrays: `[x, y, z, r, g, b]` per vertex.
//! The draw call's vertex count is derived from the array length, so a
//! geometry can never disagree with the buffer it was uploaded from.

use crate::error::{Result, SceneError};

/// Floats per vertex: position (3) followed by colour (3).
pub const FLOATS_PER_VERTEX: usize = 6;

/// Describes how vertex bytes map to shader inputs.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex for ColorVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ColorVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Identifies the shading behaviour a drawable asks the shader for.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshType {
    Triangle = 0,
    Axis = 1,
    Cube = 2,
    Loaded = 3,
    /// Helper entities that own no drawable geometry.
    Throwaway = 99,
}

impl MeshType {
    pub fn id(self) -> u32 {
        self as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
}

impl From<Topology> for wgpu::PrimitiveTopology {
    fn from(topology: Topology) -> Self {
        match topology {
            Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
            Topology::Lines => wgpu::PrimitiveTopology::LineList,
        }
    }
}

/// Immutable vertex data of one drawable.
#[derive(Clone, Debug)]
pub struct Geometry {
    pub label: String,
    vertices: Vec<f32>,
    pub topology: Topology,
}

impl Geometry {
    /// Wraps a raw vertex array. An empty array is legal and yields a geometry
    /// that is never drawn.
    pub fn new(label: &str, vertices: Vec<f32>, topology: Topology) -> Result<Self> {
        if vertices.len() % FLOATS_PER_VERTEX != 0 {
            return Err(SceneError::RaggedVertices {
                label: label.to_string(),
                floats: vertices.len(),
                stride: FLOATS_PER_VERTEX,
            });
        }
        Ok(Self {
            label: label.to_string(),
            vertices,
            topology,
        })
    }

    pub fn empty(label: &str) -> Self {
        Self {
            label: label.to_string(),
            vertices: Vec::new(),
            topology: Topology::Triangles,
        }
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> u32 {
        (self.vertices.len() / FLOATS_PER_VERTEX) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn byte_len(&self) -> u64 {
        std::mem::size_of_val(self.vertices.as_slice()) as u64
    }

    /// Single triangle facing +Z, the default shape of a plain entity.
    pub fn triangle() -> Self {
        #[rustfmt::skip]
        let vertices = vec![
            -0.5, -0.5, 0.0,   1.0, 0.0, 0.0,
             0.5, -0.5, 0.0,   0.0, 1.0, 0.0,
             0.0,  0.5, 0.0,   0.0, 0.0, 1.0,
        ];
        Self {
            label: "triangle".to_string(),
            vertices,
            topology: Topology::Triangles,
        }
    }

    /// Three coloured line segments through the origin: X red, Y green, Z blue.
    pub fn axes(half_length: f32) -> Self {
        let l = half_length;
        #[rustfmt::skip]
        let vertices = vec![
            -l, 0.0, 0.0,   1.0, 0.0, 0.0,
             l, 0.0, 0.0,   1.0, 0.0, 0.0,
            0.0, -l, 0.0,   0.0, 1.0, 0.0,
            0.0,  l, 0.0,   0.0, 1.0, 0.0,
            0.0, 0.0, -l,   0.0, 0.0, 1.0,
            0.0, 0.0,  l,   0.0, 0.0, 1.0,
        ];
        Self {
            label: "axes".to_string(),
            vertices,
            topology: Topology::Lines,
        }
    }

    /// Axis-aligned cube around `center`, 36 vertices with outward CCW winding.
    pub fn cube(center: [f32; 3], half_extent: f32) -> Self {
        // (normal, u, v) with u x v = normal
        const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
        ];
        let h = half_extent;
        let mut vertices = Vec::with_capacity(36 * FLOATS_PER_VERTEX);
        for (normal, u, v) in FACES {
            let corner = |su: f32, sv: f32| -> [f32; 3] {
                [0usize, 1, 2].map(|i| center[i] + h * (normal[i] + su * u[i] + sv * v[i]))
            };
            // faces are shaded by their normal, remapped to 0..1
            let color = normal.map(|n| n * 0.5 + 0.5);
            for [su, sv] in [
                [-1.0, -1.0],
                [1.0, -1.0],
                [1.0, 1.0],
                [-1.0, -1.0],
                [1.0, 1.0],
                [-1.0, 1.0],
            ] {
                vertices.extend_from_slice(&corner(su, sv));
                vertices.extend_from_slice(&color);
            }
        }
        Self {
            label: "cube".to_string(),
            vertices,
            topology: Topology::Triangles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(geometry: &Geometry) -> Vec<[f32; 3]> {
        geometry
            .vertices()
            .chunks(FLOATS_PER_VERTEX)
            .map(|v| [v[0], v[1], v[2]])
            .collect()
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    #[test]
    fn vertex_counts_follow_array_length() {
        assert_eq!(Geometry::triangle().vertex_count(), 3);
        assert_eq!(Geometry::axes(2.0).vertex_count(), 6);
        assert_eq!(Geometry::cube([0.0; 3], 0.5).vertex_count(), 36);
        assert_eq!(Geometry::empty("helper").vertex_count(), 0);
    }

    #[test]
    fn ragged_vertex_array_is_rejected() {
        let err = Geometry::new("broken", vec![0.0; 7], Topology::Triangles).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn empty_vertex_array_is_legal() {
        let geometry = Geometry::new("helper", Vec::new(), Topology::Triangles).unwrap();
        assert!(geometry.is_empty());
        assert_eq!(geometry.byte_len(), 0);
    }

    #[test]
    fn cube_triangles_face_outwards() {
        let center = [0.0, 0.0, -4.0];
        let cube = Geometry::cube(center, 1.0);
        for tri in positions(&cube).chunks(3) {
            let e1 = [0usize, 1, 2].map(|i| tri[1][i] - tri[0][i]);
            let e2 = [0usize, 1, 2].map(|i| tri[2][i] - tri[0][i]);
            let n = cross(e1, e2);
            let mid = [0usize, 1, 2].map(|i| (tri[0][i] + tri[1][i] + tri[2][i]) / 3.0 - center[i]);
            let dot: f32 = (0..3usize).map(|i| n[i] * mid[i]).sum();
            assert!(dot > 0.0, "triangle {:?} faces inwards", tri);
        }
    }

    #[test]
    fn cube_stays_within_extent() {
        let cube = Geometry::cube([1.0, 2.0, 3.0], 0.5);
        for p in positions(&cube) {
            assert!((p[0] - 1.0).abs() <= 0.5 + 1e-6);
            assert!((p[1] - 2.0).abs() <= 0.5 + 1e-6);
            assert!((p[2] - 3.0).abs() <= 0.5 + 1e-6);
        }
    }
}
