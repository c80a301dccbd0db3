//! GPU buffer creation with sizes derived from the data they mirror.
//!
//! Every buffer the scene owns is created here so that its byte size is
//! computed from the CPU-side array (`size_of_val`) and verified before use.

use wgpu::util::DeviceExt;

use crate::error::{Result, SceneError};

/// Byte size of one 4x4 `f32` matrix.
pub const MATRIX_BYTES: u64 = std::mem::size_of::<[[f32; 4]; 4]>() as u64;

/// Fails with a configuration error when `buffer` does not hold exactly `expected` bytes.
pub fn ensure_size(label: &str, buffer: &wgpu::Buffer, expected: u64) -> Result<()> {
    if buffer.size() != expected {
        return Err(SceneError::BufferSizeMismatch {
            label: label.to_string(),
            expected,
            actual: buffer.size(),
        });
    }
    Ok(())
}

/// Uniform buffer rewritten through the queue, e.g. a drawable's transform.
pub fn mk_uniform_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::UNIFORM
            | wgpu::BufferUsages::COPY_DST
            | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    })
}

/// Immutable vertex data, uploaded once.
pub fn mk_vertex_buffer(device: &wgpu::Device, label: &str, contents: &[f32]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(contents),
        usage: wgpu::BufferUsages::VERTEX,
    })
}

/// Per-instance vertex data that is rewritten through the queue.
///
/// `COPY_SRC` allows reading the contents back for verification.
pub fn mk_instance_buffer(device: &wgpu::Device, label: &str, data: &[f32]) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of_val(data) as u64,
        usage: wgpu::BufferUsages::VERTEX
            | wgpu::BufferUsages::COPY_DST
            | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    })
}

/// 16 byte uniform holding a single `u32` in its first lane.
///
/// Browsers don't support uniform buffers below 16B, so the id is padded.
pub fn mk_id_buffer(device: &wgpu::Device, label: &str, id: u32) -> wgpu::Buffer {
    let contents: [u32; 4] = [id, 0, 0, 0];
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&contents),
        usage: wgpu::BufferUsages::UNIFORM,
    })
}
