//! Errors raised while building or drawing a scene.
//!
//! Two families exist. Configuration errors describe a CPU/GPU layout
//! disagreement (a buffer that does not match the data it mirrors, arrays of
//! different lengths, drawing before the first upload). They are detected at
//! construction time and the affected object is never built. Device errors are
//! reported by the graphics backend for a single frame and are handed to the
//! caller of `render`; the next scheduled frame is the retry.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("buffer `{label}` holds {actual} bytes but its data needs {expected} bytes")]
    BufferSizeMismatch {
        label: String,
        expected: u64,
        actual: u64,
    },

    #[error(
        "instance arrays disagree: {matrices} matrices, {attributes} attributes, {velocities} velocities"
    )]
    InstanceCountMismatch {
        matrices: usize,
        attributes: usize,
        velocities: usize,
    },

    #[error("`{label}` was drawn before its instance data was uploaded")]
    NotUploaded { label: String },

    #[error("vertex array of `{label}` has {floats} floats which is not a multiple of {stride}")]
    RaggedVertices {
        label: String,
        floats: usize,
        stride: usize,
    },

    #[error("surface unavailable: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

impl SceneError {
    /// Configuration errors corrupt GPU memory layout and must never be retried.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, SceneError::Surface(_))
    }
}

pub type Result<T> = std::result::Result<T, SceneError>;
