//! lattice-ngin
//!
//! A small cross-platform scene renderer built around posed drawables and
//! instanced batches. Every drawable owns its transform and GPU buffers, a
//! cube lattice is drawn in one instanced call from two packed per-instance
//! buffers, and a single camera uniform is shared by all of them. Runs
//! natively and on the web (WebGL).
//!
//! High-level modules
//! - `transform`: pose to matrix composition with pivot handling
//! - `camera`: camera rig, fixed projection and the shared camera uniform
//! - `data_structures`: geometry, entities, instance batches, physics, overlay
//! - `pipelines`: render pipelines, bind group layout and shaders
//! - `render`: draw capabilities and the kinds of scene objects
//! - `scene`: per-frame orchestration
//! - `input`: key to pose-delta mapping
//! - `context`: window surface, device and queue
//! - `flow`: the winit event loop driving `Scene::render`
//! - `resources`: buffer helpers and OBJ loading
//! - `config`, `error`: tunables and the error taxonomy
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod input;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod transform;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use wgpu;
pub use winit::keyboard::KeyCode;
