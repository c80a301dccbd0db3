//! Scene data: drawables, instance batches and their CPU-side state.
//!
//! - `geometry` holds raw vertex arrays, their layout and the built-in shapes
//! - `entity` is a single posed drawable with its own transform buffer
//! - `instance` packs a cube lattice into per-instance matrix and colour buffers
//! - `physics` integrates gravity for instance batches
//! - `overlay` is the 2D density point layer
//! - `texture` contains the depth attachment

pub mod entity;
pub mod geometry;
pub mod instance;
pub mod overlay;
pub mod physics;
pub mod texture;
