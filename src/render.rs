//! Draw capabilities and the kinds of objects a scene holds.
//!
//! Every object implements [`Drawable`]. Objects that evolve over time on
//! their own additionally implement [`PhysicsUpdatable`]. [`SceneObject`] is
//! the tagged union the scene stores; it hands out whichever capabilities
//! the wrapped object has.
//!
//! Each drawable writes its GPU state before issuing its draw, so a draw
//! always sees the state of the current frame.

use crate::{
    data_structures::{entity::Entity, instance::CubeInstances, overlay::DensityLayer},
    error::Result,
    pipelines::Pipelines,
};

/// Shared, read-only inputs of one frame.
pub struct Frame<'a> {
    pub queue: &'a wgpu::Queue,
    pub pipelines: &'a Pipelines,
    /// Milliseconds since the driver started.
    pub time: f64,
}

pub trait Drawable {
    fn label(&self) -> &str;

    /// Upload this object's state and record its draw into `pass`.
    fn render(&mut self, frame: &Frame<'_>, pass: &mut wgpu::RenderPass<'_>) -> Result<()>;
}

pub trait PhysicsUpdatable {
    /// Advance the simulation to `time_millis`. Returns whether anything moved.
    fn apply_physics(&mut self, time_millis: f64) -> bool;
}

impl Drawable for Entity {
    fn label(&self) -> &str {
        Entity::label(self)
    }

    fn render(&mut self, frame: &Frame<'_>, pass: &mut wgpu::RenderPass<'_>) -> Result<()> {
        if !self.is_drawable() {
            return Ok(());
        }
        pass.set_pipeline(frame.pipelines.basic(self.geometry.topology));
        Entity::render(self, frame.queue, pass);
        Ok(())
    }
}

impl Drawable for CubeInstances {
    fn label(&self) -> &str {
        self.entity.label()
    }

    fn render(&mut self, frame: &Frame<'_>, pass: &mut wgpu::RenderPass<'_>) -> Result<()> {
        pass.set_pipeline(&frame.pipelines.instanced);
        self.upload_all(frame.queue);
        self.draw(pass)
    }
}

impl PhysicsUpdatable for CubeInstances {
    fn apply_physics(&mut self, time_millis: f64) -> bool {
        CubeInstances::apply_physics(self, time_millis)
    }
}

impl Drawable for DensityLayer {
    fn label(&self) -> &str {
        DensityLayer::label(self)
    }

    fn render(&mut self, frame: &Frame<'_>, pass: &mut wgpu::RenderPass<'_>) -> Result<()> {
        pass.set_pipeline(&frame.pipelines.overlay);
        DensityLayer::render(self, frame.queue, pass);
        Ok(())
    }
}

#[derive(Debug)]
pub enum SceneObject {
    /// World reference lines; never follows object rotation input.
    Axes(Entity),
    Mesh(Entity),
    Cubes(CubeInstances),
    Overlay(DensityLayer),
}

impl SceneObject {
    pub fn drawable_mut(&mut self) -> &mut dyn Drawable {
        match self {
            SceneObject::Axes(entity) | SceneObject::Mesh(entity) => entity,
            SceneObject::Cubes(cubes) => cubes,
            SceneObject::Overlay(layer) => layer,
        }
    }

    pub fn physics_mut(&mut self) -> Option<&mut dyn PhysicsUpdatable> {
        match self {
            SceneObject::Cubes(cubes) if cubes.has_physics() => Some(cubes),
            _ => None,
        }
    }

    /// The entity that follows object rotation input, if any.
    pub fn posed_entity_mut(&mut self) -> Option<&mut Entity> {
        match self {
            SceneObject::Mesh(entity) => Some(entity),
            SceneObject::Cubes(cubes) => Some(&mut cubes.entity),
            SceneObject::Axes(_) | SceneObject::Overlay(_) => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SceneObject::Axes(entity) | SceneObject::Mesh(entity) => entity.label(),
            SceneObject::Cubes(cubes) => cubes.entity.label(),
            SceneObject::Overlay(layer) => layer.label(),
        }
    }
}
