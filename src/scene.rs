//! Scene orchestration.
//!
//! A [`Scene`] owns its objects, in registration order, and the camera. Objects
//! are added before the render loop starts. Each call to [`Scene::render`]
//! uploads the camera once and then lets every object, in order, run its
//! physics (if any), upload its own state and record its draw.

use cgmath::Vector3;

use crate::{
    camera::{CameraResources, CameraRig, Projection},
    config::SceneConfig,
    data_structures::{
        entity::Entity,
        geometry::{Geometry, MeshType},
        instance::{CubeInstances, InstanceGrid},
        overlay::{DensityLayer, DensityPoints},
    },
    error::Result,
    pipelines::Pipelines,
    render::{Frame, SceneObject},
};

pub struct Scene {
    objects: Vec<SceneObject>,
    camera: CameraResources,
    pipelines: Pipelines,
    config: SceneConfig,
}

impl Scene {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        size: [u32; 2],
        config: SceneConfig,
    ) -> Self {
        let pipelines = Pipelines::new(device, color_format);
        let rig = CameraRig::new(config.camera_translation);
        let projection = Projection::new(size[0], size[1], &config.projection);
        let camera = CameraResources::new(device, rig, projection);
        Self {
            objects: Vec::new(),
            camera,
            pipelines,
            config,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn camera(&self) -> &CameraResources {
        &self.camera
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [SceneObject] {
        &mut self.objects
    }

    pub fn push(&mut self, object: SceneObject) {
        log::debug!("scene object #{}: `{}`", self.objects.len(), object.label());
        self.objects.push(object);
    }

    pub fn add_axes(&mut self, device: &wgpu::Device, half_length: f32) -> Result<()> {
        let entity = Entity::new(
            device,
            &self.pipelines.entity_layout,
            &self.camera.buffer,
            Geometry::axes(half_length),
            MeshType::Axis,
        )?;
        self.push(SceneObject::Axes(entity));
        Ok(())
    }

    /// Adds a posed entity rotating about `pivot`.
    pub fn add_entity(
        &mut self,
        device: &wgpu::Device,
        geometry: Geometry,
        mesh_type: MeshType,
        pivot: Vector3<f32>,
    ) -> Result<()> {
        let entity = Entity::with_pivot(
            device,
            &self.pipelines.entity_layout,
            &self.camera.buffer,
            geometry,
            mesh_type,
            pivot,
        )?;
        self.push(SceneObject::Mesh(entity));
        Ok(())
    }

    /// Adds the cube lattice described by the scene config.
    pub fn add_cube_instances(&mut self, device: &wgpu::Device) -> Result<()> {
        let cubes = CubeInstances::new(
            device,
            &self.pipelines.entity_layout,
            &self.camera.buffer,
            &self.config,
        )?;
        self.push(SceneObject::Cubes(cubes));
        Ok(())
    }

    pub fn add_instance_grid(&mut self, device: &wgpu::Device, grid: InstanceGrid) -> Result<()> {
        let cubes = CubeInstances::from_grid(
            device,
            &self.pipelines.entity_layout,
            &self.camera.buffer,
            grid,
            self.config.physics,
        )?;
        self.push(SceneObject::Cubes(cubes));
        Ok(())
    }

    /// Adds `overlay_points` randomly placed points over a `size` pixel screen.
    pub fn add_overlay(&mut self, device: &wgpu::Device, size: [u32; 2], seed: u64) -> Result<()> {
        let points = DensityPoints::random(
            self.config.overlay_points,
            [size[0] as f32, size[1] as f32],
            self.config.overlay_jitter,
            seed,
        );
        let layer = DensityLayer::new(device, "density overlay", points)?;
        self.push(SceneObject::Overlay(layer));
        Ok(())
    }

    /// Rotates every posed object about its own pivot. Angles in radians.
    pub fn set_object_eulers(&mut self, pitch: f32, yaw: f32, roll: f32) {
        for entity in self.objects.iter_mut().filter_map(SceneObject::posed_entity_mut) {
            entity.set_eulers(pitch, yaw, roll);
        }
    }

    /// Angles in degrees.
    pub fn set_camera_eulers(&mut self, pitch: f32, yaw: f32, roll: f32) {
        self.camera.rig.set_eulers(pitch, yaw, roll);
    }

    pub fn set_camera_translation(&mut self, translation: Vector3<f32>) {
        self.camera.rig.set_translation(translation);
    }

    /// Records one frame into `pass`.
    ///
    /// The first failing object aborts the frame and its error is returned;
    /// objects after it are not drawn.
    pub fn render(
        &mut self,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        time_millis: f64,
    ) -> Result<()> {
        self.camera.write_to_buffer(queue);

        let frame = Frame {
            queue,
            pipelines: &self.pipelines,
            time: time_millis,
        };
        for object in self.objects.iter_mut() {
            if let Some(physics) = object.physics_mut() {
                physics.apply_physics(frame.time);
            }
            object.drawable_mut().render(&frame, pass)?;
        }
        Ok(())
    }
}
