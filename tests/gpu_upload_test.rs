#![cfg(feature = "integration-tests")]

mod common;

use cgmath::Vector3;
use common::test_utils::{Gpu, block_on};
use lattice_ngin::{
    config::{PhysicsConfig, SceneConfig},
    data_structures::{
        entity::Entity,
        geometry::{Geometry, MeshType},
        instance::{CubeInstances, MATRIX_FLOATS},
    },
    pipelines::entity::mk_entity_bind_group_layout,
    transform::{compose, to_floats},
};

#[test]
fn instance_buffers_hold_packed_arrays() {
    block_on(async {
        let gpu = Gpu::new().await;
        let layout = mk_entity_bind_group_layout(&gpu.device);
        let mut cubes =
            CubeInstances::new(&gpu.device, &layout, &gpu.camera.buffer, &SceneConfig::default())
                .unwrap();

        assert_eq!(cubes.instance_count(), 1000);
        assert_eq!(cubes.matrix_buffer().size(), 1000 * 16 * 4);
        assert_eq!(cubes.color_buffer().size(), 1000 * 4 * 4);

        cubes.upload_all(&gpu.queue);
        let matrices = gpu.read_floats(cubes.matrix_buffer()).await;
        let colors = gpu.read_floats(cubes.color_buffer()).await;
        assert_eq!(matrices.as_slice(), cubes.grid.matrices_flat());
        assert_eq!(colors.as_slice(), cubes.grid.colors_flat());

        let i = cubes.grid.grid_index(3, 4, 5);
        assert_eq!(
            &matrices[MATRIX_FLOATS * i..MATRIX_FLOATS * (i + 1)],
            &to_floats(&cubes.grid.matrix(i))
        );
    });
}

#[test]
fn entity_transform_buffer_follows_pose() {
    block_on(async {
        let gpu = Gpu::new().await;
        let layout = mk_entity_bind_group_layout(&gpu.device);
        let pivot = Vector3::new(0.0, 0.0, -4.0);
        let mut entity = Entity::with_pivot(
            &gpu.device,
            &layout,
            &gpu.camera.buffer,
            Geometry::cube([0.0, 0.0, -4.0], 0.5),
            MeshType::Cube,
            pivot,
        )
        .unwrap();
        assert_eq!(entity.transform_buffer().size(), 64);

        entity.set_eulers(0.2, 0.4, 0.6);
        entity.write_to_buffer(&gpu.queue);
        let floats = gpu.read_floats(entity.transform_buffer()).await;
        assert_eq!(floats.as_slice(), &to_floats(&compose(pivot, 0.2, 0.4, 0.6)));
    });
}

#[test]
fn physics_changes_reach_the_next_upload() {
    block_on(async {
        let gpu = Gpu::new().await;
        let layout = mk_entity_bind_group_layout(&gpu.device);
        let config = SceneConfig {
            spacing: 2,
            physics: PhysicsConfig {
                enabled: true,
                gravity: -1.0,
                ..PhysicsConfig::default()
            },
            ..SceneConfig::default()
        };
        let mut cubes =
            CubeInstances::new(&gpu.device, &layout, &gpu.camera.buffer, &config).unwrap();
        let before = cubes.grid.matrix(0).w.y;

        assert!(!cubes.apply_physics(10_000.0));
        assert!(cubes.apply_physics(10_500.0));
        cubes.upload_all(&gpu.queue);

        let matrices = gpu.read_floats(cubes.matrix_buffer()).await;
        assert!(matrices[13] < before);
        assert_eq!(matrices[13], cubes.grid.matrix(0).w.y);
    });
}
