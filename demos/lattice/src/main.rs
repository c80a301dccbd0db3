use lattice_ngin::{
    cgmath::Vector3,
    config::{InputConfig, PhysicsConfig, SceneConfig},
    data_structures::geometry::{Geometry, MeshType, Topology},
    flow::{self, SceneInit},
    resources::load_obj_vertices,
};

async fn build(init: SceneInit) -> anyhow::Result<lattice_ngin::scene::Scene> {
    let mut scene = init.empty_scene();
    scene.add_axes(&init.device, 2.0)?;
    scene.add_entity(
        &init.device,
        Geometry::triangle(),
        MeshType::Triangle,
        Vector3::new(0.0, 0.0, 0.0),
    )?;

    // Falls back to the lattice alone if the model is missing.
    match load_obj_vertices("pyramid.obj").await {
        Ok(vertices) => {
            let pyramid = Geometry::new("pyramid", vertices, Topology::Triangles)?;
            scene.add_entity(
                &init.device,
                pyramid,
                MeshType::Loaded,
                Vector3::new(0.0, 0.4, 0.0),
            )?;
        }
        Err(e) => log::warn!("skipping pyramid: {:#}", e),
    }

    scene.add_cube_instances(&init.device)?;
    scene.add_overlay(&init.device, init.size, 7)?;
    Ok(scene)
}

fn main() -> anyhow::Result<()> {
    let physics = std::env::args().any(|arg| arg == "--physics");
    let config = SceneConfig {
        physics: PhysicsConfig {
            enabled: physics,
            ..PhysicsConfig::default()
        },
        ..SceneConfig::default()
    };
    flow::run(
        config,
        InputConfig::default(),
        Box::new(|init| Box::pin(build(init))),
    )
}
