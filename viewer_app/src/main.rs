//! Headless scene viewer
//!
//! Loads a scene description, binds the recording renderer bridge, and runs a
//! few animate -> light pass -> draw frames, reporting what was drawn. Useful
//! for validating scene files and watching traversal output without a GPU.

mod config;

use config::ViewerConfig;
use scene_engine::foundation::math::{rotation_deg, translation, MatrixStack, Vec3};
use scene_engine::importer::{MeshLibrary, SceneReader};
use scene_engine::render::{PolygonMesh, TraceRenderer};
use scene_engine::scene::Scenegraph;
use std::path::Path;
use std::process::ExitCode;

/// Procedural stand-ins for the mesh files scene descriptions refer to.
fn mesh_library() -> MeshLibrary {
    let mut library = MeshLibrary::new();
    library.register("box.obj", PolygonMesh::unit_cube());
    library.register("ball.obj", PolygonMesh::unit_sphere(24, 12));
    library
}

/// The demo rig: spin every node whose name ends in `-spin`.
fn register_spin(graph: &mut Scenegraph) {
    let spin_targets: Vec<String> = graph
        .nodes()
        .keys()
        .filter(|name| name.ends_with("-spin"))
        .cloned()
        .collect();
    graph.register_animation(
        "spin",
        Box::new(move |time, targets| {
            for name in &spin_targets {
                targets.set_animation_transform(
                    name,
                    rotation_deg(time * 90.0, Vec3::new(0.0, 1.0, 0.0)),
                )?;
            }
            Ok(())
        }),
    );
}

fn run(config: &ViewerConfig) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("loading scene `{}`", config.scene);
    let mut library = mesh_library();
    let info = SceneReader::import_file(Path::new(&config.scene), &mut library)?;
    let mut graph = info.scenegraph;
    log::info!(
        "scene ready: {} nodes, {} meshes, {} textures",
        graph.tree().len(),
        info.meshes.len(),
        graph.textures().len()
    );

    register_spin(&mut graph);

    let renderer = TraceRenderer::with_default_attributes();
    let log_handle = renderer.log_handle();
    graph.set_renderer(Box::new(renderer), &info.meshes)?;

    for frame in 0..config.frames {
        let time = frame as f32 * config.time_step;
        if let Some(animation) = &config.animation {
            if graph.has_animation(animation) {
                graph.animate(animation, time)?;
            }
        }
        // camera sits back on +z looking at the origin
        let mut model_view = MatrixStack::with_initial(translation(0.0, 0.0, -10.0));
        graph.light_pass(&mut model_view)?;
        let mut model_view = MatrixStack::with_initial(translation(0.0, 0.0, -10.0));
        graph.draw(&mut model_view)?;
        log::info!("frame {frame} complete (t = {time:.2})");
    }

    let record = log_handle.borrow();
    let frames = config.frames.max(1) as usize;
    println!("frames rendered: {}", config.frames);
    println!(
        "draw calls: {} total, {} per frame",
        record.draws.len(),
        record.draws.len() / frames
    );
    println!(
        "lights: {} uploads, {:?} active per pass",
        record.lights.len(),
        record.light_count
    );
    for call in record.draws.iter().take(record.draws.len() / frames) {
        println!(
            "  {} (texture {}) at ({:.2}, {:.2}, {:.2})",
            call.mesh,
            call.texture,
            call.model_view[(0, 3)],
            call.model_view[(1, 3)],
            call.model_view[(2, 3)]
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match ViewerConfig::load(Path::new(&path)) {
            Ok(config) => config,
            Err(message) => {
                eprintln!("{message}");
                return ExitCode::FAILURE;
            }
        },
        None => ViewerConfig::default(),
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("viewer failed: {error}");
            ExitCode::FAILURE
        }
    }
}
