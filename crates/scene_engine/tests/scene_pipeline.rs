//! End-to-end pipeline test: import a scene description, bind the headless
//! renderer, then run animate -> light pass -> draw frames and check what
//! reached the bridge.

use approx::assert_relative_eq;
use scene_engine::foundation::math::{rotation_deg, translation, MatrixStack, Vec3};
use scene_engine::importer::{MeshLibrary, SceneReader};
use scene_engine::render::{PolygonMesh, TraceRenderer};

const SCENE: &str = r#"
    <scene>
        <instance name="hull" path="box"/>
        <instance name="dome" path="ball"/>
        <image name="plating" path="textures/plating.png"/>
        <group name="station">
            <transform name="station-spin">
                <set><rotate>45 0 1 0</rotate></set>
                <object name="station-hull" instanceof="hull" texture="plating">
                    <material>
                        <diffuse>0.6 0.6 0.7</diffuse>
                        <shininess>32</shininess>
                    </material>
                </object>
            </transform>
            <transform name="dome-lift">
                <set><translate>0 2 0</translate></set>
                <object name="station-dome" instanceof="dome"/>
            </transform>
            <light>
                <diffuse>1 1 1</diffuse>
                <position>0 5 0</position>
            </light>
            <object name="beacon" instanceof="">
                <light>
                    <diffuse>1 0 0</diffuse>
                    <position>0 0 0</position>
                </light>
            </object>
        </group>
    </scene>
"#;

fn provider() -> MeshLibrary {
    let mut library = MeshLibrary::new();
    library.register("box.obj", PolygonMesh::unit_cube());
    library.register("ball.obj", PolygonMesh::unit_sphere(16, 8));
    library
}

#[test]
fn full_pipeline_draws_and_lights() {
    let mut library = provider();
    let info = SceneReader::import_source(SCENE, &mut library).unwrap();
    let mut graph = info.scenegraph;

    let renderer = TraceRenderer::with_default_attributes();
    let log = renderer.log_handle();
    graph.set_renderer(Box::new(renderer), &info.meshes).unwrap();

    let mut stack = MatrixStack::new();
    graph.light_pass(&mut stack).unwrap();
    let mut stack = MatrixStack::new();
    graph.draw(&mut stack).unwrap();

    let log = log.borrow();
    // two geometry leaves; the beacon is light-only
    assert_eq!(log.draws.len(), 2);
    assert_eq!(log.draws[0].mesh, "hull");
    assert_eq!(log.draws[0].texture, "plating");
    assert_eq!(log.draws[1].mesh, "dome");
    assert_relative_eq!(
        log.draws[1].model_view,
        translation(0.0, 2.0, 0.0),
        epsilon = 1e-6
    );

    // both lights gathered with sequential slots and a final count
    let slots: Vec<u32> = log.lights.iter().map(|upload| upload.slot).collect();
    assert_eq!(slots, vec![0, 1]);
    assert_eq!(log.light_count, Some(2));
}

#[test]
fn animation_feeds_the_next_frame() {
    let mut library = provider();
    let info = SceneReader::import_source(SCENE, &mut library).unwrap();
    let mut graph = info.scenegraph;

    let renderer = TraceRenderer::with_default_attributes();
    let log = renderer.log_handle();
    graph.set_renderer(Box::new(renderer), &info.meshes).unwrap();

    graph.register_animation(
        "orbit",
        Box::new(|time, targets| {
            targets.set_animation_transform(
                "dome-lift",
                rotation_deg(time * 90.0, Vec3::new(0.0, 1.0, 0.0)),
            )
        }),
    );

    // frame 1: no animation applied yet
    let mut stack = MatrixStack::new();
    graph.light_pass(&mut stack).unwrap();
    let mut stack = MatrixStack::new();
    graph.draw(&mut stack).unwrap();

    // frame 2: animate, then draw
    graph.animate("orbit", 1.0).unwrap();
    let mut stack = MatrixStack::new();
    graph.light_pass(&mut stack).unwrap();
    let mut stack = MatrixStack::new();
    graph.draw(&mut stack).unwrap();

    let log = log.borrow();
    assert_eq!(log.draws.len(), 4);
    // dome transform per frame: frame 1 static only, frame 2 animation * static
    assert_relative_eq!(
        log.draws[1].model_view,
        translation(0.0, 2.0, 0.0),
        epsilon = 1e-6
    );
    let expected =
        rotation_deg(90.0, Vec3::new(0.0, 1.0, 0.0)) * translation(0.0, 2.0, 0.0);
    assert_relative_eq!(log.draws[3].model_view, expected, epsilon = 1e-5);

    // slot numbering restarted on the second pass
    let slots: Vec<u32> = log.lights.iter().map(|upload| upload.slot).collect();
    assert_eq!(slots, vec![0, 1, 0, 1]);
}

#[test]
fn disposing_makes_draw_a_noop() {
    let mut library = provider();
    let info = SceneReader::import_source(SCENE, &mut library).unwrap();
    let mut graph = info.scenegraph;

    let renderer = TraceRenderer::with_default_attributes();
    let log = renderer.log_handle();
    graph.set_renderer(Box::new(renderer), &info.meshes).unwrap();

    graph.dispose();
    let mut stack = MatrixStack::new();
    graph.draw(&mut stack).unwrap();
    assert!(log.borrow().draws.is_empty());
}
