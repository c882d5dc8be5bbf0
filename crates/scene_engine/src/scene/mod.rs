//! Scene graph ownership and per-frame orchestration
//!
//! A [`Scenegraph`] owns the node arena and root, keeps the name registry and
//! the deferred texture table, and drives the per-frame passes: callers seed
//! a modelview stack, run the lighting pass (gather + upload light uniforms),
//! then the draw pass. Rendering itself happens behind the
//! [`RendererBridge`](crate::render::RendererBridge) abstraction.

pub mod animation;
pub mod error;
pub mod light;
pub mod material;
pub mod node;

pub use animation::{AnimationFn, AnimationRegistry, AnimationTargets};
pub use error::SceneError;
pub use light::{Light, LightSlots};
pub use material::Material;
pub use node::{Node, NodeKey, NodeKind, SceneTree, WHITE_TEXTURE};

use crate::foundation::math::MatrixStack;
use crate::render::{PolygonMesh, RendererBridge};
use std::collections::HashMap;

/// Product of a scene import: the graph plus the meshes it references.
///
/// Meshes are owned here until [`Scenegraph::set_renderer`] hands them to the
/// bridge.
#[derive(Debug)]
pub struct SceneInfo {
    /// The assembled graph.
    pub scenegraph: Scenegraph,
    /// Mesh name -> geometry, as referenced by leaf nodes.
    pub meshes: HashMap<String, PolygonMesh>,
}

/// Owner of one scene-graph tree and its per-frame machinery.
pub struct Scenegraph {
    tree: SceneTree,
    root: Option<NodeKey>,
    names: HashMap<String, NodeKey>,
    textures: HashMap<String, String>,
    renderer: Option<Box<dyn RendererBridge>>,
    animations: AnimationRegistry,
}

impl std::fmt::Debug for Scenegraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenegraph")
            .field("tree", &self.tree)
            .field("root", &self.root)
            .field("names", &self.names)
            .field("textures", &self.textures)
            .field("renderer", &self.renderer.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Scenegraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenegraph {
    /// Create an empty graph with no root and no renderer.
    pub fn new() -> Self {
        Self {
            tree: SceneTree::new(),
            root: None,
            names: HashMap::new(),
            textures: HashMap::new(),
            renderer: None,
            animations: AnimationRegistry::new(),
        }
    }

    /// Read access to the node arena.
    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    /// Mutable access to the node arena (structural invariants are enforced
    /// by the arena's own methods).
    pub fn tree_mut(&mut self) -> &mut SceneTree {
        &mut self.tree
    }

    /// The adopted root, if any.
    pub fn root(&self) -> Option<NodeKey> {
        self.root
    }

    /// Registry lookup by exact node name.
    pub fn node(&self, name: &str) -> Option<NodeKey> {
        self.names.get(name).copied()
    }

    /// Registered node names and handles.
    pub fn nodes(&self) -> &HashMap<String, NodeKey> {
        &self.names
    }

    /// Deferred texture registrations (name -> image path).
    pub fn textures(&self) -> &HashMap<String, String> {
        &self.textures
    }

    /// Adopt `root` and register every node of its subtree into the name map,
    /// top-down (on duplicate names the last registration wins).
    ///
    /// Fails with [`SceneError::InvalidStructure`] when a root is already
    /// adopted; call [`Scenegraph::dispose`] first to rebuild.
    pub fn make_scenegraph(&mut self, root: NodeKey) -> Result<(), SceneError> {
        if self.root.is_some() {
            return Err(SceneError::InvalidStructure(
                "scene graph already has a root; dispose() it first".to_string(),
            ));
        }
        self.tree.node(root)?;
        self.root = Some(root);
        self.register_subtree(root);
        log::info!(
            "scene graph assembled: {} nodes, {} registered names",
            self.tree.len(),
            self.names.len()
        );
        Ok(())
    }

    fn register_subtree(&mut self, from: NodeKey) {
        let mut pending = vec![from];
        while let Some(key) = pending.pop() {
            let Ok(node) = self.tree.node(key) else { continue };
            self.names.insert(node.name().to_string(), key);
            match node.kind() {
                NodeKind::Group { children } => pending.extend(children.iter().rev().copied()),
                NodeKind::Transform { child, .. } => {
                    if let Some(c) = child {
                        pending.push(*c);
                    }
                }
                NodeKind::Leaf { .. } => {}
            }
        }
    }

    /// Bind the renderer bridge, registering every mesh by name and
    /// forwarding the deferred texture table.
    ///
    /// Must be called exactly once, after the tree is fully built and before
    /// the first draw; a second call is [`SceneError::InvalidStructure`].
    pub fn set_renderer(
        &mut self,
        mut renderer: Box<dyn RendererBridge>,
        meshes: &HashMap<String, PolygonMesh>,
    ) -> Result<(), SceneError> {
        if self.renderer.is_some() {
            return Err(SceneError::InvalidStructure(
                "renderer is already bound".to_string(),
            ));
        }
        for (name, mesh) in meshes {
            renderer.add_mesh(name, mesh)?;
        }
        for (name, path) in &self.textures {
            renderer.add_texture(name, path)?;
        }
        log::info!(
            "renderer bound: {} meshes, {} textures",
            meshes.len(),
            self.textures.len()
        );
        self.renderer = Some(renderer);
        Ok(())
    }

    /// True once a renderer bridge is bound.
    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    /// Register a texture by name with a deferred image path. Already-bound
    /// renderers receive the registration immediately.
    pub fn add_texture(&mut self, name: &str, path: &str) -> Result<(), SceneError> {
        self.textures.insert(name.to_string(), path.to_string());
        if let Some(renderer) = self.renderer.as_deref_mut() {
            renderer.add_texture(name, path)?;
        }
        Ok(())
    }

    /// Draw pass over the whole tree with the caller's modelview stack.
    ///
    /// A no-op `Ok` when either the root or the renderer is unbound.
    pub fn draw(&mut self, model_view: &mut MatrixStack) -> Result<(), SceneError> {
        let (Some(root), Some(renderer)) = (self.root, self.renderer.as_deref_mut()) else {
            return Ok(());
        };
        self.tree.draw(root, renderer, model_view)
    }

    /// Lighting pass: gather every attached light in its traversal frame,
    /// upload to sequential slots starting at zero, then push the total.
    ///
    /// Slot numbering restarts every pass because the counter lives on the
    /// pass, not on the graph or renderer.
    pub fn light_pass(&mut self, model_view: &mut MatrixStack) -> Result<(), SceneError> {
        let (Some(root), Some(renderer)) = (self.root, self.renderer.as_deref_mut()) else {
            return Ok(());
        };
        let mut slots = LightSlots::new();
        self.tree
            .collect_lights(root, renderer, model_view, &mut slots)?;
        renderer.set_light_count(slots.count())?;
        Ok(())
    }

    /// Register an animation hook under `name`.
    pub fn register_animation(&mut self, name: &str, hook: AnimationFn) {
        self.animations.register(name, hook);
    }

    /// True when an animation hook of this name is registered.
    pub fn has_animation(&self, name: &str) -> bool {
        self.animations.contains(name)
    }

    /// Run the named animation hook for this frame. Must be sequenced before
    /// the draw pass of the same frame.
    pub fn animate(&mut self, name: &str, time: f32) -> Result<(), SceneError> {
        let mut targets = AnimationTargets::new(&mut self.tree, &self.names);
        self.animations.run(name, time, &mut targets)
    }

    /// Splice another graph's tree into this one, rewriting every imported
    /// node name with `"<prefix>-"`, and merge its texture table. Returns the
    /// handle of the spliced subtree root (detached, ready for
    /// [`SceneTree::add_child`]).
    ///
    /// This is a pure merge over the two arenas; `sub` is consumed and the
    /// host graph's registry is only updated when the final root is adopted.
    pub fn merge_from(&mut self, prefix: &str, sub: Scenegraph) -> Result<NodeKey, SceneError> {
        let sub_root = sub.root.ok_or_else(|| {
            SceneError::InvalidStructure("imported scene graph has no root".to_string())
        })?;
        let adopted = self.tree.adopt_subtree(&sub.tree, sub_root, prefix)?;
        self.textures.extend(sub.textures);
        log::debug!("merged subgraph under prefix `{prefix}`");
        Ok(adopted)
    }

    /// Destroy the owned tree exactly once; later calls are no-ops.
    pub fn dispose(&mut self) {
        if let Some(root) = self.root.take() {
            self.tree.remove_subtree(root);
            self.names.clear();
            log::debug!("scene graph disposed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{translation, Mat4};
    use crate::render::TraceRenderer;
    use approx::assert_relative_eq;

    fn graph_with_lights() -> (Scenegraph, HashMap<String, PolygonMesh>) {
        let mut graph = Scenegraph::new();
        let root = graph.tree_mut().insert_group("root");
        let xform = graph.tree_mut().insert_transform("spin");
        let leaf = graph.tree_mut().insert_leaf("body", "cube");
        graph.tree_mut().add_child(root, xform).unwrap();
        graph.tree_mut().add_child(xform, leaf).unwrap();

        let mut key_light = Light::new();
        key_light.set_position(0.0, 10.0, 0.0);
        graph.tree_mut().add_light(root, key_light).unwrap();
        let mut fill = Light::new();
        fill.set_direction(0.0, -1.0, 0.0);
        graph.tree_mut().add_light(xform, fill).unwrap();
        let mut rim = Light::new();
        rim.set_position(0.0, 0.0, -2.0);
        graph.tree_mut().add_light(leaf, rim).unwrap();

        graph.make_scenegraph(root).unwrap();

        let mut meshes = HashMap::new();
        meshes.insert("cube".to_string(), PolygonMesh::unit_cube());
        (graph, meshes)
    }

    #[test]
    fn draw_without_renderer_is_a_noop() {
        let (mut graph, _meshes) = graph_with_lights();
        let mut stack = MatrixStack::new();
        graph.draw(&mut stack).unwrap();
        graph.light_pass(&mut stack).unwrap();
    }

    #[test]
    fn make_scenegraph_registers_names_and_rejects_second_root() {
        let (mut graph, _) = graph_with_lights();
        assert!(graph.node("root").is_some());
        assert!(graph.node("spin").is_some());
        assert!(graph.node("body").is_some());

        let stray = graph.tree_mut().insert_group("stray");
        let err = graph.make_scenegraph(stray).unwrap_err();
        assert!(matches!(err, SceneError::InvalidStructure(_)));
    }

    #[test]
    fn set_renderer_is_exactly_once() {
        let (mut graph, meshes) = graph_with_lights();
        graph
            .set_renderer(Box::new(TraceRenderer::with_default_attributes()), &meshes)
            .unwrap();
        let err = graph
            .set_renderer(Box::new(TraceRenderer::with_default_attributes()), &meshes)
            .unwrap_err();
        assert!(matches!(err, SceneError::InvalidStructure(_)));
    }

    #[test]
    fn light_slots_restart_every_pass() {
        let (mut graph, meshes) = graph_with_lights();
        let renderer = TraceRenderer::with_default_attributes();
        let log = renderer.log_handle();
        graph.set_renderer(Box::new(renderer), &meshes).unwrap();

        let mut stack = MatrixStack::new();
        graph.light_pass(&mut stack).unwrap();
        let mut stack = MatrixStack::new();
        graph.light_pass(&mut stack).unwrap();

        let log = log.borrow();
        let slots: Vec<u32> = log.lights.iter().map(|upload| upload.slot).collect();
        assert_eq!(slots, vec![0, 1, 2, 0, 1, 2]);
        assert_eq!(log.light_count, Some(3));
    }

    #[test]
    fn draw_forwards_cumulative_transform() {
        let (mut graph, meshes) = graph_with_lights();
        let spin = graph.node("spin").unwrap();
        graph
            .tree_mut()
            .set_transform(spin, translation(0.0, 1.0, 0.0))
            .unwrap();

        let renderer = TraceRenderer::with_default_attributes();
        let log = renderer.log_handle();
        graph.set_renderer(Box::new(renderer), &meshes).unwrap();

        let mut stack = MatrixStack::with_initial(translation(0.0, 0.0, -10.0));
        graph.draw(&mut stack).unwrap();

        let log = log.borrow();
        assert_eq!(log.draws.len(), 1);
        assert_eq!(log.draws[0].mesh, "cube");
        let expected = translation(0.0, 0.0, -10.0) * translation(0.0, 1.0, 0.0);
        assert_relative_eq!(log.draws[0].model_view, expected, epsilon = 1e-6);
    }

    #[test]
    fn animate_then_draw_sequenced_per_frame() {
        let (mut graph, meshes) = graph_with_lights();
        graph.register_animation(
            "bob",
            Box::new(|time, targets| {
                targets.set_animation_transform("spin", translation(0.0, time, 0.0))
            }),
        );
        let renderer = TraceRenderer::with_default_attributes();
        let log = renderer.log_handle();
        graph.set_renderer(Box::new(renderer), &meshes).unwrap();

        graph.animate("bob", 3.0).unwrap();
        let mut stack = MatrixStack::new();
        graph.draw(&mut stack).unwrap();

        let expected = translation(0.0, 3.0, 0.0) * Mat4::identity();
        assert_relative_eq!(log.borrow().draws[0].model_view, expected, epsilon = 1e-6);

        let err = graph.animate("missing", 0.0).unwrap_err();
        assert!(matches!(err, SceneError::MissingResource(_)));
    }

    #[test]
    fn dispose_is_idempotent() {
        let (mut graph, _) = graph_with_lights();
        assert_eq!(graph.tree().len(), 3);
        graph.dispose();
        assert!(graph.tree().is_empty());
        assert!(graph.root().is_none());
        graph.dispose();
        assert!(graph.tree().is_empty());
    }

    #[test]
    fn merge_from_prefixes_and_splices() {
        let mut sub = Scenegraph::new();
        let sub_root = sub.tree_mut().insert_group("hull");
        let sub_leaf = sub.tree_mut().insert_leaf("plate", "plate-mesh");
        sub.tree_mut().add_child(sub_root, sub_leaf).unwrap();
        sub.add_texture("steel", "textures/steel.png").unwrap();
        sub.make_scenegraph(sub_root).unwrap();

        let mut graph = Scenegraph::new();
        let root = graph.tree_mut().insert_group("root");
        let wrapper = graph.tree_mut().insert_group("ship");
        graph.tree_mut().add_child(root, wrapper).unwrap();

        let spliced = graph.merge_from("ship", sub).unwrap();
        graph.tree_mut().add_child(wrapper, spliced).unwrap();
        graph.make_scenegraph(root).unwrap();

        assert!(graph.node("ship-hull").is_some());
        assert!(graph.node("ship-plate").is_some());
        assert!(graph.node("plate").is_none());
        assert_eq!(
            graph.textures().get("steel").map(String::as_str),
            Some("textures/steel.png")
        );
    }
}
