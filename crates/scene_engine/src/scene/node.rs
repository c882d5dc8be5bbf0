//! Scene-graph nodes and the tree arena
//!
//! Nodes come in three kinds: groups (any number of children), transforms
//! (exactly one child plus a static and an animation matrix), and leaves
//! (a mesh instance reference with a material and texture name). Every kind
//! may carry lights.
//!
//! Nodes live in a [`SceneTree`] arena; [`NodeKey`]s are non-owning handles,
//! so parent back-references can never keep a subtree alive or form a cycle
//! of ownership. Operations a node kind does not support return
//! [`SceneError::InvalidStructure`] instead of panicking.

use crate::foundation::math::{Mat4, MatrixStack};
use crate::render::RendererBridge;
use crate::scene::error::SceneError;
use crate::scene::light::{Light, LightSlots};
use crate::scene::material::Material;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Non-owning handle to a node stored in a [`SceneTree`].
    pub struct NodeKey;
}

/// Default texture name used by leaves that do not name one.
pub const WHITE_TEXTURE: &str = "white";

/// Kind-specific node payload.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Logical grouping of any number of children; insertion order is
    /// traversal (and therefore draw) order.
    Group {
        /// Child handles in traversal order.
        children: Vec<NodeKey>,
    },
    /// A change of coordinate system applied to exactly one child.
    Transform {
        /// Authoring-time matrix, set once from the scene description.
        transform: Mat4,
        /// Per-frame matrix, identity until an animation hook writes it.
        animation: Mat4,
        /// The single child, if attached yet.
        child: Option<NodeKey>,
    },
    /// Geometry reference: the only kind that actually draws.
    Leaf {
        /// Key into the mesh registry; empty means a light-only node.
        instance_name: String,
        /// Surface material, copied by value.
        material: Material,
        /// Key into the texture registry; defaults to [`WHITE_TEXTURE`].
        texture_name: String,
    },
}

/// One node of the scene graph.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    parent: Option<NodeKey>,
    lights: Vec<Light>,
    kind: NodeKind,
}

impl Node {
    /// Node name; expected (but not forced) to be unique within one graph.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent handle; `None` for a root or a detached node.
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Lights attached at this node, in attachment order.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Kind-specific payload.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }
}

/// Arena owning every node of a graph.
///
/// All structural mutation goes through the tree so parent back-references
/// and the one-child transform rule stay consistent.
#[derive(Debug, Default)]
pub struct SceneTree {
    nodes: SlotMap<NodeKey, Node>,
}

impl SceneTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a detached group node.
    pub fn insert_group(&mut self, name: &str) -> NodeKey {
        self.insert(name, NodeKind::Group { children: Vec::new() })
    }

    /// Allocate a detached transform node with identity matrices.
    pub fn insert_transform(&mut self, name: &str) -> NodeKey {
        self.insert(
            name,
            NodeKind::Transform {
                transform: Mat4::identity(),
                animation: Mat4::identity(),
                child: None,
            },
        )
    }

    /// Allocate a detached leaf node with a default material and the white
    /// texture. An empty `instance_name` makes a light-only leaf.
    pub fn insert_leaf(&mut self, name: &str, instance_name: &str) -> NodeKey {
        self.insert(
            name,
            NodeKind::Leaf {
                instance_name: instance_name.to_string(),
                material: Material::default(),
                texture_name: WHITE_TEXTURE.to_string(),
            },
        )
    }

    fn insert(&mut self, name: &str, kind: NodeKind) -> NodeKey {
        self.nodes.insert(Node {
            name: name.to_string(),
            parent: None,
            lights: Vec::new(),
            kind,
        })
    }

    /// Resolve a handle, failing with [`SceneError::MissingResource`] when it
    /// is stale.
    pub fn node(&self, key: NodeKey) -> Result<&Node, SceneError> {
        self.nodes
            .get(key)
            .ok_or_else(|| SceneError::MissingResource("stale node handle".to_string()))
    }

    fn node_mut(&mut self, key: NodeKey) -> Result<&mut Node, SceneError> {
        self.nodes
            .get_mut(key)
            .ok_or_else(|| SceneError::MissingResource("stale node handle".to_string()))
    }

    /// Rename a node. Registry entries are not updated here; names are
    /// (re)registered when the graph adopts a root.
    pub fn set_name(&mut self, key: NodeKey, name: &str) -> Result<(), SceneError> {
        self.node_mut(key)?.name = name.to_string();
        Ok(())
    }

    /// Attach `child` under `parent`.
    ///
    /// Groups accept any number of children; transforms exactly one (a second
    /// attach is `InvalidStructure`); leaves none. A node that already has a
    /// parent is rejected, keeping the graph a tree rather than a DAG.
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), SceneError> {
        let child_node = self.node(child)?;
        if child_node.parent.is_some() {
            return Err(SceneError::InvalidStructure(format!(
                "`{}` already has a parent",
                child_node.name
            )));
        }
        let parent_node = self.node(parent)?;
        let parent_name = parent_node.name.clone();
        match &mut self.node_mut(parent)?.kind {
            NodeKind::Group { children } => children.push(child),
            NodeKind::Transform { child: slot, .. } => {
                if slot.is_some() {
                    return Err(SceneError::InvalidStructure(format!(
                        "transform node `{parent_name}` already has a child"
                    )));
                }
                *slot = Some(child);
            }
            NodeKind::Leaf { .. } => {
                return Err(SceneError::InvalidStructure(format!(
                    "`{parent_name}` is not a composite node"
                )))
            }
        }
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Set the static transform; transform nodes only.
    pub fn set_transform(&mut self, key: NodeKey, m: Mat4) -> Result<(), SceneError> {
        let node = self.node_mut(key)?;
        match &mut node.kind {
            NodeKind::Transform { transform, .. } => {
                *transform = m;
                Ok(())
            }
            _ => Err(SceneError::InvalidStructure(format!(
                "`{}` is not a transform node",
                node.name
            ))),
        }
    }

    /// Set the per-frame animation transform; transform nodes only.
    pub fn set_animation_transform(&mut self, key: NodeKey, m: Mat4) -> Result<(), SceneError> {
        let node = self.node_mut(key)?;
        match &mut node.kind {
            NodeKind::Transform { animation, .. } => {
                *animation = m;
                Ok(())
            }
            _ => Err(SceneError::InvalidStructure(format!(
                "`{}` is not a transform node",
                node.name
            ))),
        }
    }

    /// Static transform of a transform node.
    pub fn transform(&self, key: NodeKey) -> Result<Mat4, SceneError> {
        let node = self.node(key)?;
        match &node.kind {
            NodeKind::Transform { transform, .. } => Ok(*transform),
            _ => Err(SceneError::InvalidStructure(format!(
                "`{}` is not a transform node",
                node.name
            ))),
        }
    }

    /// Animation transform of a transform node.
    pub fn animation_transform(&self, key: NodeKey) -> Result<Mat4, SceneError> {
        let node = self.node(key)?;
        match &node.kind {
            NodeKind::Transform { animation, .. } => Ok(*animation),
            _ => Err(SceneError::InvalidStructure(format!(
                "`{}` is not a transform node",
                node.name
            ))),
        }
    }

    /// Set the material; leaf nodes only.
    pub fn set_material(&mut self, key: NodeKey, m: Material) -> Result<(), SceneError> {
        let node = self.node_mut(key)?;
        match &mut node.kind {
            NodeKind::Leaf { material, .. } => {
                *material = m;
                Ok(())
            }
            _ => Err(SceneError::InvalidStructure(format!(
                "`{}` is not a leaf node",
                node.name
            ))),
        }
    }

    /// Set the texture name; leaf nodes only.
    pub fn set_texture_name(&mut self, key: NodeKey, texture: &str) -> Result<(), SceneError> {
        let node = self.node_mut(key)?;
        match &mut node.kind {
            NodeKind::Leaf { texture_name, .. } => {
                *texture_name = texture.to_string();
                Ok(())
            }
            _ => Err(SceneError::InvalidStructure(format!(
                "`{}` is not a leaf node",
                node.name
            ))),
        }
    }

    /// Attach a light to any node; it will be gathered in the coordinate
    /// system this node occupies at traversal time.
    pub fn add_light(&mut self, key: NodeKey, light: Light) -> Result<(), SceneError> {
        self.node_mut(key)?.lights.push(light);
        Ok(())
    }

    /// Pre-order search for the first node named `name` in the subtree rooted
    /// at `from` (the node itself is checked before its children).
    pub fn find(&self, from: NodeKey, name: &str) -> Option<NodeKey> {
        let node = self.nodes.get(from)?;
        if node.name == name {
            return Some(from);
        }
        match &node.kind {
            NodeKind::Group { children } => {
                children.iter().find_map(|&child| self.find(child, name))
            }
            NodeKind::Transform { child, .. } => child.and_then(|c| self.find(c, name)),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Deep-copy the subtree rooted at `key`.
    ///
    /// The copy has fresh handles but identical names, transforms, materials,
    /// and lights; its root is detached (no parent). Attachment failures
    /// during reconstruction are propagated, never discarded.
    pub fn clone_subtree(&mut self, key: NodeKey) -> Result<NodeKey, SceneError> {
        let source = self.node(key)?;
        let name = source.name.clone();
        let lights = source.lights.clone();
        let kind = source.kind.clone();
        match kind {
            NodeKind::Group { children } => {
                let mut copies = Vec::with_capacity(children.len());
                for child in children {
                    copies.push(self.clone_subtree(child)?);
                }
                let group = self.insert(&name, NodeKind::Group { children: Vec::new() });
                self.node_mut(group)?.lights = lights;
                for copy in copies {
                    self.add_child(group, copy)?;
                }
                Ok(group)
            }
            NodeKind::Transform { transform, animation, child } => {
                let copy = match child {
                    Some(c) => Some(self.clone_subtree(c)?),
                    None => None,
                };
                let node = self.insert(
                    &name,
                    NodeKind::Transform {
                        transform,
                        animation,
                        child: None,
                    },
                );
                self.node_mut(node)?.lights = lights;
                if let Some(c) = copy {
                    self.add_child(node, c)?;
                }
                Ok(node)
            }
            NodeKind::Leaf { instance_name, material, texture_name } => {
                let node = self.insert(
                    &name,
                    NodeKind::Leaf {
                        instance_name,
                        material,
                        texture_name,
                    },
                );
                self.node_mut(node)?.lights = lights;
                Ok(node)
            }
        }
    }

    /// Copy the subtree rooted at `from` out of `source` into this arena,
    /// prefixing every copied node name with `"<prefix>-"` (an empty prefix
    /// copies names verbatim). Returns the handle of the copied root, which
    /// is detached and ready to be spliced under a parent here.
    pub fn adopt_subtree(
        &mut self,
        source: &SceneTree,
        from: NodeKey,
        prefix: &str,
    ) -> Result<NodeKey, SceneError> {
        let node = source.node(from)?;
        let name = if prefix.is_empty() {
            node.name.clone()
        } else {
            format!("{prefix}-{}", node.name)
        };
        let lights = node.lights.clone();
        match &node.kind {
            NodeKind::Group { children } => {
                let mut copies = Vec::with_capacity(children.len());
                for &child in children {
                    copies.push(self.adopt_subtree(source, child, prefix)?);
                }
                let group = self.insert(&name, NodeKind::Group { children: Vec::new() });
                self.node_mut(group)?.lights = lights;
                for copy in copies {
                    self.add_child(group, copy)?;
                }
                Ok(group)
            }
            NodeKind::Transform { transform, animation, child } => {
                let copy = match child {
                    Some(c) => Some(self.adopt_subtree(source, *c, prefix)?),
                    None => None,
                };
                let key = self.insert(
                    &name,
                    NodeKind::Transform {
                        transform: *transform,
                        animation: *animation,
                        child: None,
                    },
                );
                self.node_mut(key)?.lights = lights;
                if let Some(c) = copy {
                    self.add_child(key, c)?;
                }
                Ok(key)
            }
            NodeKind::Leaf { instance_name, material, texture_name } => {
                let key = self.insert(
                    &name,
                    NodeKind::Leaf {
                        instance_name: instance_name.clone(),
                        material: material.clone(),
                        texture_name: texture_name.clone(),
                    },
                );
                self.node_mut(key)?.lights = lights;
                Ok(key)
            }
        }
    }

    /// Remove the subtree rooted at `key` from the arena. Stale handles are
    /// ignored, so disposing twice is harmless.
    pub fn remove_subtree(&mut self, key: NodeKey) {
        if let Some(node) = self.nodes.remove(key) {
            match node.kind {
                NodeKind::Group { children } => {
                    for child in children {
                        self.remove_subtree(child);
                    }
                }
                NodeKind::Transform { child, .. } => {
                    if let Some(c) = child {
                        self.remove_subtree(c);
                    }
                }
                NodeKind::Leaf { .. } => {}
            }
        }
    }

    /// Draw traversal.
    ///
    /// Transform nodes duplicate the stack top, right-multiply
    /// `animation * transform` into it, recurse, and pop (also on the error
    /// path). Groups pass the stack through untouched, so siblings share one
    /// frame. Leaves forward the stack top with their material, texture, and
    /// mesh name to the bridge; light-only leaves draw nothing.
    pub fn draw(
        &self,
        key: NodeKey,
        renderer: &mut dyn RendererBridge,
        model_view: &mut MatrixStack,
    ) -> Result<(), SceneError> {
        let node = self.node(key)?;
        match &node.kind {
            NodeKind::Group { children } => {
                for &child in children {
                    self.draw(child, renderer, model_view)?;
                }
                Ok(())
            }
            NodeKind::Transform { transform, animation, child } => {
                model_view.push();
                model_view.apply(&(animation * transform));
                let result = match child {
                    Some(c) => self.draw(*c, renderer, model_view),
                    None => Ok(()),
                };
                model_view.pop();
                result
            }
            NodeKind::Leaf { instance_name, material, texture_name } => {
                if instance_name.is_empty() {
                    return Ok(());
                }
                log::trace!("draw leaf `{}` -> mesh `{instance_name}`", node.name);
                renderer.draw_mesh(instance_name, material, texture_name, model_view.top())?;
                Ok(())
            }
        }
    }

    /// Light-gathering traversal with the same stack discipline as
    /// [`SceneTree::draw`].
    ///
    /// At each node, before recursing, the node's lights are carried into the
    /// current frame and uploaded to sequential slots drawn from `slots`.
    pub fn collect_lights(
        &self,
        key: NodeKey,
        renderer: &mut dyn RendererBridge,
        model_view: &mut MatrixStack,
        slots: &mut LightSlots,
    ) -> Result<(), SceneError> {
        let node = self.node(key)?;
        match &node.kind {
            NodeKind::Group { children } => {
                self.upload_lights(node, renderer, model_view, slots)?;
                for &child in children {
                    self.collect_lights(child, renderer, model_view, slots)?;
                }
                Ok(())
            }
            NodeKind::Transform { transform, animation, child } => {
                model_view.push();
                model_view.apply(&(animation * transform));
                let result = self
                    .upload_lights(node, renderer, model_view, slots)
                    .and_then(|()| match child {
                        Some(c) => self.collect_lights(*c, renderer, model_view, slots),
                        None => Ok(()),
                    });
                model_view.pop();
                result
            }
            NodeKind::Leaf { .. } => self.upload_lights(node, renderer, model_view, slots),
        }
    }

    fn upload_lights(
        &self,
        node: &Node,
        renderer: &mut dyn RendererBridge,
        model_view: &MatrixStack,
        slots: &mut LightSlots,
    ) -> Result<(), SceneError> {
        for light in &node.lights {
            let slot = slots.allocate();
            renderer.set_light(slot, &light.transformed(model_view.top()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{rotation_deg, scaling, translation, Vec3};
    use approx::assert_relative_eq;

    fn small_tree(tree: &mut SceneTree) -> (NodeKey, NodeKey, NodeKey, NodeKey) {
        let root = tree.insert_group("root");
        let xform_a = tree.insert_transform("a");
        let xform_b = tree.insert_transform("b");
        let leaf = tree.insert_leaf("box", "box-mesh");
        tree.add_child(root, xform_a).unwrap();
        tree.add_child(xform_a, xform_b).unwrap();
        tree.add_child(xform_b, leaf).unwrap();
        (root, xform_a, xform_b, leaf)
    }

    #[test]
    fn find_is_preorder_first_match() {
        let mut tree = SceneTree::new();
        let root = tree.insert_group("root");
        let left = tree.insert_group("left");
        let right = tree.insert_group("right");
        let dup_in_left = tree.insert_leaf("dup", "");
        let dup_in_right = tree.insert_leaf("dup", "");
        tree.add_child(root, left).unwrap();
        tree.add_child(root, right).unwrap();
        tree.add_child(left, dup_in_left).unwrap();
        tree.add_child(right, dup_in_right).unwrap();

        assert_eq!(tree.find(root, "root"), Some(root));
        assert_eq!(tree.find(root, "dup"), Some(dup_in_left));
        assert_eq!(tree.find(right, "dup"), Some(dup_in_right));
        assert_eq!(tree.find(root, "nope"), None);
    }

    #[test]
    fn leaf_rejects_children() {
        let mut tree = SceneTree::new();
        let leaf = tree.insert_leaf("leaf", "mesh");
        let other = tree.insert_group("g");
        let err = tree.add_child(leaf, other).unwrap_err();
        assert!(matches!(err, SceneError::InvalidStructure(_)));
    }

    #[test]
    fn transform_accepts_exactly_one_child() {
        let mut tree = SceneTree::new();
        let xform = tree.insert_transform("t");
        let first = tree.insert_group("first");
        let second = tree.insert_group("second");
        tree.add_child(xform, first).unwrap();
        let err = tree.add_child(xform, second).unwrap_err();
        assert!(matches!(err, SceneError::InvalidStructure(msg) if msg.contains("already has a child")));
    }

    #[test]
    fn reparenting_is_rejected() {
        let mut tree = SceneTree::new();
        let a = tree.insert_group("a");
        let b = tree.insert_group("b");
        let child = tree.insert_group("child");
        tree.add_child(a, child).unwrap();
        let err = tree.add_child(b, child).unwrap_err();
        assert!(matches!(err, SceneError::InvalidStructure(_)));
    }

    #[test]
    fn capability_mismatches_fail() {
        let mut tree = SceneTree::new();
        let group = tree.insert_group("g");
        let leaf = tree.insert_leaf("l", "mesh");

        assert!(matches!(
            tree.set_transform(group, Mat4::identity()),
            Err(SceneError::InvalidStructure(_))
        ));
        assert!(matches!(
            tree.set_animation_transform(leaf, Mat4::identity()),
            Err(SceneError::InvalidStructure(_))
        ));
        assert!(matches!(
            tree.set_material(group, Material::default()),
            Err(SceneError::InvalidStructure(_))
        ));
        assert!(matches!(
            tree.set_texture_name(group, "checker"),
            Err(SceneError::InvalidStructure(_))
        ));
    }

    #[test]
    fn every_kind_accepts_lights() {
        let mut tree = SceneTree::new();
        let group = tree.insert_group("g");
        let xform = tree.insert_transform("t");
        let leaf = tree.insert_leaf("l", "");
        for key in [group, xform, leaf] {
            tree.add_light(key, Light::new()).unwrap();
        }
        assert_eq!(tree.node(group).unwrap().lights().len(), 1);
        assert_eq!(tree.node(xform).unwrap().lights().len(), 1);
        assert_eq!(tree.node(leaf).unwrap().lights().len(), 1);
    }

    #[test]
    fn clone_subtree_is_deep_and_independent() {
        let mut tree = SceneTree::new();
        let (root, xform_a, _, _) = small_tree(&mut tree);
        tree.set_transform(xform_a, translation(1.0, 0.0, 0.0)).unwrap();
        let mut mat = Material::new();
        mat.set_diffuse(0.9, 0.1, 0.1);
        let leaf = tree.find(root, "box").unwrap();
        tree.set_material(leaf, mat.clone()).unwrap();

        let copy = tree.clone_subtree(root).unwrap();
        assert_ne!(copy, root);
        // same names, fresh identities
        let copy_a = tree.find(copy, "a").unwrap();
        assert_ne!(copy_a, xform_a);
        assert_relative_eq!(
            tree.transform(copy_a).unwrap(),
            translation(1.0, 0.0, 0.0),
            epsilon = 1e-6
        );

        // mutating the copy's animation transform leaves the original alone
        tree.set_animation_transform(copy_a, rotation_deg(45.0, Vec3::z()))
            .unwrap();
        assert_relative_eq!(
            tree.animation_transform(xform_a).unwrap(),
            Mat4::identity(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn remove_subtree_drops_every_node_once() {
        let mut tree = SceneTree::new();
        let (root, ..) = small_tree(&mut tree);
        assert_eq!(tree.len(), 4);
        tree.remove_subtree(root);
        assert!(tree.is_empty());
        // second removal is a no-op
        tree.remove_subtree(root);
        assert!(tree.is_empty());
    }

    #[test]
    fn adopt_subtree_prefixes_names() {
        let mut source = SceneTree::new();
        let (sub_root, ..) = small_tree(&mut source);

        let mut tree = SceneTree::new();
        let adopted = tree.adopt_subtree(&source, sub_root, "ship").unwrap();
        assert_eq!(tree.node(adopted).unwrap().name(), "ship-root");
        assert!(tree.find(adopted, "ship-box").is_some());
        assert!(tree.find(adopted, "box").is_none());
        // the source is untouched
        assert!(source.find(sub_root, "box").is_some());
    }

    #[test]
    fn draw_composes_animation_before_static() {
        use crate::render::TraceRenderer;

        let mut tree = SceneTree::new();
        let (root, xform_a, xform_b, _) = small_tree(&mut tree);
        tree.set_transform(xform_a, translation(1.0, 0.0, 0.0)).unwrap();
        tree.set_transform(xform_b, scaling(2.0, 2.0, 2.0)).unwrap();

        let mut renderer = TraceRenderer::with_default_attributes();
        renderer
            .add_mesh("box-mesh", &crate::render::PolygonMesh::unit_cube())
            .unwrap();
        let log = renderer.log_handle();

        let mut stack = MatrixStack::new();
        tree.draw(root, &mut renderer, &mut stack).unwrap();

        {
            let draws = &log.borrow().draws;
            assert_eq!(draws.len(), 1);
            let expected = translation(1.0, 0.0, 0.0) * scaling(2.0, 2.0, 2.0);
            assert_relative_eq!(draws[0].model_view, expected, epsilon = 1e-6);
        }

        // with an animation matrix on B: parent * animation * static
        tree.set_animation_transform(xform_b, rotation_deg(90.0, Vec3::z()))
            .unwrap();
        log.borrow_mut().draws.clear();
        let mut stack = MatrixStack::new();
        tree.draw(root, &mut renderer, &mut stack).unwrap();
        let draws = &log.borrow().draws;
        let expected =
            translation(1.0, 0.0, 0.0) * rotation_deg(90.0, Vec3::z()) * scaling(2.0, 2.0, 2.0);
        assert_relative_eq!(draws[0].model_view, expected, epsilon = 1e-5);
    }

    #[test]
    fn light_only_leaf_draws_nothing_but_still_lights() {
        use crate::render::TraceRenderer;

        let mut tree = SceneTree::new();
        let root = tree.insert_group("root");
        let lamp = tree.insert_leaf("lamp", "");
        tree.add_child(root, lamp).unwrap();
        let mut light = Light::new();
        light.set_position(0.0, 5.0, 0.0);
        tree.add_light(lamp, light).unwrap();

        let mut renderer = TraceRenderer::with_default_attributes();
        let log = renderer.log_handle();
        let mut stack = MatrixStack::new();
        tree.draw(root, &mut renderer, &mut stack).unwrap();
        assert!(log.borrow().draws.is_empty());

        let mut stack = MatrixStack::new();
        let mut slots = LightSlots::new();
        tree.collect_lights(root, &mut renderer, &mut stack, &mut slots)
            .unwrap();
        assert_eq!(slots.count(), 1);
        assert_eq!(log.borrow().lights.len(), 1);
    }

    #[test]
    fn lights_gather_in_their_attachment_frame() {
        use crate::render::TraceRenderer;
        use crate::foundation::math::Vec4;

        let mut tree = SceneTree::new();
        let root = tree.insert_group("root");
        let xform = tree.insert_transform("shift");
        let inner = tree.insert_group("inner");
        tree.add_child(root, xform).unwrap();
        tree.add_child(xform, inner).unwrap();
        tree.set_transform(xform, translation(0.0, 0.0, -4.0)).unwrap();

        let mut light = Light::new();
        light.set_position(1.0, 0.0, 0.0);
        tree.add_light(inner, light).unwrap();

        let mut renderer = TraceRenderer::with_default_attributes();
        let log = renderer.log_handle();
        let mut stack = MatrixStack::new();
        let mut slots = LightSlots::new();
        tree.collect_lights(root, &mut renderer, &mut stack, &mut slots)
            .unwrap();

        let uploads = &log.borrow().lights;
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].slot, 0);
        assert_relative_eq!(
            uploads[0].light.position(),
            Vec4::new(1.0, 0.0, -4.0, 1.0),
            epsilon = 1e-6
        );
    }
}
