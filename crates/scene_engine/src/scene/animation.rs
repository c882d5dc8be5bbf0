//! Animation hook registry
//!
//! Animation is per-model scripted behavior, not core machinery: a rig ships
//! a named hook that knows which transform nodes to drive and how. The
//! registry keeps the traversal code ignorant of any specific rig: hooks
//! only see `(time, targets)` where [`AnimationTargets`] resolves node names
//! and writes animation transforms.

use crate::foundation::math::Mat4;
use crate::scene::error::SceneError;
use crate::scene::node::{NodeKey, SceneTree};
use std::collections::HashMap;

/// Boxed animation hook: `(time, targets)` pushes matrix updates into the
/// graph and reports lookup failures instead of panicking.
pub type AnimationFn =
    Box<dyn FnMut(f32, &mut AnimationTargets<'_>) -> Result<(), SceneError>>;

/// Node-lookup view handed to animation hooks.
///
/// Resolves names through the graph registry; lookups of unknown names fail
/// with [`SceneError::MissingResource`].
pub struct AnimationTargets<'a> {
    tree: &'a mut SceneTree,
    names: &'a HashMap<String, NodeKey>,
}

impl<'a> AnimationTargets<'a> {
    pub(crate) fn new(tree: &'a mut SceneTree, names: &'a HashMap<String, NodeKey>) -> Self {
        Self { tree, names }
    }

    /// True when a node of this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Write the animation transform of the named transform node.
    pub fn set_animation_transform(&mut self, name: &str, m: Mat4) -> Result<(), SceneError> {
        let key = self
            .names
            .get(name)
            .copied()
            .ok_or_else(|| SceneError::MissingResource(format!("no node named `{name}`")))?;
        self.tree.set_animation_transform(key, m)
    }
}

/// Name-keyed registry of animation hooks.
#[derive(Default)]
pub struct AnimationRegistry {
    hooks: HashMap<String, AnimationFn>,
}

impl AnimationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a hook under `name`.
    pub fn register(&mut self, name: &str, hook: AnimationFn) {
        log::debug!("registered animation hook `{name}`");
        self.hooks.insert(name.to_string(), hook);
    }

    /// True when a hook of this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }

    /// Run the named hook for this frame.
    pub fn run(
        &mut self,
        name: &str,
        time: f32,
        targets: &mut AnimationTargets<'_>,
    ) -> Result<(), SceneError> {
        match self.hooks.get_mut(name) {
            Some(hook) => hook(time, targets),
            None => Err(SceneError::MissingResource(format!(
                "no animation registered under `{name}`"
            ))),
        }
    }
}

impl std::fmt::Debug for AnimationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationRegistry")
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::translation;
    use approx::assert_relative_eq;

    #[test]
    fn hook_drives_named_transform() {
        let mut tree = SceneTree::new();
        let xform = tree.insert_transform("walker-arm");
        let mut names = HashMap::new();
        names.insert("walker-arm".to_string(), xform);

        let mut registry = AnimationRegistry::new();
        registry.register(
            "wave",
            Box::new(|time, targets| {
                targets.set_animation_transform("walker-arm", translation(time, 0.0, 0.0))
            }),
        );

        let mut targets = AnimationTargets::new(&mut tree, &names);
        registry.run("wave", 2.0, &mut targets).unwrap();
        assert_relative_eq!(
            tree.animation_transform(xform).unwrap(),
            translation(2.0, 0.0, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn unknown_hook_and_unknown_node_are_missing_resources() {
        let mut tree = SceneTree::new();
        let names = HashMap::new();
        let mut registry = AnimationRegistry::new();

        let mut targets = AnimationTargets::new(&mut tree, &names);
        let err = registry.run("nope", 0.0, &mut targets).unwrap_err();
        assert!(matches!(err, SceneError::MissingResource(_)));

        registry.register(
            "broken",
            Box::new(|_, targets| {
                targets.set_animation_transform("ghost", Mat4::identity())
            }),
        );
        let mut targets = AnimationTargets::new(&mut tree, &names);
        let err = registry.run("broken", 0.0, &mut targets).unwrap_err();
        assert!(matches!(err, SceneError::MissingResource(_)));
    }
}
