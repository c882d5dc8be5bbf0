//! # Scene Engine
//!
//! A hierarchical scene-graph renderer core. A scene is a tree of group,
//! transform, and leaf nodes; every frame the graph recomputes cumulative
//! transforms and lighting state along an explicit modelview stack and
//! delegates the actual draw calls to a pluggable rendering backend.
//!
//! ## Features
//!
//! - **Scene graph**: group/transform/leaf nodes in a slotmap arena with
//!   non-owning handles, pre-order name lookup, deep subtree cloning
//! - **Traversals**: draw and light-gathering passes with stack-based
//!   transform composition (`parent * animation * static`)
//! - **Importer**: nested-element scene descriptions with subtree copies
//!   (`copyof`) and prefixed file inclusion (`from`)
//! - **Renderer bridge**: backend abstraction with a recording headless
//!   implementation for tests and tooling
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_engine::prelude::*;
//!
//! # fn main() -> Result<(), scene_engine::scene::SceneError> {
//! let mut graph = Scenegraph::new();
//! let root = graph.tree_mut().insert_group("root");
//! let spin = graph.tree_mut().insert_transform("spin");
//! let body = graph.tree_mut().insert_leaf("body", "cube");
//! graph.tree_mut().add_child(root, spin)?;
//! graph.tree_mut().add_child(spin, body)?;
//! graph.make_scenegraph(root)?;
//!
//! let mut meshes = std::collections::HashMap::new();
//! meshes.insert("cube".to_string(), PolygonMesh::unit_cube());
//!
//! let renderer = TraceRenderer::with_default_attributes();
//! let log = renderer.log_handle();
//! graph.set_renderer(Box::new(renderer), &meshes)?;
//!
//! let mut model_view = MatrixStack::new();
//! graph.light_pass(&mut model_view)?;
//! graph.draw(&mut model_view)?;
//! assert_eq!(log.borrow().draws.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod importer;
pub mod render;
pub mod scene;

/// Common imports for library users
pub mod prelude {
    pub use crate::foundation::math::{Mat4, MatrixStack, Vec3, Vec4};
    pub use crate::importer::{MeshLibrary, MeshProvider, SceneReader};
    pub use crate::render::{PolygonMesh, RendererBridge, TraceRenderer, Vertex};
    pub use crate::scene::{
        Light, LightSlots, Material, NodeKey, NodeKind, SceneError, SceneInfo, SceneTree,
        Scenegraph,
    };
}
