//! Scene-graph error types

use crate::render::RenderError;
use thiserror::Error;

/// Errors raised by scene-graph construction, mutation, and traversal.
#[derive(Debug, Error)]
pub enum SceneError {
    /// A node was asked for a capability its kind does not offer (adding a
    /// child to a leaf, setting a transform on a group, ...), or an operation
    /// would break the tree shape.
    #[error("invalid structure: {0}")]
    InvalidStructure(String),

    /// A node, animation, mesh, or texture name could not be resolved at the
    /// point of use.
    #[error("missing resource: {0}")]
    MissingResource(String),

    /// The rendering backend rejected an operation.
    #[error(transparent)]
    Render(#[from] RenderError),
}
