//! Renderer bridge abstraction
//!
//! The scene graph never talks to a graphics API directly; it drives
//! rendering through [`RendererBridge`]. A GPU-backed implementation uploads
//! buffers and uniforms; the in-crate [`TraceRenderer`](crate::render::TraceRenderer)
//! records the same calls for headless runs and tests. Either way the graph's
//! side of the contract is identical: register meshes and textures up front,
//! then push lights and draw calls every frame.

use crate::foundation::math::Mat4;
use crate::render::mesh::PolygonMesh;
use crate::scene::light::Light;
use crate::scene::material::Material;
use thiserror::Error;

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, RenderError>;

/// Errors raised by a renderer bridge.
#[derive(Debug, Error)]
pub enum RenderError {
    /// `add_mesh` was called before shader-variable locations were bound.
    #[error("shader variables are not bound; bind them before adding meshes")]
    ShaderVarsUnbound,

    /// A mesh lacks a vertex attribute the bound shader requires.
    #[error("mesh `{mesh}` does not have vertex attribute `{attribute}`")]
    MissingAttribute {
        /// Name the mesh was registered under.
        mesh: String,
        /// The missing attribute.
        attribute: String,
    },

    /// `draw_mesh` referenced a mesh that was never registered.
    #[error("no mesh registered under `{0}`")]
    UnknownMesh(String),

    /// `draw_mesh` referenced a texture that was never registered.
    #[error("no texture registered under `{0}`")]
    UnknownTexture(String),

    /// A shader variable required for an upload does not exist.
    #[error("no shader variable named `{0}`")]
    UnknownShaderVariable(String),
}

/// The rendering contract the scene graph calls into.
///
/// Implementations are synchronous and single-threaded from the graph's
/// perspective: a call returns once the backend has accepted the work.
pub trait RendererBridge {
    /// Register geometry under `name` for later [`RendererBridge::draw_mesh`]
    /// calls.
    ///
    /// Fails with [`RenderError::ShaderVarsUnbound`] before shader-variable
    /// locations are established, and with [`RenderError::MissingAttribute`]
    /// when the mesh lacks an attribute the shader consumes. Empty meshes are
    /// skipped, not errors.
    fn add_mesh(&mut self, name: &str, mesh: &PolygonMesh) -> BridgeResult<()>;

    /// Register a texture name with its image path.
    fn add_texture(&mut self, name: &str, path: &str) -> BridgeResult<()>;

    /// Rasterize one instance of the named mesh.
    ///
    /// `model_view` is the cumulative transform from the traversal root to
    /// the leaf. Unresolvable mesh or texture names are hard errors at this
    /// point of use.
    fn draw_mesh(
        &mut self,
        name: &str,
        material: &Material,
        texture_name: &str,
        model_view: &Mat4,
    ) -> BridgeResult<()>;

    /// Upload one light to a numbered shader slot.
    ///
    /// The light is already transformed into the traversal frame; slots are
    /// handed out sequentially from zero within one lighting pass.
    fn set_light(&mut self, slot: u32, light: &Light) -> BridgeResult<()>;

    /// Upload the number of active lights after a lighting pass.
    fn set_light_count(&mut self, count: u32) -> BridgeResult<()>;
}
