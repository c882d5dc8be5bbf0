//! Headless renderer bridge
//!
//! [`TraceRenderer`] enforces the full [`RendererBridge`] contract without a
//! GPU: it validates mesh attributes against the bound shader variables,
//! resolves mesh/texture names at draw time, logs every call, and records the
//! stream of draw calls and light uploads so tests and tooling can inspect
//! exactly what a traversal produced.

use crate::foundation::math::Mat4;
use crate::render::bridge::{BridgeResult, RenderError, RendererBridge};
use crate::render::mesh::PolygonMesh;
use crate::scene::light::Light;
use crate::scene::material::Material;
use crate::scene::node::WHITE_TEXTURE;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One recorded `draw_mesh` call.
#[derive(Debug, Clone)]
pub struct DrawCall {
    /// Mesh name.
    pub mesh: String,
    /// Material at the leaf.
    pub material: Material,
    /// Texture name at the leaf.
    pub texture: String,
    /// Cumulative modelview transform.
    pub model_view: Mat4,
}

/// One recorded `set_light` call.
#[derive(Debug, Clone)]
pub struct LightUpload {
    /// Assigned shader slot.
    pub slot: u32,
    /// The uploaded (already transformed) light.
    pub light: Light,
}

/// Everything a [`TraceRenderer`] has recorded.
#[derive(Debug, Default)]
pub struct TraceLog {
    /// Draw calls in submission order.
    pub draws: Vec<DrawCall>,
    /// Light uploads in slot-assignment order.
    pub lights: Vec<LightUpload>,
    /// Last uploaded light count, if any pass completed.
    pub light_count: Option<u32>,
}

/// Recording implementation of [`RendererBridge`].
///
/// The record lives behind a shared handle ([`TraceRenderer::log_handle`])
/// so it stays observable after the renderer is boxed and handed to a
/// `Scenegraph`. Single-threaded by design, like the frame loop itself.
pub struct TraceRenderer {
    shader_vars: Option<Vec<String>>,
    meshes: HashMap<String, PolygonMesh>,
    textures: HashMap<String, String>,
    log: Rc<RefCell<TraceLog>>,
}

impl TraceRenderer {
    /// Create a renderer with no shader variables bound yet; `add_mesh`
    /// fails until [`TraceRenderer::bind_shader_attributes`] is called.
    pub fn new() -> Self {
        let mut textures = HashMap::new();
        // the sentinel texture every unspecified leaf falls back to
        textures.insert(WHITE_TEXTURE.to_string(), String::from("builtin:white"));
        Self {
            shader_vars: None,
            meshes: HashMap::new(),
            textures,
            log: Rc::new(RefCell::new(TraceLog::default())),
        }
    }

    /// Create a renderer with the standard attribute set
    /// (`position`/`normal`/`texcoord`) already bound.
    pub fn with_default_attributes() -> Self {
        let mut renderer = Self::new();
        renderer.bind_shader_attributes(&["position", "normal", "texcoord"]);
        renderer
    }

    /// Establish the vertex attributes the "shader" consumes. Meshes added
    /// afterwards must carry all of them.
    pub fn bind_shader_attributes(&mut self, attributes: &[&str]) {
        self.shader_vars = Some(attributes.iter().map(|a| (*a).to_string()).collect());
    }

    /// Shared handle to the recorded call stream.
    pub fn log_handle(&self) -> Rc<RefCell<TraceLog>> {
        Rc::clone(&self.log)
    }

    /// Names of all registered meshes.
    pub fn mesh_names(&self) -> Vec<String> {
        self.meshes.keys().cloned().collect()
    }
}

impl Default for TraceRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RendererBridge for TraceRenderer {
    fn add_mesh(&mut self, name: &str, mesh: &PolygonMesh) -> BridgeResult<()> {
        let Some(vars) = &self.shader_vars else {
            return Err(RenderError::ShaderVarsUnbound);
        };
        if mesh.vertex_count() == 0 {
            log::warn!("mesh `{name}` is empty; skipping registration");
            return Ok(());
        }
        for var in vars {
            if !mesh.has_attribute(var) {
                return Err(RenderError::MissingAttribute {
                    mesh: name.to_string(),
                    attribute: var.clone(),
                });
            }
        }
        log::debug!(
            "registered mesh `{name}`: {} vertices, {} primitives",
            mesh.vertex_count(),
            mesh.primitive_count()
        );
        self.meshes.insert(name.to_string(), mesh.clone());
        Ok(())
    }

    fn add_texture(&mut self, name: &str, path: &str) -> BridgeResult<()> {
        log::debug!("registered texture `{name}` -> {path}");
        self.textures.insert(name.to_string(), path.to_string());
        Ok(())
    }

    fn draw_mesh(
        &mut self,
        name: &str,
        material: &Material,
        texture_name: &str,
        model_view: &Mat4,
    ) -> BridgeResult<()> {
        if !self.meshes.contains_key(name) {
            return Err(RenderError::UnknownMesh(name.to_string()));
        }
        if !self.textures.contains_key(texture_name) {
            return Err(RenderError::UnknownTexture(texture_name.to_string()));
        }
        log::trace!("draw `{name}` with texture `{texture_name}`");
        self.log.borrow_mut().draws.push(DrawCall {
            mesh: name.to_string(),
            material: material.clone(),
            texture: texture_name.to_string(),
            model_view: *model_view,
        });
        Ok(())
    }

    fn set_light(&mut self, slot: u32, light: &Light) -> BridgeResult<()> {
        log::trace!(
            "light slot {slot}: position {:?}, cutoff {}",
            light.position(),
            light.effective_cutoff()
        );
        self.log.borrow_mut().lights.push(LightUpload {
            slot,
            light: light.clone(),
        });
        Ok(())
    }

    fn set_light_count(&mut self, count: u32) -> BridgeResult<()> {
        log::trace!("light count {count}");
        self.log.borrow_mut().light_count = Some(count);
        Ok(())
    }
}
