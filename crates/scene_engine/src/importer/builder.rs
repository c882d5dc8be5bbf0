//! Tree construction from markup events
//!
//! The builder keeps the current parent on an explicit node stack and commits
//! buffered numeric character data when value tags close: transform
//! primitives accumulate by right-multiplication into a pending matrix
//! (committed on `</set>`), and the pending material/light are committed on
//! their own closing tags, with a flag routing the color tags the two share.

use crate::foundation::math::{rotation_deg, scaling, translation, Mat4, Vec3};
use crate::importer::{import_with_base, ImportError, MeshProvider};
use crate::render::PolygonMesh;
use crate::scene::{Light, Material, NodeKey, SceneInfo, Scenegraph};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name given to the implicit group created for the `<scene>` element.
pub(crate) const SCENE_ROOT: &str = "scene-root";

fn attr<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

pub(crate) struct SceneBuilder<'p> {
    provider: &'p mut dyn MeshProvider,
    base_dir: PathBuf,
    graph: Scenegraph,
    meshes: HashMap<String, PolygonMesh>,
    /// Current parent chain; top is the node new children attach to.
    node_stack: Vec<NodeKey>,
    /// Open element names, for nesting validation.
    open: Vec<String>,
    /// Completed named subtrees available as `copyof` targets.
    subgraphs: HashMap<String, NodeKey>,
    pending_transform: Mat4,
    pending_material: Material,
    pending_light: Light,
    /// Routes the color tags shared between `<light>` and `<material>`.
    in_light: bool,
    /// Buffered numeric character data, consumed by closing value tags.
    data: Vec<f32>,
}

impl<'p> SceneBuilder<'p> {
    pub fn new(base_dir: &Path, provider: &'p mut dyn MeshProvider) -> Self {
        Self {
            provider,
            base_dir: base_dir.to_path_buf(),
            graph: Scenegraph::new(),
            meshes: HashMap::new(),
            node_stack: Vec::new(),
            open: Vec::new(),
            subgraphs: HashMap::new(),
            pending_transform: Mat4::identity(),
            pending_material: Material::default(),
            pending_light: Light::new(),
            in_light: false,
            data: Vec::new(),
        }
    }

    fn current(&self) -> Result<NodeKey, ImportError> {
        self.node_stack
            .last()
            .copied()
            .ok_or_else(|| ImportError::Malformed("element outside of <scene>".to_string()))
    }

    /// Attach `node` under the current parent and make it the new parent.
    fn push_node(&mut self, node: NodeKey) -> Result<(), ImportError> {
        let parent = self.current()?;
        self.graph.tree_mut().add_child(parent, node)?;
        self.node_stack.push(node);
        self.record_subgraph(node)?;
        Ok(())
    }

    fn record_subgraph(&mut self, node: NodeKey) -> Result<(), ImportError> {
        let name = self.graph.tree().node(node)?.name().to_string();
        self.subgraphs.insert(name, node);
        Ok(())
    }

    fn take_data(&mut self, tag: &str, arity: usize) -> Result<Vec<f32>, ImportError> {
        if self.data.len() != arity {
            return Err(ImportError::Malformed(format!(
                "`{tag}` expects {arity} values, got {}",
                self.data.len()
            )));
        }
        Ok(std::mem::take(&mut self.data))
    }

    pub fn handle_text(&mut self, text: &str) -> Result<(), ImportError> {
        for token in text.split_whitespace() {
            let value: f32 = token.parse().map_err(|_| {
                ImportError::Malformed(format!("invalid number `{token}`"))
            })?;
            self.data.push(value);
        }
        Ok(())
    }

    pub fn handle_start(
        &mut self,
        name: &str,
        attrs: &[(String, String)],
    ) -> Result<(), ImportError> {
        self.open.push(name.to_string());
        match name {
            "scene" => {
                let root = self.graph.tree_mut().insert_group(SCENE_ROOT);
                self.node_stack.push(root);
                self.record_subgraph(root)?;
            }
            "group" => self.start_group(attrs)?,
            "transform" => {
                let node_name = attr(attrs, "name").unwrap_or_default();
                let node = self.graph.tree_mut().insert_transform(node_name);
                self.push_node(node)?;
            }
            "object" => self.start_object(attrs)?,
            "instance" => self.start_instance(attrs)?,
            "image" => {
                let image_name = attr(attrs, "name").unwrap_or_default();
                let path = attr(attrs, "path").unwrap_or_default();
                if !image_name.is_empty() && !path.is_empty() {
                    self.graph.add_texture(image_name, path)?;
                }
            }
            "light" => {
                self.in_light = true;
            }
            "material" => {
                self.in_light = false;
            }
            _ => {}
        }
        Ok(())
    }

    fn start_group(&mut self, attrs: &[(String, String)]) -> Result<(), ImportError> {
        let group_name = attr(attrs, "name").unwrap_or_default();
        let copyof = attr(attrs, "copyof").unwrap_or_default();
        let fromfile = attr(attrs, "from").unwrap_or_default();

        let node = if !copyof.is_empty() {
            let target = self.subgraphs.get(copyof).copied().ok_or_else(|| {
                ImportError::Malformed(format!("unknown copyof target `{copyof}`"))
            })?;
            let copy = self.graph.tree_mut().clone_subtree(target)?;
            self.graph.tree_mut().set_name(copy, group_name)?;
            copy
        } else if !fromfile.is_empty() {
            self.include_file(group_name, fromfile)?
        } else {
            self.graph.tree_mut().insert_group(group_name)
        };
        self.push_node(node)
    }

    /// Import another complete description and splice it in: meshes merge
    /// into this document's table, every imported node name is prefixed with
    /// the group name, and the imported root becomes the child of a fresh
    /// group.
    fn include_file(&mut self, group_name: &str, fromfile: &str) -> Result<NodeKey, ImportError> {
        let file = self.base_dir.join(fromfile);
        let source = fs::read_to_string(&file).map_err(|source| ImportError::Io {
            path: file.display().to_string(),
            source,
        })?;
        let sub_base = file.parent().unwrap_or(Path::new(".")).to_path_buf();
        let sub_info = import_with_base(&source, &sub_base, &mut *self.provider).map_err(|e| {
            ImportError::Malformed(format!("in included file `{}`: {e}", file.display()))
        })?;
        log::debug!(
            "included `{}` under prefix `{group_name}` ({} meshes)",
            file.display(),
            sub_info.meshes.len()
        );
        self.meshes.extend(sub_info.meshes);
        let merged_root = self.graph.merge_from(group_name, sub_info.scenegraph)?;
        let group = self.graph.tree_mut().insert_group(group_name);
        self.graph.tree_mut().add_child(group, merged_root)?;
        Ok(group)
    }

    fn start_object(&mut self, attrs: &[(String, String)]) -> Result<(), ImportError> {
        let node_name = attr(attrs, "name").unwrap_or_default();
        // empty instanceof builds a light-only leaf with no geometry
        let instanceof = attr(attrs, "instanceof").unwrap_or_default();
        let node = self.graph.tree_mut().insert_leaf(node_name, instanceof);
        if let Some(texture) = attr(attrs, "texture") {
            if !texture.is_empty() {
                self.graph.tree_mut().set_texture_name(node, texture)?;
            }
        }
        self.push_node(node)
    }

    fn start_instance(&mut self, attrs: &[(String, String)]) -> Result<(), ImportError> {
        let mesh_name = attr(attrs, "name").unwrap_or_default();
        let path = attr(attrs, "path").unwrap_or_default();
        if mesh_name.is_empty() || path.is_empty() {
            return Ok(());
        }
        let mut path = path.to_string();
        if !path.ends_with(".obj") {
            path.push_str(".obj");
        }
        let resolved = self.base_dir.join(&path);
        let mesh = self.provider.load_mesh(&resolved)?;
        log::debug!(
            "instance `{mesh_name}` <- `{}` ({} vertices)",
            resolved.display(),
            mesh.vertex_count()
        );
        self.meshes.insert(mesh_name.to_string(), mesh);
        Ok(())
    }

    pub fn handle_end(&mut self, name: &str) -> Result<(), ImportError> {
        match self.open.pop() {
            None => {
                return Err(ImportError::Malformed(format!(
                    "unexpected closing tag `</{name}>`"
                )))
            }
            Some(expected) if expected != name => {
                return Err(ImportError::Malformed(format!(
                    "mismatched closing tag `</{name}>`, expected `</{expected}>`"
                )))
            }
            Some(_) => {}
        }

        match name {
            "scene" => {
                let root = self.pop_node(name)?;
                if self.node_stack.is_empty() {
                    self.graph.make_scenegraph(root)?;
                }
            }
            "group" | "transform" | "object" => {
                self.pop_node(name)?;
            }
            "set" => {
                let node = self.current()?;
                self.graph
                    .tree_mut()
                    .set_transform(node, self.pending_transform)?;
                self.pending_transform = Mat4::identity();
            }
            "scale" => {
                let d = self.take_data(name, 3)?;
                self.pending_transform *= scaling(d[0], d[1], d[2]);
            }
            "rotate" => {
                let d = self.take_data(name, 4)?;
                self.pending_transform *= rotation_deg(d[0], Vec3::new(d[1], d[2], d[3]));
            }
            "translate" => {
                let d = self.take_data(name, 3)?;
                self.pending_transform *= translation(d[0], d[1], d[2]);
            }
            "light" => {
                let node = self.current()?;
                let light = std::mem::take(&mut self.pending_light);
                self.graph.tree_mut().add_light(node, light)?;
                self.in_light = false;
            }
            "material" => {
                let node = self.current()?;
                let material = std::mem::replace(&mut self.pending_material, Material::default());
                self.graph.tree_mut().set_material(node, material)?;
            }
            "ambient" => {
                let d = self.take_data(name, 3)?;
                if self.in_light {
                    self.pending_light.set_ambient(d[0], d[1], d[2]);
                } else {
                    self.pending_material.set_ambient(d[0], d[1], d[2]);
                }
            }
            "diffuse" => {
                let d = self.take_data(name, 3)?;
                if self.in_light {
                    self.pending_light.set_diffuse(d[0], d[1], d[2]);
                } else {
                    self.pending_material.set_diffuse(d[0], d[1], d[2]);
                }
            }
            "specular" => {
                let d = self.take_data(name, 3)?;
                if self.in_light {
                    self.pending_light.set_specular(d[0], d[1], d[2]);
                } else {
                    self.pending_material.set_specular(d[0], d[1], d[2]);
                }
            }
            "position" => {
                let d = self.take_data(name, 3)?;
                self.pending_light.set_position(d[0], d[1], d[2]);
            }
            "direction" => {
                let d = self.take_data(name, 3)?;
                self.pending_light.set_direction(d[0], d[1], d[2]);
            }
            "spotdirection" => {
                let d = self.take_data(name, 3)?;
                self.pending_light.set_spot_direction(d[0], d[1], d[2]);
            }
            "spotangle" => {
                let d = self.take_data(name, 1)?;
                self.pending_light.set_spot_angle(d[0]);
            }
            "color" => {
                // shorthand: flat-colored, self-lit material
                let d = self.take_data(name, 3)?;
                self.pending_material.set_ambient(d[0], d[1], d[2]);
                self.pending_material.set_emission(d[0], d[1], d[2]);
                self.pending_material.set_diffuse(d[0], d[1], d[2]);
                self.pending_material.set_specular(d[0], d[1], d[2]);
                self.pending_material.set_shininess(1.0);
            }
            "emissive" => {
                let d = self.take_data(name, 3)?;
                self.pending_material.set_emission(d[0], d[1], d[2]);
            }
            "shininess" => {
                let d = self.take_data(name, 1)?;
                self.pending_material.set_shininess(d[0]);
            }
            "absorption" => {
                let d = self.take_data(name, 1)?;
                self.pending_material.set_absorption(d[0]);
            }
            "reflection" => {
                let d = self.take_data(name, 1)?;
                self.pending_material.set_reflection(d[0]);
            }
            "transparency" => {
                let d = self.take_data(name, 1)?;
                self.pending_material.set_transparency(d[0]);
            }
            "refractive" => {
                let d = self.take_data(name, 1)?;
                self.pending_material.set_refractive_index(d[0]);
            }
            _ => {}
        }
        Ok(())
    }

    fn pop_node(&mut self, tag: &str) -> Result<NodeKey, ImportError> {
        self.node_stack.pop().ok_or_else(|| {
            ImportError::Malformed(format!("closing tag `</{tag}>` with no open node"))
        })
    }

    pub fn finish(self) -> Result<SceneInfo, ImportError> {
        if let Some(unclosed) = self.open.last() {
            return Err(ImportError::Malformed(format!(
                "unclosed element `<{unclosed}>`"
            )));
        }
        if self.graph.root().is_none() {
            return Err(ImportError::Malformed(
                "missing <scene> root element".to_string(),
            ));
        }
        Ok(SceneInfo {
            scenegraph: self.graph,
            meshes: self.meshes,
        })
    }
}
