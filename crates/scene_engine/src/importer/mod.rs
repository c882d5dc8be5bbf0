//! Scene description importer
//!
//! Parses the nested-element scene description into a [`SceneInfo`]: the
//! assembled [`Scenegraph`](crate::scene::Scenegraph) plus the mesh table its
//! leaves reference. Lexing lives in [`lexer`], tree construction in the
//! builder; mesh file formats stay external behind [`MeshProvider`].
//!
//! Supported elements: `scene`, `group` (`name`, `copyof`, `from`),
//! `transform` (`name`), `object` (`name`, `instanceof`, `texture`),
//! `instance` (`name`, `path`, with an implicit `.obj` suffix), `image`
//! (`name`, `path`), `light`, `material`, and the numeric value tags
//! `scale` `rotate` `translate` `ambient` `diffuse` `specular` `position`
//! `direction` `spotdirection` `spotangle` `color` `emissive` `shininess`
//! `absorption` `reflection` `transparency` `refractive` `set`.

pub mod lexer;

mod builder;

use crate::render::PolygonMesh;
use crate::scene::{SceneError, SceneInfo};
use builder::SceneBuilder;
use lexer::{MarkupEvent, MarkupLexer};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while importing a scene description.
#[derive(Debug, Error)]
pub enum ImportError {
    /// A scene description or included file could not be read.
    #[error("could not read scene description `{path}`: {source}")]
    Io {
        /// The offending path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document violates the format: bad markup, wrong value arity,
    /// unparseable numbers, unknown `copyof` targets.
    #[error("malformed scene description: {0}")]
    Malformed(String),

    /// The mesh provider could not resolve a referenced mesh path.
    #[error("unresolved mesh `{0}`")]
    UnknownMesh(String),

    /// Tree construction failed (capability mismatch, duplicate root, ...).
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Source of mesh geometry for `instance` elements.
///
/// Mesh file parsing (OBJ and friends) is deliberately outside this crate;
/// the importer only resolves paths through this trait.
pub trait MeshProvider {
    /// Load the mesh stored at `path` (the implicit `.obj` suffix has
    /// already been applied).
    fn load_mesh(&mut self, path: &Path) -> Result<PolygonMesh, ImportError>;
}

/// In-memory [`MeshProvider`]: meshes are registered up front (procedural
/// geometry or pre-loaded files) under the paths scene descriptions use.
///
/// Lookup tries the full resolved path first, then the bare file name, so a
/// library registered with `"box.obj"` satisfies `path="models/box"`.
#[derive(Debug, Default)]
pub struct MeshLibrary {
    meshes: HashMap<String, PolygonMesh>,
}

impl MeshLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mesh under a path or file name.
    pub fn register(&mut self, path: &str, mesh: PolygonMesh) {
        self.meshes.insert(path.to_string(), mesh);
    }
}

impl MeshProvider for MeshLibrary {
    fn load_mesh(&mut self, path: &Path) -> Result<PolygonMesh, ImportError> {
        let full = path.to_string_lossy();
        if let Some(mesh) = self.meshes.get(full.as_ref()) {
            return Ok(mesh.clone());
        }
        if let Some(mesh) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| self.meshes.get(n))
        {
            return Ok(mesh.clone());
        }
        Err(ImportError::UnknownMesh(full.into_owned()))
    }
}

/// Entry points for importing scene descriptions.
pub struct SceneReader;

impl SceneReader {
    /// Import a scene description file. Relative `from` includes and
    /// `instance` paths resolve against the file's directory.
    pub fn import_file(
        path: impl AsRef<Path>,
        provider: &mut dyn MeshProvider,
    ) -> Result<SceneInfo, ImportError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ImportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or(Path::new("."));
        log::info!("importing scene description `{}`", path.display());
        import_with_base(&source, base_dir, provider)
    }

    /// Import a scene description from a string; relative paths resolve
    /// against the current directory.
    pub fn import_source(
        source: &str,
        provider: &mut dyn MeshProvider,
    ) -> Result<SceneInfo, ImportError> {
        import_with_base(source, Path::new("."), provider)
    }
}

fn at_line(err: ImportError, line: usize) -> ImportError {
    match err {
        ImportError::Malformed(msg) if !msg.starts_with("line ") => {
            ImportError::Malformed(format!("line {line}: {msg}"))
        }
        other => other,
    }
}

pub(crate) fn import_with_base(
    source: &str,
    base_dir: &Path,
    provider: &mut dyn MeshProvider,
) -> Result<SceneInfo, ImportError> {
    let mut lexer = MarkupLexer::new(source);
    let mut builder = SceneBuilder::new(base_dir, provider);
    while let Some(event) = lexer.next_event()? {
        let line = lexer.line();
        match event {
            MarkupEvent::Start { name, attrs } => builder
                .handle_start(&name, &attrs)
                .map_err(|e| at_line(e, line))?,
            MarkupEvent::End { name } => {
                builder.handle_end(&name).map_err(|e| at_line(e, line))?;
            }
            MarkupEvent::Text(text) => {
                builder.handle_text(&text).map_err(|e| at_line(e, line))?;
            }
        }
    }
    builder.finish()
}
