//! Rendering abstraction layer
//!
//! The scene graph's view of rendering: a mesh contract
//! ([`PolygonMesh`]/[`Vertex`]), the [`RendererBridge`] trait the traversals
//! call into, and the headless [`TraceRenderer`] used by tests and tooling.
//! GPU-backed bridges live outside this crate; they only need to implement
//! [`RendererBridge`].

pub mod bridge;
pub mod mesh;
pub mod trace;

pub use bridge::{BridgeResult, RenderError, RendererBridge};
pub use mesh::{PolygonMesh, Vertex};
pub use trace::{DrawCall, LightUpload, TraceLog, TraceRenderer};
