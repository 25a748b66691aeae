#![deny(unsafe_code)]
//! Explicit-context WebGL2 scene rendering.
//!
//! glscene-core wraps the handful of GPU resources a static animated
//! scene needs -- a shader program, role-tagged buffers, a vertex
//! array, a texture -- plus a fixed perspective [`Camera`] and the
//! [`Renderer`] that drives the per-frame update/render cycle. Every
//! GPU operation takes a `&glow::Context` explicitly; the crate keeps
//! no global state.
//!
//! The host supplies shader sources, a [`Mesh`] description, an
//! optional decoded [`ImageData`], and a per-frame timestamp; see
//! glscene-wasm for the browser shell that wires those to a canvas.

pub mod camera;
pub mod error;
pub mod mesh;
pub mod render;
pub mod renderer;

pub use camera::Camera;
pub use error::{ErrorKind, RenderError};
pub use mesh::{ImageData, Mesh, MeshAttribute, Topology};
pub use render::{BufferKind, GpuBuffer, ShaderProgram, ShaderStage, Texture, VertexArray};
pub use renderer::{Renderer, SceneConfig};
