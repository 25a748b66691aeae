//! GPU resource wrappers.
//!
//! Every type here owns its GL handle and takes the `glow::Context` as
//! an explicit parameter on each operation. There is no ambient
//! context: what you pass is what gets mutated, which keeps bind
//! ordering visible at the call site and the pure decision logic
//! (sampling policy, slot resolution, the uniform cache) testable
//! without a GPU.
//!
//! - [`shader`] -- program compilation, linking, cached uniforms.
//! - [`buffer`] -- role-tagged vertex/index buffers.
//! - [`vertex_array`] -- attribute binding, model transform, draw.
//! - [`texture`] -- image upload and unit binding.

pub mod buffer;
pub mod shader;
pub mod texture;
pub mod vertex_array;

pub use buffer::{BufferKind, GpuBuffer};
pub use shader::{ShaderProgram, ShaderStage};
pub use texture::Texture;
pub use vertex_array::VertexArray;
