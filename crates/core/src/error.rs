//! Error types for glscene-core.
//!
//! A single [`RenderError`] enum covers every failure the crate can
//! produce. [`RenderError::kind`] groups the variants into the three
//! severity categories callers care about: compile, link, and
//! configuration.

use thiserror::Error;

use crate::render::buffer::BufferKind;
use crate::render::shader::ShaderStage;

/// Coarse error category, for callers that only need the class of
/// failure rather than the specific variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A shader stage failed to compile.
    Compile,
    /// A shader program failed to link.
    Link,
    /// A resource was misconfigured or misused. Driver-reported
    /// allocation failures are grouped here as well.
    Configuration,
}

/// Errors produced by rendering operations.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// A shader stage failed to compile. `log` carries the driver
    /// diagnostic together with the line-numbered GLSL source.
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },

    /// A program failed to link.
    #[error("shader program failed to link:\n{0}")]
    Link(String),

    /// The driver refused to allocate a GL object.
    #[error("gl resource allocation failed: {0}")]
    Gl(String),

    /// An operation for one buffer role was invoked on a buffer of the
    /// other role.
    #[error("buffer role mismatch: {operation} on a {kind} buffer")]
    BufferRoleMismatch {
        operation: &'static str,
        kind: BufferKind,
    },

    /// Components per vertex outside the supported 1..=4 range.
    #[error("unsupported components per vertex: {components} (expected 1 to 4)")]
    InvalidComponents { components: u32 },

    /// An attribute array whose length is not a multiple of its
    /// components-per-vertex count.
    #[error("attribute data length {values} is not a multiple of {components} components per vertex")]
    RaggedAttributeData { values: usize, components: u32 },

    /// Width or height was zero when constructing an image.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// An image's pixel slice does not match width * height * 4 bytes.
    #[error("pixel data size mismatch: expected {expected} bytes, got {actual}")]
    PixelSizeMismatch { expected: usize, actual: usize },

    /// A texture unit beyond the supported range.
    #[error("unsupported texture unit {unit} (supported units are 0..=31)")]
    UnsupportedTextureUnit { unit: u32 },

    /// An attribute name with no active attribute in the linked program.
    #[error("attribute '{0}' not found in the linked program")]
    MissingAttribute(String),

    /// A vertex array with no attribute buffers bound.
    #[error("vertex array has no attribute buffers bound")]
    EmptyVertexArray,

    /// A render was requested before the scene was initialized.
    #[error("scene has not been initialized")]
    SceneNotInitialized,
}

impl RenderError {
    /// Returns the coarse category for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::Compile { .. } => ErrorKind::Compile,
            RenderError::Link(_) => ErrorKind::Link,
            _ => ErrorKind::Configuration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_display_includes_stage_and_log() {
        let err = RenderError::Compile {
            stage: ShaderStage::Fragment,
            log: "undeclared identifier".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("fragment"), "missing stage in: {msg}");
        assert!(
            msg.contains("undeclared identifier"),
            "missing log in: {msg}"
        );
    }

    #[test]
    fn link_error_display_includes_log() {
        let err = RenderError::Link("varying mismatch".into());
        let msg = format!("{err}");
        assert!(msg.contains("varying mismatch"), "missing log in: {msg}");
    }

    #[test]
    fn role_mismatch_names_operation_and_kind() {
        let err = RenderError::BufferRoleMismatch {
            operation: "upload_indices",
            kind: BufferKind::Attributes,
        };
        let msg = format!("{err}");
        assert!(
            msg.contains("upload_indices"),
            "missing operation in: {msg}"
        );
        assert!(msg.contains("attribute"), "missing kind in: {msg}");
    }

    #[test]
    fn ragged_data_reports_both_counts() {
        let err = RenderError::RaggedAttributeData {
            values: 11,
            components: 3,
        };
        let msg = format!("{err}");
        assert!(msg.contains("11"), "missing length in: {msg}");
        assert!(msg.contains('3'), "missing components in: {msg}");
    }

    #[test]
    fn unsupported_unit_reports_the_unit() {
        let err = RenderError::UnsupportedTextureUnit { unit: 33 };
        let msg = format!("{err}");
        assert!(msg.contains("33"), "missing unit in: {msg}");
    }

    #[test]
    fn missing_attribute_reports_the_name() {
        let err = RenderError::MissingAttribute("aVertexColor".into());
        let msg = format!("{err}");
        assert!(msg.contains("aVertexColor"), "missing name in: {msg}");
    }

    #[test]
    fn kind_classifies_compile_link_and_configuration() {
        let compile = RenderError::Compile {
            stage: ShaderStage::Vertex,
            log: String::new(),
        };
        assert_eq!(compile.kind(), ErrorKind::Compile);
        assert_eq!(RenderError::Link(String::new()).kind(), ErrorKind::Link);
        assert_eq!(
            RenderError::SceneNotInitialized.kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            RenderError::Gl("out of memory".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            RenderError::EmptyVertexArray.kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn render_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RenderError>();
    }

    #[test]
    fn render_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<RenderError>();
    }
}
