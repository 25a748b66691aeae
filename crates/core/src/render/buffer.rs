//! GPU buffer wrapper with role tagging.
//!
//! A [`GpuBuffer`] owns one GL buffer and is tagged at creation as
//! holding either per-vertex attribute data or element indices. The
//! two roles have disjoint upload operations; invoking the wrong one is
//! a configuration error, never silent misuse. Attribute uploads record
//! components-per-vertex and the derived vertex count; ragged data
//! (length not a multiple of the component count) is rejected outright.

use std::fmt;

use crate::error::RenderError;

/// What a [`GpuBuffer`] holds, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Per-vertex attribute data (positions, colors, UVs, ...).
    Attributes,
    /// 16-bit element indices.
    Indices,
}

impl BufferKind {
    /// The GL bind target for this role.
    pub(crate) fn gl_target(self) -> u32 {
        match self {
            BufferKind::Attributes => glow::ARRAY_BUFFER,
            BufferKind::Indices => glow::ELEMENT_ARRAY_BUFFER,
        }
    }
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferKind::Attributes => f.write_str("attribute"),
            BufferKind::Indices => f.write_str("index"),
        }
    }
}

/// Validates an attribute upload and returns the derived vertex count.
///
/// Rejects component counts outside 1..=4 and data whose length is not
/// an exact multiple of the component count (reject, not floor: a
/// truncated tail is a modeling bug the caller should hear about).
pub(crate) fn attribute_vertex_count(values: usize, components: u32) -> Result<usize, RenderError> {
    if !(1..=4).contains(&components) {
        return Err(RenderError::InvalidComponents { components });
    }
    if values % components as usize != 0 {
        return Err(RenderError::RaggedAttributeData { values, components });
    }
    Ok(values / components as usize)
}

/// One GPU buffer handle, its role, and its upload bookkeeping.
pub struct GpuBuffer {
    buffer: glow::Buffer,
    kind: BufferKind,
    components: u32,
    count: usize,
}

impl GpuBuffer {
    /// Creates an empty buffer of the given role.
    ///
    /// # Errors
    ///
    /// `RenderError::Gl` if the driver refuses to allocate.
    #[allow(unsafe_code)]
    pub fn new(gl: &glow::Context, kind: BufferKind) -> Result<Self, RenderError> {
        use glow::HasContext;

        // SAFETY: glow wraps raw GL calls as unsafe; create_buffer has
        // no preconditions.
        let buffer = unsafe { gl.create_buffer() }.map_err(RenderError::Gl)?;
        Ok(Self {
            buffer,
            kind,
            components: 0,
            count: 0,
        })
    }

    /// Replaces the buffer contents with flat per-vertex attribute data.
    ///
    /// Data is uploaded `STATIC_DRAW`, non-normalized, tightly packed.
    /// The vertex count becomes `values.len() / components`.
    ///
    /// # Errors
    ///
    /// `BufferRoleMismatch` on an index buffer, `InvalidComponents` for
    /// a component count outside 1..=4, `RaggedAttributeData` when the
    /// length is not a multiple of the component count.
    #[allow(unsafe_code)]
    pub fn upload_attributes(
        &mut self,
        gl: &glow::Context,
        values: &[f32],
        components: u32,
    ) -> Result<(), RenderError> {
        use glow::HasContext;

        if self.kind != BufferKind::Attributes {
            return Err(RenderError::BufferRoleMismatch {
                operation: "upload_attributes",
                kind: self.kind,
            });
        }
        let count = attribute_vertex_count(values.len(), components)?;

        // SAFETY: self.buffer is a valid buffer handle from new(); the
        // byte view of &[f32] is plain old data.
        unsafe {
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.buffer));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(values),
                glow::STATIC_DRAW,
            );
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }

        self.components = components;
        self.count = count;
        Ok(())
    }

    /// Replaces the buffer contents with 16-bit element indices.
    ///
    /// # Errors
    ///
    /// `BufferRoleMismatch` on an attribute buffer.
    #[allow(unsafe_code)]
    pub fn upload_indices(&mut self, gl: &glow::Context, indices: &[u16]) -> Result<(), RenderError> {
        use glow::HasContext;

        if self.kind != BufferKind::Indices {
            return Err(RenderError::BufferRoleMismatch {
                operation: "upload_indices",
                kind: self.kind,
            });
        }

        // SAFETY: self.buffer is a valid buffer handle; &[u16] casts to
        // a plain byte slice.
        unsafe {
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(self.buffer));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                glow::STATIC_DRAW,
            );
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);
        }

        self.count = indices.len();
        Ok(())
    }

    /// Binds this buffer to its role's target.
    #[allow(unsafe_code)]
    pub(crate) fn bind(&self, gl: &glow::Context) {
        use glow::HasContext;

        // SAFETY: self.buffer is a valid buffer handle.
        unsafe { gl.bind_buffer(self.kind.gl_target(), Some(self.buffer)) };
    }

    /// Unbinds this buffer's role target.
    #[allow(unsafe_code)]
    pub(crate) fn unbind(&self, gl: &glow::Context) {
        use glow::HasContext;

        // SAFETY: unbinding takes no handle.
        unsafe { gl.bind_buffer(self.kind.gl_target(), None) };
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    /// Components per vertex; 0 until the first attribute upload.
    pub fn components(&self) -> u32 {
        self.components
    }

    /// Vertices (attribute role) or indices (index role) uploaded.
    pub fn count(&self) -> usize {
        self.count
    }
}
