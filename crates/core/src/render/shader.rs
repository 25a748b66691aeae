//! Shader program wrapper: compilation, linking, activation, and
//! cached uniform uploads.
//!
//! [`ShaderProgram::compile`] turns a vertex/fragment source pair into
//! a linked program or a [`RenderError`] carrying the driver
//! diagnostic. Uniform locations are resolved lazily and cached with an
//! explicit present/absent marker, so a location of 0 is an ordinary
//! cache hit and a name the linker optimized out is looked up exactly
//! once. All operations take the `glow::Context` explicitly; nothing
//! here relies on ambient bind state beyond the GL "current program",
//! which `set_mat4`/`set_i32` establish themselves.

use std::collections::HashMap;
use std::fmt;

use glam::Mat4;

use crate::error::RenderError;

/// The two programmable stages a program is linked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_type(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Lazy uniform-location cache.
///
/// Maps uniform names to `Option<L>`: a missing key means the name has
/// never been looked up; `Some(None)` means the lookup ran and found
/// nothing. This keeps "resolved to location 0" and "not yet resolved"
/// distinct, and guarantees the lookup closure runs at most once per
/// name for the lifetime of the cache.
///
/// Generic over the location type so the at-most-once invariant is
/// testable without a GL context.
pub(crate) struct UniformCache<L> {
    locations: HashMap<String, Option<L>>,
}

impl<L: Clone> UniformCache<L> {
    pub(crate) fn new() -> Self {
        Self {
            locations: HashMap::new(),
        }
    }

    /// Returns the cached location for `name`, running `lookup` only if
    /// the name has never been resolved before. The lookup result,
    /// present or absent, is cached either way.
    pub(crate) fn resolve_with<F>(&mut self, name: &str, lookup: F) -> Option<L>
    where
        F: FnOnce(&str) -> Option<L>,
    {
        if let Some(cached) = self.locations.get(name) {
            return cached.clone();
        }
        let resolved = lookup(name);
        self.locations.insert(name.to_owned(), resolved.clone());
        resolved
    }

    #[cfg(test)]
    fn resolved_count(&self) -> usize {
        self.locations.len()
    }
}

/// Prefixes every source line with its 1-based line number and appends
/// the driver log, so diagnostics that reference line numbers can be
/// read against the GLSL they point into.
pub(crate) fn describe_compile_failure(source: &str, driver_log: &str) -> String {
    let mut out = String::with_capacity(source.len() + driver_log.len() + 64);
    for (index, line) in source.lines().enumerate() {
        out.push_str(&format!("{:>4} | {line}\n", index + 1));
    }
    if !driver_log.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(driver_log);
    }
    out
}

/// A compiled and linked GPU program plus its uniform-location cache.
pub struct ShaderProgram {
    program: glow::Program,
    uniforms: UniformCache<glow::UniformLocation>,
}

impl ShaderProgram {
    /// Compiles both stages and links them into a program.
    ///
    /// Shader handles are deleted on every path; on failure no partial
    /// program survives, so there is nothing to activate.
    ///
    /// # Errors
    ///
    /// `RenderError::Compile` if either stage fails to compile (the log
    /// includes the numbered source), `RenderError::Link` if linking
    /// fails, `RenderError::Gl` if the driver refuses to allocate.
    #[allow(unsafe_code)]
    pub fn compile(
        gl: &glow::Context,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, RenderError> {
        use glow::HasContext;

        let vertex = compile_stage(gl, ShaderStage::Vertex, vertex_source)?;
        let fragment = match compile_stage(gl, ShaderStage::Fragment, fragment_source) {
            Ok(shader) => shader,
            Err(err) => {
                // SAFETY: vertex is a valid shader handle from a successful compile.
                unsafe { gl.delete_shader(vertex) };
                return Err(err);
            }
        };

        let linked = link_stages(gl, vertex, fragment);

        // SAFETY: both handles are valid; the linked program keeps its
        // own copies, so deleting them is correct on success and failure.
        unsafe {
            gl.delete_shader(vertex);
            gl.delete_shader(fragment);
        }

        Ok(Self {
            program: linked?,
            uniforms: UniformCache::new(),
        })
    }

    /// Makes this program the current rendering program. Idempotent.
    #[allow(unsafe_code)]
    pub fn activate(&self, gl: &glow::Context) {
        use glow::HasContext;

        // SAFETY: self.program is a valid linked program from compile().
        unsafe { gl.use_program(Some(self.program)) };
    }

    /// Uploads a 4x4 matrix uniform as 16 floats in column-major order.
    ///
    /// Activates the program first, resolves (and caches) the location
    /// on first use per name. A name with no active uniform is cached
    /// as absent, logged once, and skipped thereafter.
    #[allow(unsafe_code)]
    pub fn set_mat4(&mut self, gl: &glow::Context, name: &str, matrix: &Mat4) {
        use glow::HasContext;

        self.activate(gl);
        if let Some(location) = self.uniform_location(gl, name) {
            // SAFETY: the location was resolved against self.program,
            // which activate() just made current.
            unsafe {
                gl.uniform_matrix_4_f32_slice(Some(&location), false, &matrix.to_cols_array());
            }
        }
    }

    /// Uploads an i32 uniform (sampler bindings, most commonly).
    /// Same activation and caching behavior as [`ShaderProgram::set_mat4`].
    #[allow(unsafe_code)]
    pub fn set_i32(&mut self, gl: &glow::Context, name: &str, value: i32) {
        use glow::HasContext;

        self.activate(gl);
        if let Some(location) = self.uniform_location(gl, name) {
            // SAFETY: location resolved against the current program.
            unsafe { gl.uniform_1_i32(Some(&location), value) };
        }
    }

    /// Resolves an attribute name to its slot in the linked program.
    #[allow(unsafe_code)]
    pub fn attrib_location(&self, gl: &glow::Context, name: &str) -> Option<u32> {
        use glow::HasContext;

        // SAFETY: self.program is a valid linked program.
        unsafe { gl.get_attrib_location(self.program, name) }
    }

    #[allow(unsafe_code)]
    fn uniform_location(
        &mut self,
        gl: &glow::Context,
        name: &str,
    ) -> Option<glow::UniformLocation> {
        use glow::HasContext;

        let program = self.program;
        self.uniforms.resolve_with(name, |n| {
            // SAFETY: program is a valid linked program handle.
            let location = unsafe { gl.get_uniform_location(program, n) };
            if location.is_none() {
                log::warn!("uniform '{n}' not found in program (misspelled or optimized out)");
            }
            location
        })
    }
}

#[allow(unsafe_code)]
fn compile_stage(
    gl: &glow::Context,
    stage: ShaderStage,
    source: &str,
) -> Result<glow::Shader, RenderError> {
    use glow::HasContext;

    // SAFETY: glow wraps raw GL calls as unsafe. We pass a valid stage
    // constant and source string, and delete the shader on failure.
    let shader = unsafe { gl.create_shader(stage.gl_type()) }.map_err(RenderError::Gl)?;

    unsafe {
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
    }

    if unsafe { gl.get_shader_compile_status(shader) } {
        Ok(shader)
    } else {
        let driver_log = unsafe { gl.get_shader_info_log(shader) };
        unsafe { gl.delete_shader(shader) };
        Err(RenderError::Compile {
            stage,
            log: describe_compile_failure(source, &driver_log),
        })
    }
}

#[allow(unsafe_code)]
fn link_stages(
    gl: &glow::Context,
    vertex: glow::Shader,
    fragment: glow::Shader,
) -> Result<glow::Program, RenderError> {
    use glow::HasContext;

    // SAFETY: glow wraps raw GL calls as unsafe. Shader handles come
    // from successful compile_stage calls; the program is deleted on
    // link failure.
    let program = unsafe { gl.create_program() }.map_err(RenderError::Gl)?;

    unsafe {
        gl.attach_shader(program, vertex);
        gl.attach_shader(program, fragment);
        gl.link_program(program);

        // Detach regardless of link status; the program owns copies.
        gl.detach_shader(program, vertex);
        gl.detach_shader(program, fragment);
    }

    if unsafe { gl.get_program_link_status(program) } {
        Ok(program)
    } else {
        let driver_log = unsafe { gl.get_program_info_log(program) };
        unsafe { gl.delete_program(program) };
        Err(RenderError::Link(driver_log))
    }
}
