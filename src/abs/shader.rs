//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing OpenGL shaders.
//! This module also provides the [`Uniform`] trait for setting uniform variables in shader
//! programs.
//!
//! Programs can be built two ways. [`Shader::new`] and [`ShaderProgram::new`] fail on the first
//! compile or link error. [`ShaderProgram::from_files`] and [`ShaderProgram::from_sources`] never
//! stop on asset problems: they log each failure, record it as a [`ShaderDiagnostic`] and hand back
//! a program anyway, which the caller may inspect or turn into an error with
//! [`ShaderProgram::into_result`].

use std::{fmt, fs, path::Path, sync::Arc};

use glam::{Mat4, Vec2, Vec3, Vec4};
use glow::HasContext;

use crate::error::Error;

/// Size of the buffer the driver diagnostic is copied into, terminator included.
pub const INFO_LOG_CAPACITY: usize = 512;

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// The matching GL shader type.
    pub fn gl_enum(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Cuts a driver info log down to what fits in [`INFO_LOG_CAPACITY`] bytes,
/// never splitting a character.
pub fn truncate_info_log(log: &str) -> &str {
    let limit = INFO_LOG_CAPACITY - 1;
    if log.len() <= limit {
        return log;
    }
    let mut end = limit;
    while !log.is_char_boundary(end) {
        end -= 1;
    }
    &log[..end]
}

/// Reads a whole shader source file.
pub fn read_source(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// A recoverable problem met while building a [`ShaderProgram`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderDiagnostic {
    /// The source file could not be read; an empty source was compiled instead.
    SourceUnreadable { stage: ShaderStage, message: String },
    CompileFailed { stage: ShaderStage, log: String },
    LinkFailed { log: String },
}

impl fmt::Display for ShaderDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceUnreadable { stage, message } => {
                write!(f, "{stage} shader source unreadable: {message}")
            }
            Self::CompileFailed { stage, log } => {
                write!(f, "{stage} shader failed to compile:\n{log}")
            }
            Self::LinkFailed { log } => write!(f, "shader program failed to link:\n{log}"),
        }
    }
}

/// Represents an individual OpenGL shader.
pub struct Shader {
    gl: Arc<glow::Context>,
    id: glow::Shader,
    stage: ShaderStage,
}

impl Shader {
    /// Compiles a new shader from the given source code.
    pub fn new(gl: &Arc<glow::Context>, stage: ShaderStage, source: &str) -> Result<Self, Error> {
        unsafe {
            let shader = gl
                .create_shader(stage.gl_enum())
                .map_err(Error::gl("shader"))?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(Error::Compile {
                    stage,
                    log: truncate_info_log(&log).to_string(),
                });
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: shader,
                stage,
            })
        }
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_shader(self.id);
        }
    }
}

/// Represents a uniform variable in a shader program.
///
/// The location is looked up by name on every call. Names that match no active
/// uniform resolve to no location and the write is skipped.
pub trait Uniform {
    /// Sets the value of the uniform variable in the given shader program.
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str);
}

impl Uniform for bool {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            let location = gl.get_uniform_location(program, name);
            if let Some(loc) = location {
                gl.uniform_1_i32(Some(&loc), *self as i32);
            }
        }
    }
}

impl Uniform for f32 {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            let location = gl.get_uniform_location(program, name);
            if let Some(loc) = location {
                gl.uniform_1_f32(Some(&loc), *self);
            }
        }
    }
}

impl Uniform for i32 {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            let location = gl.get_uniform_location(program, name);
            if let Some(loc) = location {
                gl.uniform_1_i32(Some(&loc), *self);
            }
        }
    }
}

impl Uniform for Vec2 {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            let location = gl.get_uniform_location(program, name);
            if let Some(loc) = location {
                gl.uniform_2_f32(Some(&loc), self.x, self.y);
            }
        }
    }
}

impl Uniform for Vec3 {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            let location = gl.get_uniform_location(program, name);
            if let Some(loc) = location {
                gl.uniform_3_f32(Some(&loc), self.x, self.y, self.z);
            }
        }
    }
}

impl Uniform for Vec4 {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            let location = gl.get_uniform_location(program, name);
            if let Some(loc) = location {
                gl.uniform_4_f32(Some(&loc), self.x, self.y, self.z, self.w);
            }
        }
    }
}

impl Uniform for Mat4 {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            let location = gl.get_uniform_location(program, name);
            if let Some(loc) = location {
                gl.uniform_matrix_4_f32_slice(Some(&loc), false, self.as_ref());
            }
        }
    }
}

impl<T: Uniform> Uniform for &T {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        (*self).set_uniform(gl, program, name);
    }
}

/// Represents an OpenGL shader program composed of multiple shaders.
pub struct ShaderProgram {
    gl: Arc<glow::Context>,
    id: glow::Program,
    diagnostics: Vec<ShaderDiagnostic>,
}

impl ShaderProgram {
    /// Links a new shader program from the given shaders.
    pub fn new(gl: &Arc<glow::Context>, shaders: &[&Shader]) -> Result<Self, Error> {
        unsafe {
            let program = gl.create_program().map_err(Error::gl("program"))?;

            for shader in shaders {
                gl.attach_shader(program, shader.id);
            }

            gl.link_program(program);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(Error::Link {
                    log: truncate_info_log(&log).to_string(),
                });
            }

            for shader in shaders {
                gl.detach_shader(program, shader.id);
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: program,
                diagnostics: Vec::new(),
            })
        }
    }

    /// Reads both stage sources from disk and builds a program from them.
    ///
    /// An unreadable file is logged and replaced by an empty source, which then
    /// fails to compile and is logged again. See [`ShaderProgram::from_sources`].
    pub fn from_files(
        gl: &Arc<glow::Context>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, Error> {
        let mut diagnostics = Vec::new();
        let mut read = |stage, path: &Path| {
            read_source(path).unwrap_or_else(|e| {
                log::error!("{e}");
                diagnostics.push(ShaderDiagnostic::SourceUnreadable {
                    stage,
                    message: e.to_string(),
                });
                String::new()
            })
        };
        let vertex_source = read(ShaderStage::Vertex, vertex_path.as_ref());
        let fragment_source = read(ShaderStage::Fragment, fragment_path.as_ref());

        let mut program = Self::from_sources(gl, &vertex_source, &fragment_source)?;
        diagnostics.append(&mut program.diagnostics);
        program.diagnostics = diagnostics;
        Ok(program)
    }

    /// Compiles both stages and links them, logging instead of stopping on
    /// compile or link failures.
    ///
    /// The stage objects are deleted after the link attempt whatever its
    /// outcome. Only a failure to allocate the GL objects themselves is
    /// returned as an error.
    pub fn from_sources(
        gl: &Arc<glow::Context>,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, Error> {
        let mut diagnostics = Vec::new();
        unsafe {
            let vertex = compile_stage(gl, ShaderStage::Vertex, vertex_source, &mut diagnostics)?;
            let fragment =
                match compile_stage(gl, ShaderStage::Fragment, fragment_source, &mut diagnostics) {
                    Ok(fragment) => fragment,
                    Err(e) => {
                        gl.delete_shader(vertex);
                        return Err(e);
                    }
                };

            let program = match gl.create_program() {
                Ok(program) => program,
                Err(e) => {
                    gl.delete_shader(vertex);
                    gl.delete_shader(fragment);
                    return Err(Error::gl("program")(e));
                }
            };
            gl.attach_shader(program, vertex);
            gl.attach_shader(program, fragment);
            gl.link_program(program);

            if !gl.get_program_link_status(program) {
                let log = truncate_info_log(&gl.get_program_info_log(program)).to_string();
                log::error!("shader program failed to link:\n{log}");
                diagnostics.push(ShaderDiagnostic::LinkFailed { log });
            }

            gl.detach_shader(program, vertex);
            gl.detach_shader(program, fragment);
            gl.delete_shader(vertex);
            gl.delete_shader(fragment);

            Ok(Self {
                gl: Arc::clone(gl),
                id: program,
                diagnostics,
            })
        }
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        unsafe {
            self.gl.use_program(Some(self.id));
        }
    }

    /// Sets a uniform variable in the shader program.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) {
        value.set_uniform(&self.gl, self.id, name);
    }

    pub fn set_bool(&self, name: &str, value: bool) {
        self.set_uniform(name, value);
    }

    pub fn set_int(&self, name: &str, value: i32) {
        self.set_uniform(name, value);
    }

    pub fn set_float(&self, name: &str, value: f32) {
        self.set_uniform(name, value);
    }

    /// Whether the link step succeeded. Compile failures usually break the link too.
    pub fn is_linked(&self) -> bool {
        !self
            .diagnostics
            .iter()
            .any(|d| matches!(d, ShaderDiagnostic::LinkFailed { .. }))
    }

    /// The GL name of the program.
    pub fn id(&self) -> glow::Program {
        self.id
    }

    /// Every failure logged while building this program, in order.
    pub fn diagnostics(&self) -> &[ShaderDiagnostic] {
        &self.diagnostics
    }

    /// Turns a degraded program into the error for its first failure.
    pub fn into_result(self) -> Result<Self, Error> {
        match self.diagnostics.first().cloned() {
            None => Ok(self),
            Some(ShaderDiagnostic::SourceUnreadable { stage, message }) => {
                Err(Error::SourceUnreadable { stage, message })
            }
            Some(ShaderDiagnostic::CompileFailed { stage, log }) => {
                Err(Error::Compile { stage, log })
            }
            Some(ShaderDiagnostic::LinkFailed { log }) => Err(Error::Link { log }),
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_program(self.id);
        }
    }
}

/// Creates and compiles one stage, logging and recording a failed compile.
unsafe fn compile_stage(
    gl: &glow::Context,
    stage: ShaderStage,
    source: &str,
    diagnostics: &mut Vec<ShaderDiagnostic>,
) -> Result<glow::Shader, Error> {
    unsafe {
        let shader = gl
            .create_shader(stage.gl_enum())
            .map_err(Error::gl("shader"))?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = truncate_info_log(&gl.get_shader_info_log(shader)).to_string();
            log::error!("{stage} shader failed to compile:\n{log}");
            diagnostics.push(ShaderDiagnostic::CompileFailed { stage, log });
        }

        Ok(shader)
    }
}
