use crate::backend::{
    COMPILE_LOG_LIMIT, LINK_LOG_LIMIT, ShaderBackend, ShaderStage, truncate_log,
};
use crate::error::{ReloadError, StartupError};
use crate::source::ShaderSource;
use crate::uniforms::{FrameUniforms, UniformSet};

use std::path::Path;

/// Built-in vertex stage. The version line is prepended at runtime.
pub const VERTEX_SHADER_SOURCE: &str = r#"
    out vec2 texcoord;

    const vec2 verts[4] = vec2[4](
        vec2(-1.0, -1.0), vec2(1.0, -1.0),
        vec2(-1.0, 1.0),  vec2(1.0, 1.0)
    );

    void main() {
        vec2 position = verts[gl_VertexID];
        texcoord = (position + 1.0) / 2.0;
        gl_Position = vec4(position, 0.0, 1.0);
    }
"#;

/// Drawn when the input file can't be used at startup.
pub const FALLBACK_FRAGMENT_SOURCE: &str = r#"
    in vec2 texcoord;
    out vec4 frag_color;

    void main() {
        float checker = mod(floor(texcoord.x * 16.0) + floor(texcoord.y * 16.0), 2.0);
        frag_color = vec4(mix(vec3(0.1), vec3(0.8, 0.0, 0.8), checker), 1.0);
    }
"#;

/// Compiles one stage in place. On failure the handle stays valid for the
/// next attempt and the bounded driver log is returned.
pub fn compile_stage<B: ShaderBackend>(gl: &B, shader: B::Shader, source: &str) -> Result<(), String> {
    if gl.compile_shader(shader, source) {
        Ok(())
    } else {
        Err(truncate_log(gl.shader_info_log(shader), COMPILE_LOG_LIMIT))
    }
}

/// Keeps a stage attached for the lifetime of the guard.
struct Attachment<'a, B: ShaderBackend> {
    gl: &'a B,
    program: B::Program,
    shader: B::Shader,
}

impl<'a, B: ShaderBackend> Attachment<'a, B> {
    fn new(gl: &'a B, program: B::Program, shader: B::Shader) -> Self {
        gl.attach_shader(program, shader);
        Self {
            gl,
            program,
            shader,
        }
    }
}

impl<B: ShaderBackend> Drop for Attachment<'_, B> {
    fn drop(&mut self) {
        self.gl.detach_shader(self.program, self.shader);
    }
}

/// A program object whose fragment stage can be swapped at runtime.
///
/// The program, vertex stage and fragment stage are created once and reused
/// for every attempt. `last_good` holds the fragment source of the most
/// recent successful link so a failed link can be rolled back.
pub struct HotProgram<B: ShaderBackend> {
    program: B::Program,
    vertex: B::Shader,
    fragment: B::Shader,
    last_good: Option<String>,
    uniforms: UniformSet<B::UniformLocation>,
}

impl<B: ShaderBackend> HotProgram<B> {
    /// Builds the persistent objects and performs the first load from `path`.
    ///
    /// If that load fails the fallback source is linked instead so there is
    /// always something to draw.
    pub fn new(
        gl: &B,
        vertex_source: &str,
        path: &Path,
        fallback_source: &str,
    ) -> Result<Self, StartupError> {
        let program = gl.create_program().map_err(|reason| StartupError::Create {
            what: "program",
            reason,
        })?;
        let vertex = gl
            .create_shader(ShaderStage::Vertex)
            .map_err(|reason| StartupError::Create {
                what: "vertex shader",
                reason,
            });
        let vertex = match vertex {
            Ok(vertex) => vertex,
            Err(err) => {
                gl.delete_program(program);
                return Err(err);
            }
        };
        let fragment = match gl.create_shader(ShaderStage::Fragment) {
            Ok(fragment) => fragment,
            Err(reason) => {
                gl.delete_shader(vertex);
                gl.delete_program(program);
                return Err(StartupError::Create {
                    what: "fragment shader",
                    reason,
                });
            }
        };

        let mut hot = Self {
            program,
            vertex,
            fragment,
            last_good: None,
            uniforms: UniformSet::unresolved(),
        };

        if let Err(log) = compile_stage(gl, vertex, vertex_source) {
            hot.destroy(gl);
            return Err(StartupError::VertexShader(log));
        }
        gl.attach_shader(program, vertex);

        if let Err(err) = hot.attempt_reload(gl, path, true) {
            err.report(true);
            log::warn!("Failed to load fragment shader, drawing the built-in fallback.");
            if let Err(err) = hot.link_fragment_source(gl, fallback_source, true) {
                hot.destroy(gl);
                return Err(StartupError::Fallback(err));
            }
        }

        Ok(hot)
    }

    /// Loads `path`, compiles it into the fragment stage and relinks.
    ///
    /// On any failure the program keeps drawing with the previous fragment
    /// stage and the uniform cache is left alone, except after a failed link
    /// where the previous source is relinked and the cache rebuilt.
    pub fn attempt_reload(&mut self, gl: &B, path: &Path, verbose: bool) -> Result<(), ReloadError> {
        let source = ShaderSource::load(path)?;
        self.link_fragment_source(gl, source.as_str(), verbose)
    }

    fn link_fragment_source(
        &mut self,
        gl: &B,
        source: &str,
        verbose: bool,
    ) -> Result<(), ReloadError> {
        compile_stage(gl, self.fragment, source).map_err(|log| ReloadError::Compile { log })?;

        match self.link(gl) {
            Ok(()) => {
                self.last_good = Some(source.to_owned());
                self.uniforms = UniformSet::locate(gl, self.program, verbose);
                log::debug!(
                    "Resolved uniforms: {:?}",
                    self.uniforms
                        .iter()
                        .filter(|u| u.is_found())
                        .map(|u| u.name)
                        .collect::<Vec<_>>()
                );
                Ok(())
            }
            Err(log) => {
                let restored = self.restore(gl);
                Err(ReloadError::Link { log, restored })
            }
        }
    }

    fn link(&self, gl: &B) -> Result<(), String> {
        let _attached = Attachment::new(gl, self.program, self.fragment);
        if gl.link_program(self.program) {
            Ok(())
        } else {
            Err(truncate_log(gl.program_info_log(self.program), LINK_LOG_LIMIT))
        }
    }

    /// Relinks the last good fragment source after a failed link.
    fn restore(&mut self, gl: &B) -> bool {
        let Some(source) = self.last_good.as_deref() else {
            self.uniforms = UniformSet::unresolved();
            return false;
        };
        let restored = compile_stage(gl, self.fragment, source).is_ok() && self.link(gl).is_ok();
        if restored {
            self.uniforms = UniformSet::locate(gl, self.program, false);
        } else {
            log::warn!("Could not restore the previous shader program.");
            self.uniforms = UniformSet::unresolved();
        }
        restored
    }

    pub fn program(&self) -> B::Program {
        self.program
    }

    #[cfg(test)]
    pub fn fragment(&self) -> B::Shader {
        self.fragment
    }

    #[cfg(test)]
    pub fn vertex(&self) -> B::Shader {
        self.vertex
    }

    pub fn uniforms(&self) -> &UniformSet<B::UniformLocation> {
        &self.uniforms
    }

    /// Fragment source of the most recent successful link.
    #[cfg(test)]
    pub fn last_good_source(&self) -> Option<&str> {
        self.last_good.as_deref()
    }

    pub fn destroy(&self, gl: &B) {
        gl.detach_shader(self.program, self.vertex);
        gl.delete_shader(self.fragment);
        gl.delete_shader(self.vertex);
        gl.delete_program(self.program);
    }
}

pub struct ShaderRenderer {
    pub program: HotProgram<glow::Context>,
    pub vertex_array: glow::VertexArray,
}

impl ShaderRenderer {
    pub fn new(gl: &glow::Context, fragment_path: &Path) -> Result<Self, StartupError> {
        use glow::HasContext as _;

        let shader_version = egui_glow::ShaderVersion::get(gl);
        let vertex_source = format!(
            "{}\n{}",
            shader_version.version_declaration(),
            VERTEX_SHADER_SOURCE
        );
        let fallback_source = format!(
            "{}\n{}",
            shader_version.version_declaration(),
            FALLBACK_FRAGMENT_SOURCE
        );

        let program = HotProgram::new(gl, &vertex_source, fragment_path, &fallback_source)?;

        // SAFETY: called on the thread that owns the current context.
        let vertex_array = match unsafe { gl.create_vertex_array() } {
            Ok(vertex_array) => vertex_array,
            Err(reason) => {
                program.destroy(gl);
                return Err(StartupError::Create {
                    what: "vertex array",
                    reason,
                });
            }
        };

        Ok(Self {
            program,
            vertex_array,
        })
    }

    pub fn reload(
        &mut self,
        gl: &glow::Context,
        fragment_path: &Path,
        verbose: bool,
    ) -> Result<(), ReloadError> {
        self.program.attempt_reload(gl, fragment_path, verbose)
    }

    pub fn destroy(&self, gl: &glow::Context) {
        use glow::HasContext as _;
        self.program.destroy(gl);
        // SAFETY: deleting resources that were created with the same context.
        // This is called during cleanup when the context is still valid.
        unsafe {
            gl.delete_vertex_array(self.vertex_array);
        }
    }

    pub fn paint(&self, gl: &glow::Context, frame: &FrameUniforms) {
        use glow::HasContext as _;
        let uniforms = self.program.uniforms();
        // SAFETY: rendering with a valid OpenGL context and program.
        // Slots the program doesn't declare are skipped.
        unsafe {
            gl.use_program(Some(self.program.program()));

            if let Some(loc) = &uniforms.resolution.location {
                gl.uniform_2_f32(Some(loc), frame.resolution[0], frame.resolution[1]);
            }
            if let Some(loc) = &uniforms.mouse.location {
                gl.uniform_2_f32(Some(loc), frame.mouse[0], frame.mouse[1]);
            }
            if let Some(loc) = &uniforms.time.location {
                gl.uniform_1_f32(Some(loc), frame.time);
            }

            gl.bind_vertex_array(Some(self.vertex_array));
            gl.draw_arrays(glow::TRIANGLE_STRIP, 0, 4);
        }
    }
}
