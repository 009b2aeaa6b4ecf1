
/// Longest compiler log kept per attempt, in bytes.
pub const COMPILE_LOG_LIMIT: usize = 1024;
/// Longest linker log kept per attempt, in bytes.
pub const LINK_LOG_LIMIT: usize = 4092;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// The GL calls the reload pipeline needs, and nothing else.
pub trait ShaderBackend {
    type Shader: Copy;
    type Program: Copy;
    type UniformLocation: Clone;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    /// Replaces the shader's source and compiles it. Returns the compile status.
    fn compile_shader(&self, shader: Self::Shader, source: &str) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// Links and returns the link status.
    fn link_program(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);

    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;
}

impl ShaderBackend for glow::Context {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type UniformLocation = glow::UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        // SAFETY: called with the context eframe made current for this frame.
        unsafe { glow::HasContext::create_shader(self, kind) }
    }

    fn compile_shader(&self, shader: Self::Shader, source: &str) -> bool {
        use glow::HasContext as _;
        // SAFETY: `shader` was created by this context and not yet deleted.
        unsafe {
            self.shader_source(shader, source);
            glow::HasContext::compile_shader(self, shader);
            self.get_shader_compile_status(shader)
        }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        use glow::HasContext as _;
        // SAFETY: `shader` was created by this context and not yet deleted.
        unsafe { self.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        // SAFETY: deleting an object owned by this context, exactly once at shutdown.
        unsafe { glow::HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        // SAFETY: called with the context eframe made current for this frame.
        unsafe { glow::HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        // SAFETY: both objects belong to this context.
        unsafe { glow::HasContext::attach_shader(self, program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        // SAFETY: both objects belong to this context.
        unsafe { glow::HasContext::detach_shader(self, program, shader) }
    }

    fn link_program(&self, program: Self::Program) -> bool {
        use glow::HasContext as _;
        // SAFETY: `program` belongs to this context.
        unsafe {
            glow::HasContext::link_program(self, program);
            self.get_program_link_status(program)
        }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        use glow::HasContext as _;
        // SAFETY: `program` belongs to this context.
        unsafe { self.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        // SAFETY: deleting an object owned by this context, exactly once at shutdown.
        unsafe { glow::HasContext::delete_program(self, program) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        use glow::HasContext as _;
        // SAFETY: `program` belongs to this context.
        unsafe { self.get_uniform_location(program, name) }
    }
}

/// Cuts a driver log down to `limit` bytes without splitting a character.
pub fn truncate_log(mut log: String, limit: usize) -> String {
    if log.len() > limit {
        let mut end = limit;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
    }
    log
}

/// In-memory stand-in for a GL driver.
///
/// A shader compiles unless its source contains `#error` or has no `main`.
/// A link fails when the attached fragment source contains `LINK_FAIL`, and
/// a failed link throws away the previous executable, which is the least
/// forgiving behavior a driver is allowed.
#[cfg(test)]
pub(crate) mod fake {
    use super::{ShaderBackend, ShaderStage};
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    struct Shader {
        stage: Option<ShaderStage>,
        compiled: Option<String>,
        log: String,
        deleted: bool,
    }

    #[derive(Debug, Default)]
    struct Program {
        attached: Vec<u32>,
        executable: Option<Executable>,
        log: String,
        deleted: bool,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Executable {
        pub vertex: String,
        pub fragment: String,
        pub uniforms: HashMap<String, i32>,
    }

    #[derive(Debug, Default)]
    struct State {
        shaders: HashMap<u32, Shader>,
        programs: HashMap<u32, Program>,
        next_id: u32,
        links: i32,
        compiles: usize,
    }

    #[derive(Debug, Default)]
    pub struct FakeGpu {
        state: RefCell<State>,
    }

    impl FakeGpu {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fragment source the program would currently draw with.
        pub fn running_fragment(&self, program: u32) -> Option<String> {
            self.executable(program).map(|exe| exe.fragment)
        }

        pub fn executable(&self, program: u32) -> Option<Executable> {
            self.state.borrow().programs[&program].executable.clone()
        }

        pub fn attached(&self, program: u32) -> Vec<u32> {
            self.state.borrow().programs[&program].attached.clone()
        }

        pub fn compiles(&self) -> usize {
            self.state.borrow().compiles
        }

        pub fn is_deleted_shader(&self, shader: u32) -> bool {
            self.state.borrow().shaders[&shader].deleted
        }

        pub fn is_deleted_program(&self, program: u32) -> bool {
            self.state.borrow().programs[&program].deleted
        }

        fn uniforms_in(source: &str) -> Vec<String> {
            source
                .lines()
                .filter_map(|line| {
                    let mut words = line.trim().trim_end_matches(';').split_whitespace();
                    match (words.next(), words.next(), words.next()) {
                        (Some("uniform"), Some(_ty), Some(name)) => Some(name.to_string()),
                        _ => None,
                    }
                })
                .collect()
        }
    }

    impl ShaderBackend for FakeGpu {
        type Shader = u32;
        type Program = u32;
        type UniformLocation = i32;

        fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let id = state.next_id;
            state.shaders.insert(
                id,
                Shader {
                    stage: Some(stage),
                    ..Default::default()
                },
            );
            Ok(id)
        }

        fn compile_shader(&self, shader: u32, source: &str) -> bool {
            let mut state = self.state.borrow_mut();
            state.compiles += 1;
            let entry = state.shaders.get_mut(&shader).expect("unknown shader");
            if source.contains("#error") || !source.contains("main") {
                entry.compiled = None;
                entry.log = format!("0:1(1): error: syntax error in {} bytes", source.len());
                false
            } else {
                entry.compiled = Some(source.to_string());
                entry.log.clear();
                true
            }
        }

        fn shader_info_log(&self, shader: u32) -> String {
            self.state.borrow().shaders[&shader].log.clone()
        }

        fn delete_shader(&self, shader: u32) {
            let mut state = self.state.borrow_mut();
            state.shaders.get_mut(&shader).expect("unknown shader").deleted = true;
        }

        fn create_program(&self) -> Result<u32, String> {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let id = state.next_id;
            state.programs.insert(id, Program::default());
            Ok(id)
        }

        fn attach_shader(&self, program: u32, shader: u32) {
            let mut state = self.state.borrow_mut();
            let entry = state.programs.get_mut(&program).expect("unknown program");
            assert!(!entry.attached.contains(&shader), "shader attached twice");
            entry.attached.push(shader);
        }

        fn detach_shader(&self, program: u32, shader: u32) {
            let mut state = self.state.borrow_mut();
            let entry = state.programs.get_mut(&program).expect("unknown program");
            entry.attached.retain(|&s| s != shader);
        }

        fn link_program(&self, program: u32) -> bool {
            let mut state = self.state.borrow_mut();
            state.links += 1;
            let generation = state.links;

            let attached = state.programs[&program].attached.clone();
            let mut vertex = None;
            let mut fragment = None;
            for id in attached {
                let shader = &state.shaders[&id];
                match shader.stage {
                    Some(ShaderStage::Vertex) => vertex = shader.compiled.clone(),
                    Some(ShaderStage::Fragment) => fragment = shader.compiled.clone(),
                    None => {}
                }
            }

            let result = match (vertex, fragment) {
                (Some(vertex), Some(fragment)) if !fragment.contains("LINK_FAIL") => {
                    let uniforms = Self::uniforms_in(&fragment)
                        .into_iter()
                        .enumerate()
                        .map(|(i, name)| (name, generation * 16 + i as i32))
                        .collect();
                    Ok(Executable {
                        vertex,
                        fragment,
                        uniforms,
                    })
                }
                (Some(_), Some(_)) => Err("error: unresolved symbol".to_string()),
                _ => Err("error: missing or uncompiled stage".to_string()),
            };

            let entry = state.programs.get_mut(&program).expect("unknown program");
            match result {
                Ok(exe) => {
                    entry.executable = Some(exe);
                    entry.log.clear();
                    true
                }
                Err(log) => {
                    entry.executable = None;
                    entry.log = log;
                    false
                }
            }
        }

        fn program_info_log(&self, program: u32) -> String {
            self.state.borrow().programs[&program].log.clone()
        }

        fn delete_program(&self, program: u32) {
            let mut state = self.state.borrow_mut();
            state.programs.get_mut(&program).expect("unknown program").deleted = true;
        }

        fn uniform_location(&self, program: u32, name: &str) -> Option<i32> {
            let state = self.state.borrow();
            state.programs[&program]
                .executable
                .as_ref()
                .and_then(|exe| exe.uniforms.get(name).copied())
        }
    }
}
