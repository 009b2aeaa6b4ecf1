use crate::backend::ShaderBackend;

pub const RESOLUTION: &str = "resolution";
pub const MOUSE: &str = "mouse";
pub const TIME: &str = "time";

/// One named slot. `location` is `None` when the program doesn't declare it.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform<L> {
    pub name: &'static str,
    pub location: Option<L>,
}

impl<L> Uniform<L> {
    fn locate<B>(gl: &B, program: B::Program, name: &'static str, verbose: bool) -> Self
    where
        B: ShaderBackend<UniformLocation = L>,
    {
        let location = gl.uniform_location(program, name);
        if location.is_none() && verbose {
            log::info!("Could not get \"{}\" uniform location.", name);
        }
        Self { name, location }
    }

    pub fn is_found(&self) -> bool {
        self.location.is_some()
    }
}

/// Locations of the built-in uniforms for the currently linked program.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformSet<L> {
    pub resolution: Uniform<L>,
    pub mouse: Uniform<L>,
    pub time: Uniform<L>,
}

impl<L> UniformSet<L> {
    /// Every slot marked missing, for a program with no executable.
    pub fn unresolved() -> Self {
        let missing = |name| Uniform {
            name,
            location: None,
        };
        Self {
            resolution: missing(RESOLUTION),
            mouse: missing(MOUSE),
            time: missing(TIME),
        }
    }

    /// Resolves every slot in one pass. Call after each successful link.
    pub fn locate<B>(gl: &B, program: B::Program, verbose: bool) -> Self
    where
        B: ShaderBackend<UniformLocation = L>,
    {
        Self {
            resolution: Uniform::locate(gl, program, RESOLUTION, verbose),
            mouse: Uniform::locate(gl, program, MOUSE, verbose),
            time: Uniform::locate(gl, program, TIME, verbose),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Uniform<L>> {
        [&self.resolution, &self.mouse, &self.time].into_iter()
    }
}

/// Values fed to the built-in uniforms for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    /// Framebuffer size in pixels.
    pub resolution: [f32; 2],
    pub mouse: [f32; 2],
    /// Seconds since startup.
    pub time: f32,
}

impl FrameUniforms {
    pub fn new(size: [f32; 2], cursor: [f32; 2], time: f32) -> Self {
        Self {
            resolution: size,
            mouse: mouse_position(cursor, size),
            time,
        }
    }
}

/// Maps a cursor position to roughly [-0.5, 0.5] around the framebuffer center.
///
/// Both arguments are in the same units, with the origin at the top left.
pub fn mouse_position(cursor: [f32; 2], size: [f32; 2]) -> [f32; 2] {
    let axis = |c: f32, s: f32| {
        if s > 0.0 { (c - s / 2.0) / s } else { 0.0 }
    };
    [axis(cursor[0], size[0]), axis(cursor[1], size[1])]
}
