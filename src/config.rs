use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "shader-viewer",
    about = "Live preview of a GLSL fragment shader on a full-screen quad.",
    after_help = "To manually reload the shader, press R. Always verbose.",
    disable_help_flag = true
)]
pub struct Args {
    /// Open the window fullscreen.
    #[arg(short, long)]
    pub fullscreen: bool,

    /// Show output of shader compilation when auto reloading.
    #[arg(short, long)]
    pub verbose: bool,

    /// Time between shader file reloads in ms. 0 disables auto reload.
    #[arg(short, long, default_value_t = 1000, allow_negative_numbers = true)]
    pub timer: i64,

    /// Window width in pixels.
    #[arg(short, long, default_value_t = 640, allow_negative_numbers = true)]
    pub width: i32,

    /// Window height in pixels.
    #[arg(short, long, default_value_t = 480, allow_negative_numbers = true)]
    pub height: i32,

    /// Fragment shader file.
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Also reload whenever the input file changes on disk.
    #[arg(long)]
    pub watch: bool,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

/// Resolved startup settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub fullscreen: bool,
    pub verbose: bool,
    pub reload_interval: Duration,
    pub width: u32,
    pub height: u32,
    pub shader_path: PathBuf,
    pub watch: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            fullscreen: args.fullscreen,
            verbose: args.verbose,
            reload_interval: Duration::from_millis(args.timer.max(0) as u64),
            width: args.width.max(1) as u32,
            height: args.height.max(1) as u32,
            shader_path: args.input,
            watch: args.watch,
        }
    }
}

impl Config {
    pub fn from_args() -> Self {
        Args::parse().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Args::try_parse_from(std::iter::once("shader-viewer").chain(args.iter().copied()))
            .map(Config::from)
    }

    #[test]
    fn defaults() {
        let config = parse(&["-i", "shader.frag"]).unwrap();
        assert_eq!(
            config,
            Config {
                fullscreen: false,
                verbose: false,
                reload_interval: Duration::from_millis(1000),
                width: 640,
                height: 480,
                shader_path: PathBuf::from("shader.frag"),
                watch: false,
            }
        );
    }

    #[test]
    fn short_flags() {
        let config = parse(&["-f", "-v", "-t", "250", "-w", "800", "-h", "600", "-i", "a.glsl"])
            .unwrap();
        assert!(config.fullscreen);
        assert!(config.verbose);
        assert_eq!(config.reload_interval, Duration::from_millis(250));
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.shader_path, PathBuf::from("a.glsl"));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = parse(&["-t", "-5", "-w", "0", "-h", "-10", "-i", "a.frag"]).unwrap();
        assert_eq!(config.reload_interval, Duration::ZERO);
        assert_eq!((config.width, config.height), (1, 1));
    }

    #[test]
    fn input_is_required() {
        let err = parse(&["-v"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn unknown_flags_are_rejected() {
        let err = parse(&["-x", "-i", "a.frag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn non_numeric_timer_is_rejected() {
        assert!(parse(&["-t", "soon", "-i", "a.frag"]).is_err());
    }
}
