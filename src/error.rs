use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;

/// Reasons a shader file could not be turned into source text.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not open {path:?}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("could not read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("size of {path:?} changed while reading: expected {expected} bytes, got {read}")]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        read: u64,
    },
    #[error("{path:?} is not valid UTF-8: {source}")]
    Encoding {
        path: PathBuf,
        source: FromUtf8Error,
    },
}

/// A failed hot-reload attempt. None of these are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    #[error("could not load shader file: {0}")]
    Load(#[from] LoadError),
    #[error("could not compile shader file")]
    Compile { log: String },
    #[error("could not link shader program")]
    Link { log: String, restored: bool },
}

impl ReloadError {
    /// Logs the failure. Driver output only appears when `verbose`.
    pub fn report(&self, verbose: bool) {
        log::log!(self.summary_level(verbose), "{}", self);
        if verbose {
            if let Some(diagnostic) = self.diagnostic() {
                log::error!("{}", diagnostic.trim_end());
            }
        }
    }

    /// Load failures are always errors; quiet compile and link failures
    /// drop to debug so a broken file on a timer doesn't flood the log.
    pub fn summary_level(&self, verbose: bool) -> log::Level {
        match self {
            ReloadError::Load(_) => log::Level::Error,
            _ if verbose => log::Level::Error,
            _ => log::Level::Debug,
        }
    }

    /// Compiler or linker output, if the driver produced any.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            ReloadError::Load(_) => None,
            ReloadError::Compile { log } | ReloadError::Link { log, .. } => {
                Some(log.as_str()).filter(|log| !log.trim().is_empty())
            }
        }
    }
}

/// Errors raised before the frame loop starts; these end the process.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("no OpenGL context available, the glow renderer is required")]
    NoContext,
    #[error("could not create {what}: {reason}")]
    Create { what: &'static str, reason: String },
    #[error("could not compile built-in vertex shader:\n{0}")]
    VertexShader(String),
    #[error("could not link fallback shader: {0}")]
    Fallback(#[source] ReloadError),
}
