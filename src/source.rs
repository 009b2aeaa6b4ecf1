use crate::error::LoadError;

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Fragment source read fresh for one reload attempt.
///
/// Dropped as soon as the compile call returns, whatever the outcome.
#[derive(Debug)]
pub struct ShaderSource {
    text: String,
}

impl ShaderSource {
    /// Reads the whole file, or fails without handing back a partial buffer.
    ///
    /// An empty file is a successful load; it is the compiler's job to reject it.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let mut file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let expected = file
            .metadata()
            .map_err(|source| LoadError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        let mut bytes = Vec::with_capacity(expected as usize);
        let read = file
            .read_to_end(&mut bytes)
            .map_err(|source| LoadError::Read {
                path: path.to_path_buf(),
                source,
            })? as u64;

        if read != expected {
            return Err(LoadError::SizeMismatch {
                path: path.to_path_buf(),
                expected,
                read,
            });
        }

        let text = String::from_utf8(bytes).map_err(|source| LoadError::Encoding {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}
