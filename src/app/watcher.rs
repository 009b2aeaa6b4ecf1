use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::Path;
use std::sync::mpsc;

/// Flags modifications of the shader file between frames.
///
/// Watches the containing directory so saves that rename a new file over
/// the old one keep being seen.
pub struct ShaderWatcher {
    _watcher: RecommendedWatcher,
    receiver: mpsc::Receiver<()>,
}

impl ShaderWatcher {
    pub fn new(path: &Path) -> Result<Self, notify::Error> {
        if !path.is_file() {
            return Err(notify::Error::path_not_found().add_path(path.to_path_buf()));
        }
        let file_name: OsString = path
            .file_name()
            .ok_or_else(|| notify::Error::path_not_found().add_path(path.to_path_buf()))?
            .to_os_string();
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let (tx, receiver) = mpsc::channel();
        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                match res {
                    Ok(event)
                        if (event.kind.is_modify() || event.kind.is_create())
                            && event
                                .paths
                                .iter()
                                .any(|p| p.file_name() == Some(file_name.as_os_str())) =>
                    {
                        let _ = tx.send(());
                    }
                    Ok(_) => {}
                    Err(e) => log::warn!("File watcher error: {}", e),
                }
            })?;

        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        Ok(Self {
            _watcher: watcher,
            receiver,
        })
    }

    /// True if the file changed since the last call. Bursts count once.
    pub fn changed(&self) -> bool {
        self.receiver.try_iter().count() > 0
    }
}
