use std::ffi::OsString;
use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Debug, Error)]
pub enum FsError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("watch error: {0}")]
  Watch(#[from] notify::Error),

  #[error("invalid path: {0}")]
  InvalidPath(PathBuf),
}

/// Observa los cambios de un único fichero.
///
/// Se vigila el directorio padre y no el inode: los editores (y nuestro
/// propio `atomic_write`) reemplazan el fichero con un rename.
pub struct FileWatcher {
  // Mientras viva el watcher siguen llegando eventos.
  _watcher: RecommendedWatcher,
  events: mpsc::UnboundedReceiver<()>,
}

impl FileWatcher {
  /// Espera al siguiente cambio. Los eventos ya encolados se agrupan en uno.
  /// `None` si el watcher se cerró.
  pub async fn changed(&mut self) -> Option<()> {
    self.events.recv().await?;
    while self.events.try_recv().is_ok() {}
    Some(())
  }
}

fn is_relevant(event: &Event, file_name: &OsString) -> bool {
  let kind_matches = matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_));
  kind_matches && event.paths.iter().any(|p| p.file_name() == Some(file_name.as_os_str()))
}

pub fn watch_file(path: &Path) -> Result<FileWatcher, FsError> {
  let file_name = path.file_name().ok_or_else(|| FsError::InvalidPath(path.to_path_buf()))?.to_os_string();
  let dir = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
    _ => PathBuf::from("."),
  };

  let (tx, events) = mpsc::unbounded_channel();

  let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
    Ok(event) if is_relevant(&event, &file_name) => {
      let _ = tx.send(());
    }
    Ok(_) => {}
    Err(err) => warn!(error = %err, "file watcher error"),
  })?;

  watcher.watch(&dir, RecursiveMode::NonRecursive)?;

  Ok(FileWatcher { _watcher: watcher, events })
}
