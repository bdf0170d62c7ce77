use thiserror::Error;

use artistdb_fs::FsError;

#[derive(Debug, Error)]
pub enum NormalizeError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("parse error: {0}")]
  Parse(String),

  #[error("serialize error: {0}")]
  Serialize(String),

  #[error("watch error: {0}")]
  Watch(#[from] FsError),

  #[error("task error: {0}")]
  Task(String),
}
