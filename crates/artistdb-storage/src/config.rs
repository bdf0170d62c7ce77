use artistdb_config::{CONFIG_BACKEND, ConfigBackend, ConfigError, PATHS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sección `[storage]` de artistdb.toml.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
  pub db_path: PathBuf,
  pub journal_mode: Option<String>,

  /// Espera máxima (ms) cuando otra conexión tiene la base bloqueada.
  #[serde(default = "default_busy_timeout_ms")]
  pub busy_timeout_ms: u32,
}

fn default_busy_timeout_ms() -> u32 {
  5_000
}

impl Default for StorageConfig {
  fn default() -> Self {
    let db_path = PATHS.data_dir.join("artistdb.db");
    StorageConfig { db_path, journal_mode: Some("WAL".to_string()), busy_timeout_ms: default_busy_timeout_ms() }
  }
}

impl StorageConfig {
  pub fn at(db_path: impl Into<PathBuf>) -> Self {
    StorageConfig {
      db_path: db_path.into(),
      journal_mode: Some("WAL".to_string()),
      busy_timeout_ms: default_busy_timeout_ms(),
    }
  }

  pub fn load() -> Result<Self, ConfigError> {
    let cfg = CONFIG_BACKEND.load_section_with_default("storage")?;
    CONFIG_BACKEND.save_section("storage", &cfg)?;
    Ok(cfg)
  }
}
