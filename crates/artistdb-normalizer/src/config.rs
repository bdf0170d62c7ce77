use artistdb_config::{CONFIG_BACKEND, ConfigBackend, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sección `[normalizer]` de artistdb.toml. Los flags de la CLI tienen prioridad.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NormalizerConfig {
  /// Fichero fuente del directorio.
  #[serde(default = "default_source_file")]
  pub source_file: PathBuf,

  /// Sidecar donde se publica el fingerprint.
  #[serde(default = "default_hash_file")]
  pub hash_file: PathBuf,

  /// Retardo antes de reescribir la fuente (ms), por si un editor la tiene abierta.
  #[serde(default = "default_save_delay_ms")]
  pub save_delay_ms: u64,
}

fn default_source_file() -> PathBuf {
  PathBuf::from("public/artists.toml")
}

fn default_hash_file() -> PathBuf {
  PathBuf::from("public/artists.hash")
}

fn default_save_delay_ms() -> u64 {
  500
}

impl Default for NormalizerConfig {
  fn default() -> Self {
    NormalizerConfig {
      source_file: default_source_file(),
      hash_file: default_hash_file(),
      save_delay_ms: default_save_delay_ms(),
    }
  }
}

impl NormalizerConfig {
  pub fn load() -> Result<Self, ConfigError> {
    let cfg = CONFIG_BACKEND.load_section_with_default("normalizer")?;
    CONFIG_BACKEND.save_section("normalizer", &cfg)?;
    Ok(cfg)
  }
}
