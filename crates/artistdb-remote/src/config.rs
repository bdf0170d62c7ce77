use artistdb_config::{CONFIG_BACKEND, ConfigBackend, ConfigError};
use serde::{Deserialize, Serialize};

/// Sección `[remote]`: dónde se publica el directorio.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
  /// Raíz del sitio estático; `artists.hash`, `artists.toml` y
  /// `artists/{id}` se resuelven contra ella.
  #[serde(default = "default_base_url")]
  pub base_url: String,

  /// Límite por petición, en segundos.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_base_url() -> String {
  "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
  10
}

impl Default for RemoteConfig {
  fn default() -> Self {
    RemoteConfig { base_url: default_base_url(), timeout_secs: default_timeout_secs() }
  }
}

impl RemoteConfig {
  pub fn load() -> Result<Self, ConfigError> {
    let cfg = CONFIG_BACKEND.load_section_with_default("remote")?;
    CONFIG_BACKEND.save_section("remote", &cfg)?;
    Ok(cfg)
  }
}
