mod backend;
mod paths;

pub use backend::{ConfigBackend, TomlConfigBackend};
pub use paths::{ArtistdbPaths, ConfigError};

use once_cell::sync::Lazy;

// Singleton de paths (ARTISTDB_BASE_DIR / sistema)
pub static PATHS: Lazy<ArtistdbPaths> = Lazy::new(|| ArtistdbPaths::detect().expect("failed to init ArtistdbPaths"));

// Singleton del backend de config
pub static CONFIG_BACKEND: Lazy<TomlConfigBackend> = Lazy::new(|| TomlConfigBackend::new(PATHS.clone()));
