use async_trait::async_trait;
use once_cell::sync::Lazy;
use tokio::sync::OnceCell;
use tokio::task;
use tracing::{info, warn};

use artistdb_core::ports::{KeyValueStore, Namespace, StoreError};

use crate::{SqliteStore, StorageConfig};

/// Handle del almacén local de todo el proceso.
///
/// Se abre en el primer acceso (no al arrancar). La apertura es
/// single-flight: si varias consultas llegan a la vez, solo una abre la base
/// y el resto espera a ese mismo resultado. Si la apertura falla, el error
/// llega a quien preguntó y el siguiente acceso lo vuelve a intentar.
pub struct LazyStore {
  config: StorageConfig,
  store: OnceCell<SqliteStore>,
}

/// Almacén local del proceso, configurado con la sección `[storage]`.
pub static LOCAL_STORE: Lazy<LazyStore> = Lazy::new(LazyStore::from_config);

impl LazyStore {
  pub fn new(config: StorageConfig) -> Self {
    Self { config, store: OnceCell::new() }
  }

  pub fn from_config() -> Self {
    let config = StorageConfig::load().unwrap_or_else(|e| {
      warn!(error = %e, "could not load [storage] config, using defaults");
      StorageConfig::default()
    });
    Self::new(config)
  }

  pub fn is_open(&self) -> bool {
    self.store.initialized()
  }

  async fn store(&self) -> Result<&SqliteStore, StoreError> {
    self
      .store
      .get_or_try_init(|| async {
        let config = self.config.clone();
        let store = task::spawn_blocking(move || SqliteStore::open(&config))
          .await
          .map_err(|e| StoreError::Unavailable(format!("join error: {e}")))??;
        info!(path = %self.config.db_path.display(), "local store ready");
        Ok(store)
      })
      .await
  }
}

#[async_trait]
impl KeyValueStore for LazyStore {
  async fn get(&self, ns: Namespace, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    self.store().await?.get(ns, key).await
  }

  async fn put(&self, ns: Namespace, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
    self.store().await?.put(ns, key, value).await
  }

  async fn clear(&self, ns: Namespace) -> Result<(), StoreError> {
    self.store().await?.clear(ns).await
  }
}
