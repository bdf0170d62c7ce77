use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

/// Espacios de nombres del almacén local. Se crean juntos la primera vez.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
  /// Clave `hash` -> último fingerprint sincronizado.
  Config,
  /// Identificador de artista -> registro codificado (`codec`).
  Artists,
}

impl Namespace {
  pub fn as_str(self) -> &'static str {
    match self {
      Namespace::Config => "config",
      Namespace::Artists => "artists",
    }
  }
}

impl fmt::Display for Namespace {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// No se pudo abrir / crear el almacén.
  #[error("store unavailable: {0}")]
  Unavailable(String),
  /// Falló una operación concreta.
  #[error("store operation failed: {0}")]
  Operation(String),
}

/// Port del almacén clave-valor persistente del cliente.
///
/// `Ok(None)` significa "no existe"; cualquier fallo es `Err`, nunca se
/// confunde con la ausencia.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
  async fn get(&self, ns: Namespace, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
  async fn put(&self, ns: Namespace, key: &str, value: Vec<u8>) -> Result<(), StoreError>;
  async fn clear(&self, ns: Namespace) -> Result<(), StoreError>;
}

#[async_trait]
impl<'a, T: KeyValueStore + ?Sized> KeyValueStore for &'a T {
  async fn get(&self, ns: Namespace, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    (**self).get(ns, key).await
  }

  async fn put(&self, ns: Namespace, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
    (**self).put(ns, key, value).await
  }

  async fn clear(&self, ns: Namespace) -> Result<(), StoreError> {
    (**self).clear(ns).await
  }
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
  async fn get(&self, ns: Namespace, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    (**self).get(ns, key).await
  }

  async fn put(&self, ns: Namespace, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
    (**self).put(ns, key, value).await
  }

  async fn clear(&self, ns: Namespace) -> Result<(), StoreError> {
    (**self).clear(ns).await
  }
}
