//! Dobles en memoria de los ports para los tests del núcleo.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::ports::{FetchError, KeyValueStore, Namespace, RemoteSource, StoreError};

#[derive(Default)]
pub struct MemoryStore {
  data: Mutex<HashMap<Namespace, BTreeMap<String, Vec<u8>>>>,
  broken: AtomicBool,
}

impl MemoryStore {
  pub fn break_store(&self) {
    self.broken.store(true, Ordering::SeqCst);
  }

  pub fn keys(&self, ns: Namespace) -> Vec<String> {
    self.data.lock().unwrap().get(&ns).map(|m| m.keys().cloned().collect()).unwrap_or_default()
  }

  pub fn raw(&self, ns: Namespace, key: &str) -> Option<Vec<u8>> {
    self.data.lock().unwrap().get(&ns).and_then(|m| m.get(key).cloned())
  }

  pub fn insert(&self, ns: Namespace, key: &str, value: impl Into<Vec<u8>>) {
    self.data.lock().unwrap().entry(ns).or_default().insert(key.to_string(), value.into());
  }

  fn check(&self) -> Result<(), StoreError> {
    if self.broken.load(Ordering::SeqCst) {
      return Err(StoreError::Unavailable("disk on fire".into()));
    }
    Ok(())
  }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
  async fn get(&self, ns: Namespace, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    self.check()?;
    Ok(self.raw(ns, key))
  }

  async fn put(&self, ns: Namespace, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
    self.check()?;
    self.insert(ns, key, value);
    Ok(())
  }

  async fn clear(&self, ns: Namespace) -> Result<(), StoreError> {
    self.check()?;
    self.data.lock().unwrap().remove(&ns);
    Ok(())
  }
}

/// Servidor estático falso: ruta -> cuerpo. Rutas desconocidas dan 404.
#[derive(Default)]
pub struct FakeRemote {
  files: Mutex<HashMap<String, Vec<u8>>>,
  requests: Mutex<Vec<String>>,
}

impl FakeRemote {
  pub fn with(mut self, path: &str, body: impl Into<Vec<u8>>) -> Self {
    self.files.get_mut().unwrap().insert(path.to_string(), body.into());
    self
  }

  pub fn set(&self, path: &str, body: impl Into<Vec<u8>>) {
    self.files.lock().unwrap().insert(path.to_string(), body.into());
  }

  pub fn requests(&self) -> Vec<String> {
    self.requests.lock().unwrap().clone()
  }
}

#[async_trait]
impl RemoteSource for FakeRemote {
  async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
    let bytes = self.fetch_bytes(path).await?;
    String::from_utf8(bytes).map_err(|e| FetchError::InvalidPayload(e.to_string()))
  }

  async fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, FetchError> {
    self.requests.lock().unwrap().push(path.to_string());
    self
      .files
      .lock()
      .unwrap()
      .get(path)
      .cloned()
      .ok_or_else(|| FetchError::Unavailable(format!("GET /{path}: 404 Not Found")))
  }
}
