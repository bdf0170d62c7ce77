use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::codec;
use crate::domain::{ArtistRecord, Directory, directory};
use crate::errors::CoreError;
use crate::ports::{KeyValueStore, Namespace, RemoteSource, StoreError};

/// Fingerprint actual del directorio remoto.
pub const HASH_PATH: &str = "artists.hash";
/// Directorio completo en formato texto.
pub const DIRECTORY_PATH: &str = "artists.toml";
/// Clave del fingerprint sincronizado en `Namespace::Config`.
pub const HASH_KEY: &str = "hash";

/// Mensaje emitido hacia quien pidió la consulta.
///
/// Por consulta llegan como mucho dos mensajes con datos: el optimista (caché
/// local) y el refrescado. El flujo termina con un mensaje que lleva
/// `need_refresh` o con un `success: false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
  pub success: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<ArtistRecord>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub need_refresh: Option<bool>,
}

impl LookupResponse {
  pub fn cached(data: Option<ArtistRecord>) -> Self {
    Self { success: true, data, ..Default::default() }
  }

  pub fn fresh() -> Self {
    Self { success: true, need_refresh: Some(false), ..Default::default() }
  }

  pub fn refreshed(data: Option<ArtistRecord>) -> Self {
    Self { success: true, data, need_refresh: Some(true), ..Default::default() }
  }

  pub fn failure(message: impl Into<String>) -> Self {
    Self { success: false, message: Some(message.into()), ..Default::default() }
  }

  /// `true` si no vendrán más mensajes para esta consulta.
  pub fn is_terminal(&self) -> bool {
    !self.success || self.need_refresh.is_some()
  }
}

/// Motor de sincronización de la caché local.
///
/// Por consulta: lectura local -> comprobación del fingerprint remoto ->
/// refresco completo si cambió -> respuesta final. Sin reintentos ni
/// exclusión mutua entre refrescos concurrentes (gana el último).
pub struct SyncService<S, R>
where
  S: KeyValueStore,
  R: RemoteSource,
{
  store: S,
  remote: R,
}

impl<S, R> SyncService<S, R>
where
  S: KeyValueStore,
  R: RemoteSource,
{
  pub fn new(store: S, remote: R) -> Self {
    Self { store, remote }
  }

  /// Ejecuta la consulta de `id` y emite 1 o 2 respuestas por `tx`.
  ///
  /// Nunca falla: cualquier error se convierte en un mensaje terminal
  /// `success: false`. Si el receptor ya no existe, los mensajes se descartan.
  pub async fn lookup(&self, id: &str, tx: &UnboundedSender<LookupResponse>) {
    let emit = |msg: LookupResponse| {
      // Fire-and-forget: quien preguntó puede haberse ido.
      let _ = tx.send(msg);
    };

    let span = info_span!("lookup", artist = id);
    if let Err(err) = self.sync(id, &emit).instrument(span).await {
      warn!(artist = id, error = %err, "lookup failed");
      emit(LookupResponse::failure(err.to_string()));
    }
  }

  async fn sync(&self, id: &str, emit: &impl Fn(LookupResponse)) -> Result<(), CoreError> {
    // 1) LOCAL_LOOKUP: respuesta optimista, puede estar desactualizada.
    let cached = self.read_artist(id).await?;
    emit(LookupResponse::cached(cached));

    // 2) HASH_CHECK
    let remote_hash = self
      .remote
      .fetch_text(HASH_PATH)
      .await
      .map_err(|e| CoreError::Transport(format!("failed to fetch {HASH_PATH}: {e}")))?;
    let remote_hash = remote_hash.trim();

    // 3) ¿Sigue fresca la caché?
    let local_hash = self.local_hash().await?;
    if local_hash.as_deref() == Some(remote_hash) {
      debug!(hash = remote_hash, "local cache is up to date");
      emit(LookupResponse::fresh());
      return Ok(());
    }

    // 4) STALE_REFRESH: si algo falla aquí la caché queda intacta.
    info!(local = ?local_hash, remote = remote_hash, "directory changed, refreshing local cache");
    let directory = self.fetch_directory().await?;

    // 5) REFRESHED
    self.replace_all(remote_hash, &directory).await?;
    let refreshed = self.read_artist(id).await?;
    emit(LookupResponse::refreshed(refreshed));

    Ok(())
  }

  async fn read_artist(&self, id: &str) -> Result<Option<ArtistRecord>, CoreError> {
    let bytes = self
      .store
      .get(Namespace::Artists, id)
      .await
      .map_err(|e| CoreError::Store(format!("failed to read artist from local store: {e}")))?;

    let Some(bytes) = bytes else {
      return Ok(None);
    };

    match codec::try_decode(&bytes) {
      Ok(record) => Ok(Some(record)),
      Err(err) => {
        // El próximo refresco sobrescribe la fila corrupta.
        warn!(artist = id, error = %err, "ignoring undecodable cache entry");
        Ok(None)
      }
    }
  }

  async fn local_hash(&self) -> Result<Option<String>, CoreError> {
    let bytes = self
      .store
      .get(Namespace::Config, HASH_KEY)
      .await
      .map_err(|e| CoreError::Store(format!("failed to read stored hash: {e}")))?;

    Ok(bytes.map(|b| String::from_utf8_lossy(&b).into_owned()))
  }

  async fn fetch_directory(&self) -> Result<Directory, CoreError> {
    let text = self
      .remote
      .fetch_text(DIRECTORY_PATH)
      .await
      .map_err(|e| CoreError::Transport(format!("failed to fetch {DIRECTORY_PATH}: {e}")))?;

    directory::parse(&text).map_err(|e| CoreError::Parse(format!("failed to parse {DIRECTORY_PATH}: {e}")))
  }

  /// Reemplaza la caché completa. El fingerprint se escribe al final, solo
  /// cuando todas las filas ya están guardadas.
  async fn replace_all(&self, hash: &str, directory: &Directory) -> Result<(), CoreError> {
    let store_err = |e: StoreError| CoreError::Store(format!("failed to refresh local store: {e}"));

    self.store.clear(Namespace::Artists).await.map_err(store_err)?;
    for (id, record) in directory {
      self.store.put(Namespace::Artists, id, codec::encode(record)).await.map_err(store_err)?;
    }
    self.store.put(Namespace::Config, HASH_KEY, hash.as_bytes().to_vec()).await.map_err(store_err)?;

    info!(entries = directory.len(), hash, "local cache refreshed");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use tokio::sync::mpsc;

  use super::*;
  use crate::services::testing::{FakeRemote, MemoryStore};

  const DIRECTORY: &str = r#"
[alice]
name = "Alice"

[bob]
name = "Bob"
"#;

  fn alice() -> ArtistRecord {
    ArtistRecord { name: Some("Alice".into()), ..Default::default() }
  }

  fn remote() -> FakeRemote {
    FakeRemote::default().with(HASH_PATH, "2417336452\n").with(DIRECTORY_PATH, DIRECTORY)
  }

  async fn run<S: KeyValueStore, R: RemoteSource>(service: &SyncService<S, R>, id: &str) -> Vec<LookupResponse> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    service.lookup(id, &tx).await;
    drop(tx);

    let mut out = Vec::new();
    while let Some(msg) = rx.recv().await {
      out.push(msg);
    }
    out
  }

  #[tokio::test]
  async fn empty_cache_gets_optimistic_then_refreshed_answer() {
    let store = Arc::new(MemoryStore::default());
    let service = SyncService::new(Arc::clone(&store), remote());

    let responses = run(&service, "alice").await;

    assert_eq!(responses, vec![LookupResponse::cached(None), LookupResponse::refreshed(Some(alice()))]);
    assert_eq!(store.keys(Namespace::Artists), vec!["alice", "bob"]);
    assert_eq!(store.raw(Namespace::Config, HASH_KEY), Some(b"2417336452".to_vec()));
    assert!(responses[1].is_terminal());
  }

  #[tokio::test]
  async fn refreshed_cache_converges_to_fresh() {
    let store = Arc::new(MemoryStore::default());
    let service = SyncService::new(Arc::clone(&store), remote());

    run(&service, "alice").await;
    let responses = run(&service, "alice").await;

    assert_eq!(responses, vec![LookupResponse::cached(Some(alice())), LookupResponse::fresh()]);
    let toml_fetches = service.remote.requests().iter().filter(|p| *p == DIRECTORY_PATH).count();
    assert_eq!(toml_fetches, 1);
  }

  #[tokio::test]
  async fn unknown_artist_is_absent_not_an_error() {
    let service = SyncService::new(MemoryStore::default(), remote());
    let responses = run(&service, "zed").await;
    assert_eq!(responses, vec![LookupResponse::cached(None), LookupResponse::refreshed(None)]);
  }

  #[tokio::test]
  async fn refresh_replaces_stale_entries() {
    let store = Arc::new(MemoryStore::default());
    store.insert(Namespace::Artists, "carol", codec::encode(&ArtistRecord::default()));
    store.insert(Namespace::Config, HASH_KEY, "old");
    let service = SyncService::new(Arc::clone(&store), remote());

    let responses = run(&service, "carol").await;

    assert_eq!(responses, vec![LookupResponse::cached(Some(ArtistRecord::default())), LookupResponse::refreshed(None)]);
    assert_eq!(store.keys(Namespace::Artists), vec!["alice", "bob"]);
  }

  #[tokio::test]
  async fn hash_fetch_failure_terminates_after_optimistic_answer() {
    let service = SyncService::new(MemoryStore::default(), FakeRemote::default());
    let responses = run(&service, "alice").await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0], LookupResponse::cached(None));
    assert!(!responses[1].success);
    assert!(responses[1].message.as_deref().unwrap().contains(HASH_PATH));
  }

  #[tokio::test]
  async fn broken_directory_leaves_store_untouched() {
    let store = Arc::new(MemoryStore::default());
    store.insert(Namespace::Artists, "alice", codec::encode(&alice()));
    store.insert(Namespace::Config, HASH_KEY, "old");
    let remote = FakeRemote::default().with(HASH_PATH, "new").with(DIRECTORY_PATH, "[alice\nname =");
    let service = SyncService::new(Arc::clone(&store), remote);

    let responses = run(&service, "alice").await;

    assert_eq!(responses[0], LookupResponse::cached(Some(alice())));
    assert!(!responses[1].success);
    assert!(responses[1].message.as_deref().unwrap().contains("parse"));
    assert_eq!(store.raw(Namespace::Config, HASH_KEY), Some(b"old".to_vec()));
    assert_eq!(store.keys(Namespace::Artists), vec!["alice"]);

    // Cuando el directorio vuelve a ser válido, el siguiente lookup refresca.
    service.remote.set(DIRECTORY_PATH, DIRECTORY);
    let responses = run(&service, "bob").await;
    assert_eq!(responses.last().unwrap().need_refresh, Some(true));
  }

  #[tokio::test]
  async fn store_failure_is_a_single_terminal_message() {
    let store = Arc::new(MemoryStore::default());
    store.break_store();
    let service = SyncService::new(Arc::clone(&store), remote());

    let responses = run(&service, "alice").await;

    assert_eq!(responses.len(), 1);
    assert!(!responses[0].success);
    assert!(service.remote.requests().is_empty());
  }

  #[tokio::test]
  async fn corrupt_cache_entry_reads_as_miss() {
    let store = Arc::new(MemoryStore::default());
    store.insert(Namespace::Artists, "alice", vec![0xde, 0xad]);
    let service = SyncService::new(Arc::clone(&store), remote());

    let responses = run(&service, "alice").await;
    assert_eq!(responses, vec![LookupResponse::cached(None), LookupResponse::refreshed(Some(alice()))]);
  }

  #[test]
  fn responses_serialize_like_the_worker_protocol() {
    let fresh = serde_json::to_value(LookupResponse::fresh()).unwrap();
    assert_eq!(fresh, serde_json::json!({ "success": true, "needRefresh": false }));

    let cached = serde_json::to_value(LookupResponse::cached(None)).unwrap();
    assert_eq!(cached, serde_json::json!({ "success": true }));

    let refreshed = serde_json::to_value(LookupResponse::refreshed(Some(alice()))).unwrap();
    assert_eq!(refreshed, serde_json::json!({ "success": true, "data": { "name": "Alice" }, "needRefresh": true }));
  }
}
