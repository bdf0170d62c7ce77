pub mod config;
pub mod lazy;
pub mod models;
pub mod schema;

use std::path::Path;

use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tokio::task;
use tracing::debug;

use artistdb_core::ports::{KeyValueStore, Namespace, StoreError};

pub use crate::config::StorageConfig;
pub use crate::lazy::{LOCAL_STORE, LazyStore};
use crate::models::{NewArtistRow, NewConfigRow};
use crate::schema::{artists, config as config_table};

/// Crea `config` y `artists` la primera vez que se abre la base.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// PRAGMAs aplicados a cada conexión nueva del pool.
#[derive(Debug)]
struct ConnectionOptions {
  journal_mode: Option<String>,
  busy_timeout_ms: u32,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
  fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
    let mut pragmas = format!("PRAGMA busy_timeout = {};", self.busy_timeout_ms);
    if let Some(mode) = &self.journal_mode {
      pragmas.push_str(&format!(" PRAGMA journal_mode = {mode};"));
    }
    conn.batch_execute(&pragmas).map_err(diesel::r2d2::Error::QueryError)
  }
}

/// Almacén local sobre SQLite: una tabla por namespace.
///
/// Diesel es bloqueante, así que cada operación se ejecuta en
/// `spawn_blocking` con una conexión del pool.
pub struct SqliteStore {
  pool: SqlitePool,
}

fn unavailable(e: impl ToString) -> StoreError {
  StoreError::Unavailable(e.to_string())
}

impl SqliteStore {
  pub fn open(cfg: &StorageConfig) -> Result<Self, StoreError> {
    if let Some(parent) = cfg.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent).map_err(unavailable)?;
    }

    let manager = ConnectionManager::<SqliteConnection>::new(cfg.db_path.to_string_lossy());
    let options = ConnectionOptions { journal_mode: cfg.journal_mode.clone(), busy_timeout_ms: cfg.busy_timeout_ms };
    let pool = Pool::builder().connection_customizer(Box::new(options)).build(manager).map_err(unavailable)?;

    {
      let mut pooled = pool.get().map_err(unavailable)?;
      let conn: &mut SqliteConnection = &mut pooled;
      conn.run_pending_migrations(MIGRATIONS).map_err(|e| StoreError::Unavailable(format!("migrations: {e}")))?;
    }

    debug!(path = %cfg.db_path.display(), "local store opened");
    Ok(Self { pool })
  }

  pub fn open_at(path: &Path) -> Result<Self, StoreError> {
    Self::open(&StorageConfig::at(path))
  }

  async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
  where
    T: Send + 'static,
    F: FnOnce(&mut SqliteConnection) -> QueryResult<T> + Send + 'static,
  {
    let pool = self.pool.clone();

    task::spawn_blocking(move || {
      let mut pooled = pool.get().map_err(unavailable)?;
      f(&mut *pooled).map_err(|e| StoreError::Operation(e.to_string()))
    })
    .await
    .map_err(|e| StoreError::Operation(format!("join error: {e}")))?
  }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
  async fn get(&self, ns: Namespace, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    let key = key.to_owned();

    self
      .with_conn(move |conn| match ns {
        Namespace::Config => {
          config_table::table.find(key).select(config_table::value).first::<Vec<u8>>(conn).optional()
        }
        Namespace::Artists => artists::table.find(key).select(artists::value).first::<Vec<u8>>(conn).optional(),
      })
      .await
  }

  async fn put(&self, ns: Namespace, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
    let key = key.to_owned();

    self
      .with_conn(move |conn| {
        match ns {
          Namespace::Config => {
            let row = NewConfigRow { key: &key, value: &value };
            diesel::replace_into(config_table::table).values(&row).execute(conn)?
          }
          Namespace::Artists => {
            let row = NewArtistRow { key: &key, value: &value };
            diesel::replace_into(artists::table).values(&row).execute(conn)?
          }
        };
        Ok(())
      })
      .await
  }

  async fn clear(&self, ns: Namespace) -> Result<(), StoreError> {
    self
      .with_conn(move |conn| {
        let removed = match ns {
          Namespace::Config => diesel::delete(config_table::table).execute(conn)?,
          Namespace::Artists => diesel::delete(artists::table).execute(conn)?,
        };
        debug!(namespace = %ns, removed, "namespace cleared");
        Ok(())
      })
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[tokio::test]
  async fn namespaces_are_independent() {
    let tmp = tempdir().unwrap();
    let store = SqliteStore::open_at(&tmp.path().join("artistdb.db")).unwrap();

    assert_eq!(store.get(Namespace::Artists, "alice").await.unwrap(), None);

    store.put(Namespace::Artists, "alice", vec![1, 2, 3]).await.unwrap();
    store.put(Namespace::Config, "hash", b"42".to_vec()).await.unwrap();
    store.put(Namespace::Artists, "alice", vec![4]).await.unwrap();

    assert_eq!(store.get(Namespace::Artists, "alice").await.unwrap(), Some(vec![4]));
    assert_eq!(store.get(Namespace::Artists, "Alice").await.unwrap(), None);
    assert_eq!(store.get(Namespace::Config, "alice").await.unwrap(), None);

    store.clear(Namespace::Artists).await.unwrap();
    assert_eq!(store.get(Namespace::Artists, "alice").await.unwrap(), None);
    assert_eq!(store.get(Namespace::Config, "hash").await.unwrap(), Some(b"42".to_vec()));
  }

  #[tokio::test]
  async fn config_namespace_round_trip_and_clear() {
    let tmp = tempdir().unwrap();
    let store = SqliteStore::open_at(&tmp.path().join("artistdb.db")).unwrap();

    store.put(Namespace::Config, "hash", b"1".to_vec()).await.unwrap();
    store.put(Namespace::Config, "hash", b"2".to_vec()).await.unwrap();
    store.put(Namespace::Artists, "bob", vec![9]).await.unwrap();
    assert_eq!(store.get(Namespace::Config, "hash").await.unwrap(), Some(b"2".to_vec()));

    store.clear(Namespace::Config).await.unwrap();
    assert_eq!(store.get(Namespace::Config, "hash").await.unwrap(), None);
    assert_eq!(store.get(Namespace::Artists, "bob").await.unwrap(), Some(vec![9]));
  }

  #[tokio::test]
  async fn data_survives_reopen() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("nested").join("artistdb.db");

    {
      let store = SqliteStore::open_at(&path).unwrap();
      store.put(Namespace::Config, "hash", b"7".to_vec()).await.unwrap();
    }

    let store = SqliteStore::open_at(&path).unwrap();
    assert_eq!(store.get(Namespace::Config, "hash").await.unwrap(), Some(b"7".to_vec()));
  }

  #[test]
  fn unopenable_database_is_an_error() {
    let tmp = tempdir().unwrap();
    let blocker = tmp.path().join("not-a-dir");
    std::fs::write(&blocker, "x").unwrap();

    let result = SqliteStore::open_at(&blocker.join("artistdb.db"));
    assert!(matches!(result, Err(StoreError::Unavailable(_))));
  }
}
