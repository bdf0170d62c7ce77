mod cli;
pub mod infrastructure;

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use artistdb_core::services::{ArtistClient, SyncService, SyncWorker};
use artistdb_remote::{HttpRemote, RemoteConfig};
use artistdb_storage::LOCAL_STORE;

pub use crate::cli::{Cli, Command};
use crate::infrastructure::printer::JsonLinesPrinter;

fn init_tracing() {
  // Los logs van a stderr: stdout queda solo para las líneas JSON.
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Consulta cada `id` en el worker e imprime sus respuestas en orden.
///
/// Las consultas se encolan todas antes de leer, así que se ejecutan a la
/// vez en el hilo del worker. Devuelve cuántas terminaron en fallo.
pub fn print_lookups<W: Write>(
  worker: &SyncWorker,
  ids: &[String],
  printer: &mut JsonLinesPrinter<W>,
) -> anyhow::Result<usize> {
  let streams: Vec<_> = ids.iter().map(|id| (id, worker.lookup(id.as_str()))).collect();
  let mut failures = 0;

  for (id, mut responses) in streams {
    while let Some(response) = responses.blocking_recv() {
      if !response.success {
        failures += 1;
      }
      printer.response(id, &response)?;
    }
  }
  Ok(failures)
}

pub fn run() -> anyhow::Result<()> {
  init_tracing();
  let cli = Cli::parse();

  // --- Dependency Injection Phase ---

  // 1. Remote Adapter (HTTP)
  let mut remote_config = RemoteConfig::load().unwrap_or_else(|e| {
    warn!(error = %e, "could not load [remote] config, using defaults");
    RemoteConfig::default()
  });
  if let Some(base_url) = cli.base_url.clone() {
    remote_config.base_url = base_url;
  }
  let remote = HttpRemote::new(&remote_config).context("failed to build HTTP client")?;

  let stdout = std::io::stdout();
  let mut printer = JsonLinesPrinter::new(stdout.lock());

  match cli.command() {
    Command::Lookup(ids) => {
      // 2. Persistence Adapter (SQLite). Se abre en la primera consulta.
      // 3. Service Wiring + background worker.
      let worker = SyncWorker::spawn(SyncService::new(&*LOCAL_STORE, remote)).context("failed to start sync worker")?;

      let failures = print_lookups(&worker, &ids, &mut printer)?;
      worker.shutdown();

      if failures > 0 {
        warn!(failures, "some lookups failed");
      }
    }
    Command::Resolve(id) => {
      let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
      let client = ArtistClient::new(remote);
      let text =
        runtime.block_on(client.fetch_identifier(&id)).with_context(|| format!("failed to resolve {id:?}"))?;
      println!("{text}");
    }
    Command::Bridge(id) => {
      let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
      let client = ArtistClient::new(remote);
      let record =
        runtime.block_on(client.fetch_record(&id)).with_context(|| format!("failed to fetch {id:?} from the bridge"))?;
      printer.record(&record)?;
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use async_trait::async_trait;
  use serde_json::Value;
  use tempfile::tempdir;

  use artistdb_core::ports::{FetchError, RemoteSource};
  use artistdb_storage::SqliteStore;

  use super::*;

  struct StaticSite(HashMap<&'static str, &'static str>);

  #[async_trait]
  impl RemoteSource for StaticSite {
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
      self.0.get(path).map(|s| s.to_string()).ok_or_else(|| FetchError::Unavailable(format!("GET /{path}: 404")))
    }

    async fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, FetchError> {
      self.fetch_text(path).await.map(String::into_bytes)
    }
  }

  fn site() -> StaticSite {
    StaticSite(HashMap::from([
      ("artists.hash", "2704912086\n"),
      ("artists.toml", "[alice]\nname = \"Alice\"\n\n[bob]\nname = \"Bob\"\n"),
    ]))
  }

  fn lines(out: Vec<u8>) -> Vec<Value> {
    String::from_utf8(out).unwrap().lines().map(|l| serde_json::from_str(l).unwrap()).collect()
  }

  #[test]
  fn lookups_against_sqlite_converge() {
    let tmp = tempdir().unwrap();
    let db = tmp.path().join("artistdb.db");

    let worker = SyncWorker::spawn(SyncService::new(SqliteStore::open_at(&db).unwrap(), site())).unwrap();
    let mut printer = JsonLinesPrinter::new(Vec::new());
    let failures = print_lookups(&worker, &["alice".to_string()], &mut printer).unwrap();
    worker.shutdown();

    assert_eq!(failures, 0);
    let first = lines(printer.into_inner());
    assert_eq!(first.len(), 2);
    assert_eq!(first[0]["data"], Value::Null);
    assert_eq!(first[1]["data"]["name"], "Alice");
    assert_eq!(first[1]["needRefresh"], true);

    // Segunda ejecución sobre la misma base: respuesta local y confirmación.
    let store = SqliteStore::open_at(&db).unwrap();
    let worker = SyncWorker::spawn(SyncService::new(store, site())).unwrap();
    let mut printer = JsonLinesPrinter::new(Vec::new());
    print_lookups(&worker, &["bob".to_string(), "nobody".to_string()], &mut printer).unwrap();
    worker.shutdown();

    let second = lines(printer.into_inner());
    assert_eq!(second.len(), 4);
    assert_eq!(second[0]["id"], "bob");
    assert_eq!(second[0]["data"]["name"], "Bob");
    assert_eq!(second[1]["needRefresh"], false);
    assert_eq!(second[2]["id"], "nobody");
    assert_eq!(second[3]["needRefresh"], false);
  }

  #[test]
  fn unreachable_remote_reports_failure_once() {
    let tmp = tempdir().unwrap();
    let store = SqliteStore::open_at(&tmp.path().join("artistdb.db")).unwrap();
    let worker = SyncWorker::spawn(SyncService::new(store, StaticSite(HashMap::new()))).unwrap();

    let mut printer = JsonLinesPrinter::new(Vec::new());
    let failures = print_lookups(&worker, &["alice".to_string()], &mut printer).unwrap();
    worker.shutdown();

    assert_eq!(failures, 1);
    let out = lines(printer.into_inner());
    assert_eq!(out.len(), 2);
    assert_eq!(out[1]["success"], false);
  }
}
