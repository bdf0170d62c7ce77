use std::path::PathBuf;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use artistdb_fs::{atomic_write_str, watch_file};

use crate::canonical::Source;
use crate::config::NormalizerConfig;
use crate::errors::NormalizeError;
use crate::export::export;
use crate::fingerprint::Fingerprint;
use crate::ordering::transpositions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// Solo informa: no toca el fichero fuente.
  Check,
  /// Reescribe la fuente en forma canónica si hace falta.
  Write,
}

#[derive(Debug, Clone)]
pub struct Options {
  pub mode: Mode,
  pub source_file: PathBuf,
  pub hash_file: PathBuf,
  pub save_delay: Duration,
  /// Guardar el fingerprint en `hash_file` cuando cambia.
  pub persist_hash: bool,
  /// Si está, se exporta el árbol binario aquí tras cada pasada correcta.
  pub export_dir: Option<PathBuf>,
}

impl Options {
  pub fn from_config(config: &NormalizerConfig, mode: Mode) -> Self {
    Self {
      mode,
      source_file: config.source_file.clone(),
      hash_file: config.hash_file.clone(),
      save_delay: Duration::from_millis(config.save_delay_ms),
      persist_hash: mode == Mode::Write,
      export_dir: None,
    }
  }
}

/// Resultado de una pasada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
  pub fingerprint: Fingerprint,
  /// Intercambios que faltan para ordenar (solo en modo check).
  pub transpositions: Option<usize>,
  pub rewrite_scheduled: bool,
  pub hash_written: bool,
}

pub struct Normalizer {
  options: Options,
  last_fingerprint: Option<Fingerprint>,
  pending_rewrite: Option<JoinHandle<()>>,
}

impl Normalizer {
  pub fn new(options: Options) -> Self {
    Self { options, last_fingerprint: None, pending_rewrite: None }
  }

  /// Una pasada completa sobre el fichero fuente.
  ///
  /// Si el fichero no se puede interpretar no se escribe nada (ni la fuente,
  /// ni el sidecar, ni la exportación) y se devuelve el error.
  pub async fn run_once(&mut self) -> Result<RunReport, NormalizeError> {
    let text = tokio::fs::read_to_string(&self.options.source_file).await?;
    let source = Source::parse(&text)?;

    let mut report = match self.options.mode {
      Mode::Check => {
        let swaps = transpositions(&source.keys());
        for swap in &swaps {
          warn!(key = %swap.placed, swapped_with = %swap.displaced, "key out of order");
        }
        RunReport {
          fingerprint: Fingerprint::of(&text),
          transpositions: Some(swaps.len()),
          rewrite_scheduled: false,
          hash_written: false,
        }
      }
      Mode::Write => {
        let canonical = source.canonicalize()?;
        let fingerprint = Fingerprint::of(&canonical);
        let rewrite_scheduled = canonical != text;
        if rewrite_scheduled {
          self.schedule_rewrite(text, canonical);
        }
        RunReport { fingerprint, transpositions: None, rewrite_scheduled, hash_written: false }
      }
    };

    if let Some(dir) = self.options.export_dir.clone() {
      let directory = source.directory;
      tokio::task::spawn_blocking(move || export(&directory, &dir))
        .await
        .map_err(|e| NormalizeError::Task(format!("export task failed: {e}")))??;
    }

    if self.options.persist_hash && self.last_fingerprint != Some(report.fingerprint) {
      atomic_write_str(&self.options.hash_file, &report.fingerprint.to_string())?;
      info!(file = %self.options.source_file.display(), hash = %report.fingerprint, "new fingerprint");
      report.hash_written = true;
    }
    self.last_fingerprint = Some(report.fingerprint);

    Ok(report)
  }

  /// Como [`run_once`](Self::run_once), pero registrando el error en lugar de
  /// devolverlo. Es lo que usa el bucle de watch.
  pub async fn run_logged(&mut self) -> Option<RunReport> {
    match self.run_once().await {
      Ok(report) => {
        info!(
          hash = %report.fingerprint,
          transpositions = ?report.transpositions,
          rewrite = report.rewrite_scheduled,
          "normalizer run finished"
        );
        Some(report)
      }
      Err(err) => {
        error!(file = %self.options.source_file.display(), error = %err, "normalizer run failed");
        None
      }
    }
  }

  /// Reescribe la fuente tras `save_delay`. Una reescritura posterior cancela
  /// la pendiente; si el fichero cambió entretanto, no se toca.
  fn schedule_rewrite(&mut self, original: String, canonical: String) {
    if let Some(previous) = self.pending_rewrite.take() {
      previous.abort();
    }

    let path = self.options.source_file.clone();
    let delay = self.options.save_delay;

    self.pending_rewrite = Some(tokio::spawn(async move {
      tokio::time::sleep(delay).await;

      match tokio::fs::read_to_string(&path).await {
        Ok(current) if current == original => {}
        Ok(_) => {
          debug!(file = %path.display(), "source changed before rewrite, skipping");
          return;
        }
        Err(err) => {
          warn!(file = %path.display(), error = %err, "cannot re-read source before rewrite");
          return;
        }
      }

      match atomic_write_str(&path, &canonical) {
        Ok(()) => info!(file = %path.display(), "source rewritten in canonical order"),
        Err(err) => error!(file = %path.display(), error = %err, "failed to rewrite source"),
      }
    }));
  }

  /// Espera a la reescritura pendiente, si la hay.
  pub async fn flush(&mut self) {
    if let Some(handle) = self.pending_rewrite.take() {
      if let Err(err) = handle.await {
        warn!(error = %err, "pending rewrite did not complete");
      }
    }
  }

  /// Vuelve a pasar cada vez que cambia el fichero fuente. Los eventos se
  /// atienden uno a uno; termina solo si el watcher se cierra.
  pub async fn watch(&mut self) -> Result<(), NormalizeError> {
    let mut watcher = watch_file(&self.options.source_file)?;
    info!(file = %self.options.source_file.display(), "watching for changes");

    while watcher.changed().await.is_some() {
      self.run_logged().await;
    }
    Ok(())
  }
}
