use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use artistdb_normalizer::{Mode, Normalizer, NormalizerConfig, Options};

/// Ordena `artists.toml`, calcula su fingerprint y lo publica en `artists.hash`.
#[derive(Debug, Parser)]
#[command(name = "artistdb-normalize", version, about)]
struct Cli {
  /// Reescribe el fichero en forma canónica (si no, solo informa).
  #[arg(long)]
  write: bool,

  /// Vuelve a ejecutarse cada vez que cambia el fichero.
  #[arg(long)]
  watch: bool,

  /// Fichero fuente del directorio.
  #[arg(long, value_name = "PATH")]
  file: Option<PathBuf>,

  /// Sidecar donde se guarda el fingerprint.
  #[arg(long, value_name = "PATH")]
  hash_file: Option<PathBuf>,

  /// Exporta el árbol binario (un fichero por artista y por alias).
  #[arg(long, value_name = "DIR")]
  export: Option<PathBuf>,

  /// Retardo antes de reescribir la fuente.
  #[arg(long, value_name = "MS")]
  save_delay_ms: Option<u64>,
}

impl Cli {
  fn into_options(self, config: NormalizerConfig) -> Options {
    let mode = if self.write { Mode::Write } else { Mode::Check };
    let mut options = Options::from_config(&config, mode);

    if let Some(file) = self.file {
      options.source_file = file;
    }
    if let Some(hash_file) = self.hash_file {
      options.hash_file = hash_file;
    }
    if let Some(ms) = self.save_delay_ms {
      options.save_delay = Duration::from_millis(ms);
    }
    options.persist_hash = self.write || self.watch;
    options.export_dir = self.export;
    options
  }
}

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  init_tracing();
  let cli = Cli::parse();

  let config = NormalizerConfig::load().unwrap_or_else(|e| {
    warn!(error = %e, "could not load [normalizer] config, using defaults");
    NormalizerConfig::default()
  });

  let watch = cli.watch;
  let mut normalizer = Normalizer::new(cli.into_options(config));

  normalizer.run_logged().await;

  if watch {
    tokio::select! {
      result = normalizer.watch() => result?,
      _ = tokio::signal::ctrl_c() => info!("stopping watcher"),
    }
  }

  normalizer.flush().await;
  Ok(())
}
