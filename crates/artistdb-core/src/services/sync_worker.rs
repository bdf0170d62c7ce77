use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::ports::{KeyValueStore, RemoteSource};
use crate::services::sync_service::{LookupResponse, SyncService};

struct LookupRequest {
  id: String,
  responses: UnboundedSender<LookupResponse>,
}

/// Contexto de ejecución en segundo plano del motor de sincronización.
///
/// Un hilo propio con un runtime `current_thread`: quien llama nunca se
/// bloquea, solo intercambia mensajes. Cada consulta es una tarea
/// independiente dentro de ese hilo; sus pasos son secuenciales.
pub struct SyncWorker {
  requests: Option<UnboundedSender<LookupRequest>>,
  thread: Option<JoinHandle<()>>,
}

impl SyncWorker {
  pub fn spawn<S, R>(service: SyncService<S, R>) -> std::io::Result<Self>
  where
    S: KeyValueStore + 'static,
    R: RemoteSource + 'static,
  {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let (tx, mut rx) = mpsc::unbounded_channel::<LookupRequest>();
    let service = Arc::new(service);

    let thread = std::thread::Builder::new().name("artistdb-sync".into()).spawn(move || {
      runtime.block_on(async move {
        let mut lookups = JoinSet::new();

        loop {
          tokio::select! {
            request = rx.recv() => {
              let Some(LookupRequest { id, responses }) = request else { break };
              let service = Arc::clone(&service);
              lookups.spawn(async move { service.lookup(&id, &responses).await });
            }
            Some(joined) = lookups.join_next(), if !lookups.is_empty() => {
              if let Err(err) = joined {
                warn!(error = %err, "lookup task aborted");
              }
            }
          }
        }

        // Sin más peticiones: se terminan las consultas en curso.
        while lookups.join_next().await.is_some() {}
        debug!("sync worker stopped");
      });
    })?;

    Ok(Self { requests: Some(tx), thread: Some(thread) })
  }

  /// Encola la consulta de `id` y devuelve el flujo de respuestas (0 a 2
  /// mensajes). El canal se cierra tras el mensaje terminal.
  pub fn lookup(&self, id: impl Into<String>) -> UnboundedReceiver<LookupResponse> {
    let (responses, rx) = mpsc::unbounded_channel();
    let request = LookupRequest { id: id.into(), responses };

    let sent = self.requests.as_ref().is_some_and(|tx| tx.send(request).is_ok());
    if !sent {
      // El receptor verá el canal cerrado sin mensajes.
      warn!("sync worker is not running");
    }
    rx
  }

  /// Deja de aceptar peticiones y espera a que terminen las pendientes.
  pub fn shutdown(mut self) {
    self.stop();
  }

  fn stop(&mut self) {
    self.requests.take();
    if let Some(thread) = self.thread.take() {
      if thread.join().is_err() {
        warn!("sync worker thread panicked");
      }
    }
  }
}

impl Drop for SyncWorker {
  fn drop(&mut self) {
    self.stop();
  }
}
