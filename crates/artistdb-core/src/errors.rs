// crates/artistdb-core/src/errors.rs
use thiserror::Error;

/// Error genérico del núcleo de artistdb.
///
/// El motor de sincronización nunca deja escapar este error: lo convierte en
/// una respuesta `{ success: false, message }` para quien hizo la consulta.
#[derive(Debug, Error)]
pub enum CoreError {
  #[error("transport error: {0}")]
  Transport(String),

  #[error("parse error: {0}")]
  Parse(String),

  #[error("store error: {0}")]
  Store(String),
}
