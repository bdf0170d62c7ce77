use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
  /// Endpoint inalcanzable o respuesta con status no exitoso (404 incluido).
  #[error("unavailable: {0}")]
  Unavailable(String),
  /// La respuesta llegó pero no tiene la forma esperada (p. ej. una página de error).
  #[error("invalid payload: {0}")]
  InvalidPayload(String),
}

/// Port hacia el servidor estático que publica el directorio.
///
/// Las rutas son relativas a la raíz del sitio: `artists.hash`,
/// `artists.toml`, `artists/{id}`.
#[async_trait]
pub trait RemoteSource: Send + Sync {
  async fn fetch_text(&self, path: &str) -> Result<String, FetchError>;
  async fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, FetchError>;
}
