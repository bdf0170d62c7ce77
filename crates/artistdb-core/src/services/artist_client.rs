use tracing::debug;

use crate::codec::{self, ALIAS_MARKER};
use crate::domain::ArtistRecord;
use crate::ports::{FetchError, RemoteSource};

/// Resuelve un identificador contra `/artists/{id}`.
///
/// Dos transportes para la misma operación:
/// - texto plano ([`fetch_identifier`](Self::fetch_identifier)), para la app;
/// - binario ([`fetch_record`](Self::fetch_record)), para el puente embebible.
///
/// Ninguno cachea nada: eso le toca al motor de sincronización.
pub struct ArtistClient<R: RemoteSource> {
  remote: R,
}

fn artist_path(id: &str) -> String {
  format!("artists/{id}")
}

/// `true` si el cuerpo parece una página de error y no datos.
fn looks_like_error_page(body: &str) -> bool {
  let Some(first) = body.chars().next() else {
    return true;
  };
  if first.is_control() && !first.is_whitespace() {
    return true;
  }
  body.trim_start().starts_with('<')
}

impl<R: RemoteSource> ArtistClient<R> {
  pub fn new(remote: R) -> Self {
    Self { remote }
  }

  /// Texto del registro de `id`, siguiendo como mucho un alias.
  ///
  /// Si el cuerpo empieza por `@`, el resto es el identificador canónico y se
  /// pide exactamente una vez más; esa segunda respuesta se devuelve tal cual.
  pub async fn fetch_identifier(&self, id: &str) -> Result<String, FetchError> {
    let body = self.fetch_checked(id).await?;

    let Some(target) = body.strip_prefix(ALIAS_MARKER) else {
      return Ok(body);
    };

    let target = target.trim_end();
    if target.is_empty() {
      return Err(FetchError::InvalidPayload(format!("{id}: alias without target")));
    }

    debug!(alias = id, target, "following alias");
    self.fetch_checked(target).await
  }

  /// Registro decodificado de `id` vía el puente binario.
  ///
  /// Los ficheros del puente se publican en minúsculas. Un alias que apunta a
  /// otro alias es un payload inválido (un solo salto).
  pub async fn fetch_record(&self, id: &str) -> Result<ArtistRecord, FetchError> {
    let id = id.to_lowercase();
    let mut bytes = self.remote.fetch_bytes(&artist_path(&id)).await?;

    if let Some(target) = codec::resolve_alias(&bytes) {
      debug!(alias = %id, target = %target, "following binary alias");
      bytes = self.remote.fetch_bytes(&artist_path(&target.to_lowercase())).await?;

      if codec::resolve_alias(&bytes).is_some() {
        return Err(FetchError::InvalidPayload(format!("{id}: alias points to another alias ({target})")));
      }
    }

    codec::try_decode(&bytes).map_err(|e| FetchError::InvalidPayload(format!("{id}: {e}")))
  }

  async fn fetch_checked(&self, id: &str) -> Result<String, FetchError> {
    let body = self.remote.fetch_text(&artist_path(id)).await?;
    if looks_like_error_page(&body) {
      return Err(FetchError::InvalidPayload(format!("{id}: response is not an artist record")));
    }
    Ok(body)
  }
}
