use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::debug;

use artistdb_core::ports::{FetchError, RemoteSource};

use crate::config::RemoteConfig;

#[derive(Debug, Error)]
pub enum RemoteError {
  #[error("invalid base url {url:?}: {reason}")]
  BaseUrl { url: String, reason: String },

  #[error("http client error: {0}")]
  Client(#[from] reqwest::Error),
}

/// `RemoteSource` sobre HTTP(S) contra el sitio estático del directorio.
#[derive(Debug, Clone)]
pub struct HttpRemote {
  client: Client,
  base: Url,
}

/// La base siempre termina en `/`; si no, `Url::join` sustituiría el último
/// segmento en lugar de colgar la ruta debajo.
fn normalize_base(raw: &str) -> Result<Url, RemoteError> {
  let mut url =
    Url::parse(raw).map_err(|e| RemoteError::BaseUrl { url: raw.to_string(), reason: e.to_string() })?;

  if url.cannot_be_a_base() {
    return Err(RemoteError::BaseUrl { url: raw.to_string(), reason: "not a base url".into() });
  }

  if !url.path().ends_with('/') {
    let path = format!("{}/", url.path());
    url.set_path(&path);
  }
  Ok(url)
}

impl HttpRemote {
  pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
    let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
    Ok(Self { client, base: normalize_base(&config.base_url)? })
  }

  fn url_for(&self, path: &str) -> Result<Url, FetchError> {
    self.base.join(path.trim_start_matches('/')).map_err(|e| FetchError::Unavailable(format!("bad path {path:?}: {e}")))
  }

  async fn get(&self, path: &str) -> Result<reqwest::Response, FetchError> {
    let url = self.url_for(path)?;
    debug!(%url, "GET");

    let response = self.client.get(url.clone()).send().await.map_err(|e| {
      if e.is_timeout() {
        FetchError::Unavailable(format!("GET {url}: timed out"))
      } else {
        FetchError::Unavailable(format!("GET {url}: {e}"))
      }
    })?;

    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Unavailable(format!("GET {url}: {status}")));
    }
    Ok(response)
  }
}

#[async_trait]
impl RemoteSource for HttpRemote {
  async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
    let response = self.get(path).await?;
    response.text().await.map_err(|e| FetchError::InvalidPayload(format!("{path}: {e}")))
  }

  async fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, FetchError> {
    let response = self.get(path).await?;
    let bytes = response.bytes().await.map_err(|e| FetchError::InvalidPayload(format!("{path}: {e}")))?;
    Ok(bytes.to_vec())
  }
}
