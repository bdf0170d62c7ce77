use crate::paths::{ArtistdbPaths, ConfigError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

// Escritura con toml_edit para no perder los comentarios del usuario.
use toml_edit::{DocumentMut, Item};

/// Acceso por secciones (`[storage]`, `[remote]`, `[normalizer]`) al fichero
/// de configuración. Cada crate define y carga su propia sección.
pub trait ConfigBackend {
  fn load_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError>;
  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError>;
}

pub struct TomlConfigBackend {
  paths: ArtistdbPaths,
}

impl TomlConfigBackend {
  pub fn new(paths: ArtistdbPaths) -> Self {
    Self { paths }
  }

  pub fn config_file(&self) -> PathBuf {
    self.paths.config_file()
  }

  /// Texto del fichero, `None` si todavía no existe.
  fn read_config(&self) -> Result<Option<String>, ConfigError> {
    match fs::read_to_string(self.config_file()) {
      Ok(content) => Ok(Some(content)),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  fn decode_section<T: DeserializeOwned>(content: &str, section: &str) -> Result<Option<T>, ConfigError> {
    let toml_val: toml::Value = toml::from_str(content)?;

    let Some(table) = toml_val.get(section) else {
      return Ok(None);
    };

    table
      .clone()
      .try_into()
      .map(Some)
      .map_err(|e| ConfigError::Other(format!("decode section [{section}]: {e}")))
  }

  /// Como `load_section`, pero sin fichero o sin sección devuelve `T::default()`.
  pub fn load_section_with_default<T>(&self, section: &str) -> Result<T, ConfigError>
  where
    T: DeserializeOwned + Default,
  {
    let Some(content) = self.read_config()? else {
      return Ok(T::default());
    };

    Ok(Self::decode_section(&content, section)?.unwrap_or_default())
  }
}

impl ConfigBackend for TomlConfigBackend {
  fn load_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError> {
    let path = self.config_file();
    let content = self.read_config()?.ok_or_else(|| ConfigError::Other(format!("missing config file {path:?}")))?;

    Self::decode_section(&content, section)?
      .ok_or_else(|| ConfigError::Other(format!("missing section [{section}] in {path:?}")))
  }

  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError> {
    // 1) Documento actual (o vacío si el fichero no existe).
    let mut doc: DocumentMut = match self.read_config()? {
      Some(content) => content.parse().map_err(|e| ConfigError::Other(format!("parse toml_edit doc: {e}")))?,
      None => DocumentMut::new(),
    };

    // 2) La sección se serializa con `toml` y se vuelve a leer como tabla.
    let section_str =
      toml::to_string(value).map_err(|e| ConfigError::Other(format!("encode section [{section}]: {e}")))?;
    let section_doc: DocumentMut =
      section_str.parse().map_err(|e| ConfigError::Other(format!("parse section as doc: {e}")))?;

    // 3) Reemplazo en la raíz; los comentarios fuera de la sección se conservan.
    doc[section] = Item::Table(section_doc.into_table());

    // 4) Escritura atómica.
    artistdb_fs::atomic_write_str(&self.config_file(), &doc.to_string())?;

    Ok(())
  }
}
