use artistdb_core::Directory;
use artistdb_core::domain::directory;

use crate::errors::NormalizeError;
use crate::ordering::locale_cmp;

/// Fichero fuente ya interpretado.
///
/// `table` conserva el orden y los campos tal y como están en el fichero;
/// `directory` es la vista tipada que consume el resto del sistema.
#[derive(Debug, Clone)]
pub struct Source {
  pub table: toml::Table,
  pub directory: Directory,
}

impl Source {
  pub fn parse(text: &str) -> Result<Self, NormalizeError> {
    let table: toml::Table = toml::from_str(text).map_err(|e| NormalizeError::Parse(e.to_string()))?;
    let directory = directory::parse(text).map_err(|e| NormalizeError::Parse(e.to_string()))?;
    Ok(Self { table, directory })
  }

  /// Identificadores en el orden del fichero.
  pub fn keys(&self) -> Vec<&str> {
    self.table.keys().map(String::as_str).collect()
  }

  /// Forma canónica: entradas ordenadas con [`locale_cmp`] y serializadas de
  /// nuevo. Dentro de cada entrada se respeta el orden original de los campos.
  pub fn canonicalize(&self) -> Result<String, NormalizeError> {
    let mut entries: Vec<(&String, &toml::Value)> = self.table.iter().collect();
    entries.sort_by(|(a, _), (b, _)| locale_cmp(a, b));

    let sorted: toml::Table = entries.into_iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    toml::to_string(&sorted).map_err(|e| NormalizeError::Serialize(e.to_string()))
  }
}
