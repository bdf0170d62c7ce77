use std::collections::BTreeMap;

use crate::domain::artist::ArtistRecord;
use crate::errors::CoreError;

/// Directorio completo: identificador -> registro.
///
/// Las claves distinguen mayúsculas y son únicas (lo garantiza TOML).
pub type Directory = BTreeMap<String, ArtistRecord>;

/// Interpreta el texto del directorio (`artists.toml`).
///
/// Cada tabla de primer nivel es un artista:
///
/// ```toml
/// [alice]
/// name = "Alice"
/// aliases = ["alicia"]
/// socials = [{ code = "twitter", name = "alice" }]
/// ```
pub fn parse(text: &str) -> Result<Directory, CoreError> {
  toml::from_str(text).map_err(|e| CoreError::Parse(e.to_string()))
}
