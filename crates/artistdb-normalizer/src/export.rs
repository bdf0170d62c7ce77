use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use artistdb_core::codec::{self, ALIAS_MARKER};
use artistdb_core::Directory;

use crate::errors::NormalizeError;
use crate::socials::prepare_record;

/// Resultado de exportar el árbol del bridge binario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
  pub artists: usize,
  pub aliases: usize,
  pub skipped: usize,
}

/// Nombre de fichero para un identificador: en minúsculas, que es como lo
/// pide el bridge. `None` si no se puede usar como nombre de fichero.
fn file_name_for(id: &str) -> Option<String> {
  let name = id.to_lowercase();
  let invalid = name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']);
  (!invalid).then_some(name)
}

/// Escribe `out_dir/{id}` con el registro codificado y `out_dir/{alias}` con
/// `@{id}` por cada alias. El directorio se recrea en cada exportación.
///
/// Dos identificadores que solo difieren en mayúsculas comparten fichero: el
/// primero en orden gana; el resto (y sus alias) se descarta y cuenta como
/// `skipped`.
pub fn export(directory: &Directory, out_dir: &Path) -> Result<ExportSummary, NormalizeError> {
  if out_dir.exists() {
    fs::remove_dir_all(out_dir)?;
  }
  fs::create_dir_all(out_dir)?;

  let mut summary = ExportSummary::default();
  let mut exported = BTreeSet::new();

  for (id, record) in directory {
    let Some(name) = file_name_for(id) else {
      warn!(artist = %id, "identifier is not a valid file name, skipping");
      summary.skipped += 1;
      continue;
    };

    let path = out_dir.join(&name);
    if path.exists() {
      warn!(artist = %id, file = %name, "identifier collides with another artist after lowercasing, skipping");
      summary.skipped += 1;
      continue;
    }

    fs::write(path, codec::encode(&prepare_record(id, record)))?;
    exported.insert(id.as_str());
    summary.artists += 1;
  }

  // Los alias van después: nunca pisan el fichero de un artista.
  for (id, record) in directory {
    if !exported.contains(id.as_str()) {
      continue;
    }
    let Some(target) = file_name_for(id) else { continue };

    for alias in record.aliases.iter().flatten() {
      let Some(name) = file_name_for(alias) else {
        warn!(artist = %id, alias = %alias, "alias is not a valid file name, skipping");
        summary.skipped += 1;
        continue;
      };

      let path = out_dir.join(&name);
      if path.exists() {
        warn!(artist = %id, alias = %alias, "alias collides with an existing entry, skipping");
        summary.skipped += 1;
        continue;
      }

      fs::write(path, format!("{ALIAS_MARKER}{target}"))?;
      summary.aliases += 1;
    }
  }

  info!(artists = summary.artists, aliases = summary.aliases, dir = %out_dir.display(), "binary tree exported");
  Ok(summary)
}
