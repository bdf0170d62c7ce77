use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// `artists.toml` -> `artists.toml.tmp`. Conserva la extensión para que dos
/// ficheros con el mismo stem no compartan temporal.
fn tmp_path(path: &Path) -> PathBuf {
  let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
  name.push(".tmp");
  path.with_file_name(name)
}

/// Escribe en `<path>.tmp` y renombra: quien lea `path` ve el contenido
/// viejo o el nuevo, nunca uno a medias.
pub fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
  let tmp_path = tmp_path(path);

  {
    let mut tmp_file = fs::File::create(&tmp_path)?;
    tmp_file.write_all(contents)?;
    tmp_file.sync_all()?;
  }

  fs::rename(&tmp_path, path)?;
  Ok(())
}

pub fn atomic_write_str(path: &Path, contents: &str) -> io::Result<()> {
  atomic_write(path, contents.as_bytes())
}
