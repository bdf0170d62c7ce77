use std::fmt;
use std::io::Cursor;

/// Fingerprint del directorio: murmur3 de 32 bits (semilla 0) sobre el texto
/// en UTF-8. Se publica en decimal, que es lo que compara el motor de
/// sincronización contra `config["hash"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u32);

impl Fingerprint {
  pub fn of(text: &str) -> Self {
    let mut cursor = Cursor::new(text.as_bytes());
    // Leer de memoria no falla.
    Fingerprint(murmur3::murmur3_32(&mut cursor, 0).unwrap_or(0))
  }

  pub fn value(self) -> u32 {
    self.0
  }
}

impl fmt::Display for Fingerprint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}
