//! Codec binario de `ArtistRecord`.
//!
//! Es el formato del puente binario (`/artists/{id}` exportado por el
//! normalizador) y también el valor que guarda la caché local.
//!
//! ## Formato (versión 0x01)
//!
//! ```text
//! [Version: u8]
//! Por cada campo opcional, en orden flag, avatar, name, aliases, socials:
//!   [Has field: u8 (0 o 1)]
//!   Si está presente:
//!     string  -> [Len: u32 LE][UTF-8 bytes]
//!     aliases -> [Count: u32 LE] + Count strings
//!     socials -> [Count: u32 LE] + Count SocialEntry
//! SocialEntry:
//!   [code: string]
//!   [Has name][name] [Has desc][desc] [Has link][link]
//!   [Has special][special: u8 (0 o 1)]
//! ```
//!
//! Si el payload termina justo donde empezaría el tag de un campo de primer
//! nivel, los campos restantes se leen como ausentes. Cualquier otro corte,
//! tag desconocido, UTF-8 inválido o bytes sobrantes invalidan el payload.

use std::io::{self, Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use thiserror::Error;

use crate::domain::{ArtistRecord, SocialEntry};

pub const CODEC_VERSION: u8 = 0x01;

/// Prefijo de un payload alias (`@canonical`).
pub const ALIAS_MARKER: char = '@';

const ABSENT: u8 = 0;
const PRESENT: u8 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
  #[error("empty payload")]
  Empty,
  #[error("unsupported codec version {0:#04x}")]
  Version(u8),
  #[error("payload truncated")]
  Truncated,
  #[error("invalid presence tag {0}")]
  Tag(u8),
  #[error("invalid boolean byte {0}")]
  Bool(u8),
  #[error("declared length {0} exceeds payload")]
  Length(u32),
  #[error("invalid utf-8 in string field")]
  Utf8,
  #[error("{0} trailing bytes after record")]
  Trailing(usize),
}

impl From<io::Error> for DecodeError {
  fn from(_: io::Error) -> Self {
    // Leer de un slice en memoria solo falla por fin de datos.
    DecodeError::Truncated
  }
}

// -----------------------------------------------------------------------------
// Encode
// -----------------------------------------------------------------------------

/// Serializa un registro. Escribir en memoria no puede fallar.
pub fn encode(record: &ArtistRecord) -> Vec<u8> {
  let mut buf = Vec::with_capacity(64);
  buf.push(CODEC_VERSION);

  write_opt(&mut buf, record.flag.as_deref(), write_str);
  write_opt(&mut buf, record.avatar.as_deref(), write_str);
  write_opt(&mut buf, record.name.as_deref(), write_str);
  write_opt(&mut buf, record.aliases.as_deref(), |buf, aliases| {
    write_len(buf, aliases.len());
    for alias in aliases {
      write_str(buf, alias);
    }
  });
  write_opt(&mut buf, record.socials.as_deref(), |buf, socials| {
    write_len(buf, socials.len());
    for social in socials {
      write_social(buf, social);
    }
  });

  buf
}

fn write_social(buf: &mut Vec<u8>, social: &SocialEntry) {
  write_str(buf, &social.code);
  write_opt(buf, social.name.as_deref(), write_str);
  write_opt(buf, social.desc.as_deref(), write_str);
  write_opt(buf, social.link.as_deref(), write_str);
  write_opt(buf, social.special, |buf, special| buf.push(u8::from(special)));
}

fn write_opt<T>(buf: &mut Vec<u8>, value: Option<T>, write: impl FnOnce(&mut Vec<u8>, T)) {
  match value {
    Some(value) => {
      buf.push(PRESENT);
      write(buf, value);
    }
    None => buf.push(ABSENT),
  }
}

fn write_len(buf: &mut Vec<u8>, len: usize) {
  let len = u32::try_from(len).unwrap_or(u32::MAX);
  buf.extend_from_slice(&len.to_le_bytes());
}

fn write_str(buf: &mut Vec<u8>, s: &str) {
  write_len(buf, s.len());
  buf.extend_from_slice(s.as_bytes());
}

// -----------------------------------------------------------------------------
// Decode
// -----------------------------------------------------------------------------

/// Deserializa un registro; `None` solo si la estructura no es válida.
pub fn decode(bytes: &[u8]) -> Option<ArtistRecord> {
  try_decode(bytes).ok()
}

/// Igual que [`decode`] pero conservando el motivo del fallo.
pub fn try_decode(bytes: &[u8]) -> Result<ArtistRecord, DecodeError> {
  if bytes.is_empty() {
    return Err(DecodeError::Empty);
  }

  let mut r = Reader { cur: Cursor::new(bytes) };

  let version = r.cur.read_u8()?;
  if version != CODEC_VERSION {
    return Err(DecodeError::Version(version));
  }

  let record = ArtistRecord {
    flag: r.top_level(Reader::string)?,
    avatar: r.top_level(Reader::string)?,
    name: r.top_level(Reader::string)?,
    aliases: r.top_level(|r| r.list(Reader::string))?,
    socials: r.top_level(|r| r.list(Reader::social))?,
  };

  match r.remaining() {
    0 => Ok(record),
    n => Err(DecodeError::Trailing(n)),
  }
}

/// Interpreta el payload como texto: `Some(canonical)` si empieza por `@`.
pub fn resolve_alias(bytes: &[u8]) -> Option<String> {
  let text = std::str::from_utf8(bytes).ok()?;
  text.strip_prefix(ALIAS_MARKER).map(str::to_owned)
}

struct Reader<'a> {
  cur: Cursor<&'a [u8]>,
}

impl Reader<'_> {
  fn remaining(&self) -> usize {
    let len = self.cur.get_ref().len() as u64;
    len.saturating_sub(self.cur.position()) as usize
  }

  /// Campo de primer nivel: fin de datos en el límite = ausente.
  fn top_level<T>(
    &mut self,
    read: impl FnOnce(&mut Self) -> Result<T, DecodeError>,
  ) -> Result<Option<T>, DecodeError> {
    if self.remaining() == 0 {
      return Ok(None);
    }
    self.optional(read)
  }

  fn optional<T>(
    &mut self,
    read: impl FnOnce(&mut Self) -> Result<T, DecodeError>,
  ) -> Result<Option<T>, DecodeError> {
    match self.cur.read_u8()? {
      ABSENT => Ok(None),
      PRESENT => read(self).map(Some),
      tag => Err(DecodeError::Tag(tag)),
    }
  }

  fn len(&mut self) -> Result<usize, DecodeError> {
    let len = self.cur.read_u32::<LittleEndian>()?;
    // Cada elemento ocupa al menos un byte: evita reservas absurdas.
    if len as usize > self.remaining() {
      return Err(DecodeError::Length(len));
    }
    Ok(len as usize)
  }

  fn string(&mut self) -> Result<String, DecodeError> {
    let len = self.len()?;
    let mut bytes = vec![0u8; len];
    self.cur.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|_| DecodeError::Utf8)
  }

  fn bool(&mut self) -> Result<bool, DecodeError> {
    match self.cur.read_u8()? {
      0 => Ok(false),
      1 => Ok(true),
      b => Err(DecodeError::Bool(b)),
    }
  }

  fn list<T>(&mut self, mut read: impl FnMut(&mut Self) -> Result<T, DecodeError>) -> Result<Vec<T>, DecodeError> {
    let count = self.len()?;
    let mut items = Vec::with_capacity(count.min(64));
    for _ in 0..count {
      items.push(read(self)?);
    }
    Ok(items)
  }

  fn social(&mut self) -> Result<SocialEntry, DecodeError> {
    Ok(SocialEntry {
      code: self.string()?,
      name: self.optional(Reader::string)?,
      desc: self.optional(Reader::string)?,
      link: self.optional(Reader::string)?,
      special: self.optional(Reader::bool)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  fn alice() -> ArtistRecord {
    ArtistRecord {
      name: Some("Alice".into()),
      avatar: Some("https://example.com/alice.png".into()),
      flag: None,
      aliases: Some(vec!["alicia".into(), "al".into()]),
      socials: Some(vec![
        SocialEntry { name: Some("alice".into()), ..SocialEntry::new("twitter") },
        SocialEntry {
          link: Some("https://linktr.ee/alice".into()),
          special: Some(true),
          ..SocialEntry::new("linktree")
        },
      ]),
    }
  }

  #[test]
  fn round_trip_keeps_presence() {
    let record = alice();
    assert_eq!(decode(&encode(&record)), Some(record));

    // Lista vacía presente != lista ausente.
    let empty = ArtistRecord { aliases: Some(vec![]), ..Default::default() };
    assert_eq!(decode(&encode(&empty)), Some(empty));
    assert_eq!(decode(&encode(&ArtistRecord::default())), Some(ArtistRecord::default()));
  }

  #[test]
  fn payload_cut_at_field_boundary_is_partial_record() {
    let record = ArtistRecord { name: Some("Bob".into()), ..Default::default() };
    let bytes = encode(&record);
    // version + flag(0) + avatar(0) + name(1 + 4 + 3); se cortan aliases y socials.
    let cut = &bytes[..1 + 1 + 1 + 1 + 4 + 3];
    assert_eq!(decode(cut), Some(record));

    // Solo la versión: registro vacío.
    assert_eq!(decode(&[CODEC_VERSION]), Some(ArtistRecord::default()));
  }

  #[test]
  fn structurally_invalid_payloads_are_absent() {
    let bytes = encode(&alice());

    assert_eq!(try_decode(&[]), Err(DecodeError::Empty));
    assert_eq!(try_decode(&[0x02]), Err(DecodeError::Version(0x02)));
    assert_eq!(try_decode(&[CODEC_VERSION, 7]), Err(DecodeError::Tag(7)));

    // Corte dentro de un string.
    assert!(decode(&bytes[..bytes.len() - 3]).is_none());

    let mut trailing = bytes.clone();
    trailing.push(0);
    assert_eq!(try_decode(&trailing), Err(DecodeError::Trailing(1)));

    // Longitud declarada mayor que el payload.
    assert_eq!(try_decode(&[CODEC_VERSION, 1, 0xff, 0xff, 0xff, 0x7f]), Err(DecodeError::Length(0x7fff_ffff)));

    // UTF-8 inválido.
    assert_eq!(try_decode(&[CODEC_VERSION, 1, 1, 0, 0, 0, 0xff]), Err(DecodeError::Utf8));
  }

  #[test]
  fn alias_marker() {
    assert_eq!(resolve_alias(b"@alice"), Some("alice".to_string()));
    assert_eq!(resolve_alias(b"@"), Some(String::new()));
    assert_eq!(resolve_alias(b"alice"), None);
    assert_eq!(resolve_alias(b" @alice"), None);
    assert_eq!(resolve_alias(&[0x40, 0xff]), None);
    // Un registro codificado nunca parece un alias.
    assert_eq!(resolve_alias(&encode(&alice())), None);
  }

  fn opt_string() -> impl Strategy<Value = Option<String>> {
    proptest::option::of(".{0,12}")
  }

  fn social() -> impl Strategy<Value = SocialEntry> {
    (".{0,8}", opt_string(), opt_string(), opt_string(), proptest::option::of(any::<bool>()))
      .prop_map(|(code, name, desc, link, special)| SocialEntry { code, name, desc, link, special })
  }

  fn record() -> impl Strategy<Value = ArtistRecord> {
    (
      opt_string(),
      opt_string(),
      opt_string(),
      proptest::option::of(proptest::collection::vec(".{0,8}", 0..4)),
      proptest::option::of(proptest::collection::vec(social(), 0..4)),
    )
      .prop_map(|(name, avatar, flag, aliases, socials)| ArtistRecord { name, avatar, flag, aliases, socials })
  }

  proptest! {
    #[test]
    fn decode_inverts_encode(record in record()) {
      prop_assert_eq!(decode(&encode(&record)), Some(record));
    }

    #[test]
    fn alias_suffix_is_exact(suffix in ".{0,24}") {
      let payload = format!("@{suffix}");
      prop_assert_eq!(resolve_alias(payload.as_bytes()), Some(suffix));
    }

    #[test]
    fn decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
      let _ = decode(&bytes);
    }
  }
}
