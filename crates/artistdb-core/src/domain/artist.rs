use serde::{Deserialize, Serialize};

/// Registro de un artista dentro del directorio.
///
/// Todos los campos son opcionales: un registro puede estar parcialmente
/// rellenado. La ausencia siempre es `None`, nunca un valor centinela
/// (cadena vacía, lista vacía...), para que el codec binario sea exacto.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRecord {
  /// Nombre para mostrar.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,

  /// URL del avatar, ruta absoluta del sitio o `usuario@red`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub avatar: Option<String>,

  /// Bandera / país (emoji o código).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub flag: Option<String>,

  /// Otros identificadores que redirigen a este registro.
  #[serde(default, alias = "alias", skip_serializing_if = "Option::is_none")]
  pub aliases: Option<Vec<String>>,

  /// Redes sociales, en el orden del directorio.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub socials: Option<Vec<SocialEntry>>,
}

/// Enlace a una red social de un artista.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialEntry {
  /// Código corto de la plataforma (`twitter`, `pixiv`, ...).
  pub code: String,

  /// Nombre de usuario en la plataforma.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub desc: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub link: Option<String>,

  /// Entrada no estándar / curada a mano (agregadores de enlaces, etc.).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub special: Option<bool>,
}

/// Hosts de agregadores de enlaces que marcan una red como `special`.
const SPECIAL_HOSTS: &[&str] = &["linktr.ee", "carrd.co", "potofu.me"];

/// `true` si el enlace apunta a un agregador de enlaces.
pub fn is_special_link(link: &str) -> bool {
  SPECIAL_HOSTS.iter().any(|host| link.contains(host))
}

impl SocialEntry {
  pub fn new(code: impl Into<String>) -> Self {
    Self { code: code.into(), ..Default::default() }
  }

  /// Marca la entrada como `special` si su enlace es un agregador y el
  /// directorio no lo decidió ya explícitamente.
  pub fn mark_special(&mut self) {
    if self.special.is_some() {
      return;
    }
    if self.link.as_deref().is_some_and(is_special_link) {
      self.special = Some(true);
    }
  }
}
