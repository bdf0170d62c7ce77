//! Preparación de las redes sociales y del avatar antes de exportar.
//!
//! En `artists.toml` una red se escribe como `{ code, name }`; el enlace y la
//! descripción que ve el cliente se derivan aquí a partir de la tabla de
//! plataformas conocidas.

use tracing::warn;

use artistdb_core::{ArtistRecord, SocialEntry};

/// Tamaño (px) que se pide a unavatar.
pub const UNAVATAR_SIZE: u16 = 400;

/// Plataforma conocida.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
  pub code: &'static str,
  pub display: &'static str,
  /// Perfil sin esquema; `{user}` se sustituye por el nombre de usuario.
  pub profile: Option<&'static str>,
  /// unavatar.io sabe sacar el avatar de esta plataforma.
  pub unavatar: bool,
}

const fn unavatar(code: &'static str, display: &'static str, profile: Option<&'static str>) -> Platform {
  Platform { code, display, profile, unavatar: true }
}

const fn extended(code: &'static str, display: &'static str, profile: &'static str) -> Platform {
  Platform { code, display, profile: Some(profile), unavatar: false }
}

const PLATFORMS: &[Platform] = &[
  unavatar("x", "𝕏", Some("twitter.com/{user}")),
  unavatar("twitter", "𝕏", Some("twitter.com/{user}")),
  unavatar("telegram", "Telegram", Some("t.me/{user}")),
  unavatar("deviantart", "DeviantArt", Some("deviantart.com/{user}")),
  unavatar("instagram", "Instagram", Some("instagram.com/{user}")),
  unavatar("dribbble", "Dribbble", Some("dribbble.com/{user}")),
  unavatar("duckduckgo", "DuckDuckGo", None),
  unavatar("reddit", "Reddit", Some("reddit.com/user/{user}")),
  unavatar("youtube", "YouTube", Some("youtube.com/@{user}")),
  unavatar("github", "GitHub", Some("github.com/{user}")),
  unavatar("google", "Google", None),
  unavatar("gravatar", "Gravatar", None),
  unavatar("microlink", "Microlink", None),
  unavatar("readcv", "ReadCV", Some("read.cv/{user}")),
  unavatar("soundcloud", "SoundCloud", Some("soundcloud.com/{user}")),
  unavatar("substack", "Substack", Some("{user}.substack.com/")),
  unavatar("subscribestar", "SubscribeStar", Some("subscribestar.adult/{user}")),
  unavatar("facebook", "Facebook", Some("fb.com/{user}")),
  unavatar("fb", "Facebook", Some("fb.com/{user}")),
  extended("fa", "FurAffinity 🐾", "www.furaffinity.net/user/{user}/"),
  extended("itaku", "Itaku", "itaku.ee/profile/{user}"),
  extended("bsky", "BlueSky", "bsky.app/profile/{user}"),
  extended("bluesky", "BlueSky", "bsky.app/profile/{user}"),
  extended("threads", "Threads", "www.threads.net/@{user}"),
  extended("tumblr", "Tumblr", "{user}.tumblr.com"),
  extended("pixiv", "Pixiv", "www.pixiv.net/en/users/{user}"),
  extended("patreon", "Patreon", "www.patreon.com/{user}"),
  extended("kofi", "Ko-fi", "ko-fi.com/{user}"),
  extended("plurk", "Plurk", "plurk.com/{user}"),
  extended("linktr.ee", "Linktr.ee", "linktr.ee/{user}"),
  extended("carrd.co", "Carrd.co", "{user}.carrd.co"),
  extended("lit.link", "Lit.link", "lit.link/{user}"),
  extended("potofu.me", "Potofu.me", "potofu.me/{user}"),
  extended("booth", "Booth.pm", "{user}.booth.pm"),
  extended("skeb", "Skeb.jp", "skeb.jp/@{user}"),
  extended("fanbox", "PixivFanbox", "{user}.fanbox.cc"),
  extended("picarto", "Picarto", "www.picarto.tv/{user}"),
  extended("gumroad", "Gumroad", "{user}.gumroad.com"),
  extended("twitch", "Twitch", "www.twitch.tv/{user}"),
];

/// Códigos de "link in bio": siempre se marcan como `special`.
const SPECIAL_CODES: &[&str] = &["potofu.me", "carrd.co", "linktr.ee", "lit.link"];

pub fn platform(code: &str) -> Option<&'static Platform> {
  PLATFORMS.iter().find(|p| p.code == code)
}

/// URL del perfil de `user` en `code`, si la plataforma tiene plantilla.
pub fn profile_link(code: &str, user: &str) -> Option<String> {
  let template = platform(code)?.profile?;
  Some(format!("https://{}", template.replace("{user}", user)))
}

/// Descripción que se muestra: nombre de la plataforma, seguido de la
/// descripción del directorio si la hay (`"Pixiv | bocetos"`).
pub fn describe(code: &str, desc: Option<&str>) -> String {
  let display = platform(code).map_or(code, |p| p.display);
  match desc.filter(|d| !d.is_empty()) {
    Some(desc) => format!("{display} | {desc}"),
    None => display.to_string(),
  }
}

fn unavatar_url(code: &str, user: &str) -> String {
  // unavatar conoce X por su nombre antiguo.
  let code = if code == "x" { "twitter" } else { code };
  format!("https://unavatar.io/{code}/{user}?size={UNAVATAR_SIZE}")
}

fn supports_unavatar(code: &str) -> bool {
  platform(code).is_some_and(|p| p.unavatar)
}

/// Normaliza una red: código en minúsculas, enlace derivado del usuario,
/// descripción con el nombre de la plataforma y marca `special`.
pub fn prepare_social(artist: &str, social: &mut SocialEntry) {
  social.code = social.code.to_lowercase();
  let known = platform(&social.code).is_some();

  match (known, &social.name, &social.link) {
    (true, Some(_), None) => {}
    (_, None, _) => warn!(artist = %artist, code = %social.code, "social without `name`"),
    (true, _, Some(_)) => warn!(artist = %artist, code = %social.code, "`link` is redundant for a known social"),
    (false, _, _) => warn!(artist = %artist, code = %social.code, "unsupported social code"),
  }

  if let Some(link) = social.name.as_deref().and_then(|name| profile_link(&social.code, name)) {
    social.link = Some(link);
  }
  social.desc = Some(describe(&social.code, social.desc.as_deref()));

  if social.special.is_none() && SPECIAL_CODES.contains(&social.code.as_str()) {
    social.special = Some(true);
  }
  social.mark_special();
}

/// Avatar final de un artista.
///
/// Una URL `http(s)://` o una ruta absoluta se respetan. `usuario@red` se
/// convierte en una URL de unavatar si la red lo permite. Si no, se usa la
/// primera red con nombre que unavatar soporte.
pub fn resolve_avatar(artist: &str, avatar: Option<&str>, socials: &[SocialEntry]) -> Option<String> {
  if let Some(avatar) = avatar {
    if avatar.starts_with("http://") {
      warn!(artist = %artist, "avatar URL is not secure");
      return Some(avatar.to_string());
    }
    if avatar.starts_with("https://") || avatar.starts_with('/') {
      return Some(avatar.to_string());
    }

    match avatar.split_once('@') {
      Some((user, code)) if !user.is_empty() && !code.contains('@') => {
        let code = code.to_lowercase();
        if supports_unavatar(&code) {
          return Some(unavatar_url(&code, user));
        }
        warn!(artist = %artist, code = %code, "unavatar does not support this social");
      }
      _ => warn!(artist = %artist, avatar = %avatar, "invalid avatar format"),
    }
  }

  socials.iter().find_map(|social| {
    let name = social.name.as_deref().filter(|n| !n.is_empty())?;
    let code = social.code.to_lowercase();
    supports_unavatar(&code).then(|| unavatar_url(&code, name))
  })
}

/// Copia del registro lista para el bridge binario.
pub fn prepare_record(artist: &str, record: &ArtistRecord) -> ArtistRecord {
  let mut record = record.clone();
  let socials = record.socials.as_deref().unwrap_or_default();
  record.avatar = resolve_avatar(artist, record.avatar.as_deref(), socials);

  for social in record.socials.iter_mut().flatten() {
    prepare_social(artist, social);
  }
  record
}
