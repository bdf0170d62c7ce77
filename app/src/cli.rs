use clap::Parser;

/// Consulta el directorio de artistas a través de la caché local.
#[derive(Debug, Parser)]
#[command(name = "artistdb", version, about)]
pub struct Cli {
  /// Identificadores a consultar (una línea JSON por respuesta).
  #[arg(value_name = "ID", required_unless_present_any = ["resolve", "bridge"])]
  pub ids: Vec<String>,

  /// Resuelve un identificador por HTTP siguiendo su alias e imprime el texto.
  #[arg(long, value_name = "ID", conflicts_with_all = ["bridge", "ids"])]
  pub resolve: Option<String>,

  /// Como `--resolve`, pero por el bridge binario; imprime el registro en JSON.
  #[arg(long, value_name = "ID", conflicts_with = "ids")]
  pub bridge: Option<String>,

  /// Sustituye `[remote] base_url` para esta ejecución.
  #[arg(long, value_name = "URL")]
  pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  Lookup(Vec<String>),
  Resolve(String),
  Bridge(String),
}

impl Cli {
  pub fn command(&self) -> Command {
    match (&self.resolve, &self.bridge) {
      (Some(id), _) => Command::Resolve(id.clone()),
      (None, Some(id)) => Command::Bridge(id.clone()),
      (None, None) => Command::Lookup(self.ids.clone()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn picks_command_from_flags() {
    let cli = Cli::try_parse_from(["artistdb", "alice", "bob"]).unwrap();
    assert_eq!(cli.command(), Command::Lookup(vec!["alice".into(), "bob".into()]));

    let cli = Cli::try_parse_from(["artistdb", "--resolve", "carol"]).unwrap();
    assert_eq!(cli.command(), Command::Resolve("carol".into()));

    let cli = Cli::try_parse_from(["artistdb", "--bridge", "carol", "--base-url", "http://127.0.0.1:8080"]).unwrap();
    assert_eq!(cli.command(), Command::Bridge("carol".into()));
    assert_eq!(cli.base_url.as_deref(), Some("http://127.0.0.1:8080"));
  }

  #[test]
  fn rejects_ambiguous_invocations() {
    assert!(Cli::try_parse_from(["artistdb"]).is_err());
    assert!(Cli::try_parse_from(["artistdb", "alice", "--resolve", "bob"]).is_err());
    assert!(Cli::try_parse_from(["artistdb", "--resolve", "a", "--bridge", "b"]).is_err());
  }
}
