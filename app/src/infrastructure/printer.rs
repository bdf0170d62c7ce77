use std::io::Write;

use serde::Serialize;

use artistdb_core::ArtistRecord;
use artistdb_core::services::LookupResponse;

/// Una respuesta de consulta, etiquetada con el identificador pedido.
#[derive(Serialize)]
struct LookupLine<'a> {
  id: &'a str,
  #[serde(flatten)]
  response: &'a LookupResponse,
}

/// Salida en JSON lines: un objeto por línea, listo para `jq`.
pub struct JsonLinesPrinter<W: Write> {
  out: W,
}

impl<W: Write> JsonLinesPrinter<W> {
  pub fn new(out: W) -> Self {
    Self { out }
  }

  pub fn response(&mut self, id: &str, response: &LookupResponse) -> anyhow::Result<()> {
    self.line(&LookupLine { id, response })
  }

  pub fn record(&mut self, record: &ArtistRecord) -> anyhow::Result<()> {
    self.line(record)
  }

  fn line<T: Serialize + ?Sized>(&mut self, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer(&mut self.out, value)?;
    writeln!(self.out)?;
    self.out.flush()?;
    Ok(())
  }

  pub fn into_inner(self) -> W {
    self.out
  }
}
