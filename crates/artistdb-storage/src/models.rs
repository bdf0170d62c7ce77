use crate::schema::{artists, config};

use diesel::prelude::*;

#[derive(Debug, Insertable)]
#[diesel(table_name = artists)]
pub struct NewArtistRow<'a> {
  pub key: &'a str,
  /// Registro en el formato de `artistdb_core::codec`.
  pub value: &'a [u8],
}

#[derive(Debug, Insertable)]
#[diesel(table_name = config)]
pub struct NewConfigRow<'a> {
  pub key: &'a str,
  pub value: &'a [u8],
}
