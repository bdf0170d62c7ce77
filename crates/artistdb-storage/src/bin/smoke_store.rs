use artistdb_core::ArtistRecord;
use artistdb_core::codec;
use artistdb_core::ports::{KeyValueStore, Namespace};
use artistdb_storage::SqliteStore;

#[tokio::main(flavor = "current_thread")]
async fn main() {
  // Base desechable en el directorio actual; no pasa por LOCAL_STORE.
  let store = SqliteStore::open_at("artistdb-smoke.db".as_ref()).expect("failed to open store");

  let record = ArtistRecord {
    name: Some("Test Artist".to_string()),
    flag: Some("es".to_string()),
    aliases: Some(vec!["TA".to_string()]),
    ..Default::default()
  };

  println!("Saving artist 'test-artist'");

  store.put(Namespace::Artists, "test-artist", codec::encode(&record)).await.expect("failed to save artist");
  store.put(Namespace::Config, "hash", b"smoke".to_vec()).await.expect("failed to save hash");

  let bytes = store.get(Namespace::Artists, "test-artist").await.expect("failed to load artist");
  let loaded = bytes.map(|b| codec::try_decode(&b)).transpose().expect("stored record is not decodable");

  println!("Loaded from DB: {loaded:?}");
}
