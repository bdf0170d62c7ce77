pub mod artist_client;
pub mod sync_service;
pub mod sync_worker;

#[cfg(test)]
pub(crate) mod testing;

pub use artist_client::ArtistClient;
pub use sync_service::{DIRECTORY_PATH, HASH_KEY, HASH_PATH, LookupResponse, SyncService};
pub use sync_worker::SyncWorker;
