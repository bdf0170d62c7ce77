pub mod remote;
pub mod store;

pub use remote::{FetchError, RemoteSource};
pub use store::{KeyValueStore, Namespace, StoreError};
