pub mod config;
pub mod http;

pub use config::RemoteConfig;
pub use http::{HttpRemote, RemoteError};
