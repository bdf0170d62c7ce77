pub mod codec;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod services;

pub use domain::{ArtistRecord, Directory, SocialEntry};
pub use errors::CoreError;
