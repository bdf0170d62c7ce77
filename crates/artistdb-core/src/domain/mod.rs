pub mod artist;
pub mod directory;

pub use artist::{ArtistRecord, SocialEntry, is_special_link};
pub use directory::Directory;
