pub mod io;
pub mod watch;

pub use io::{atomic_write, atomic_write_str};
pub use watch::{FileWatcher, FsError, watch_file};
