pub mod config_io;
pub mod kv;
pub mod persist;
pub mod recovery;
pub mod store;
pub mod watcher;
