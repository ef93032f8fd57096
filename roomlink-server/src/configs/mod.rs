mod settings;
mod storage;

pub use settings::{Database, Device, Fanout, Logger, Server, Settings};
pub use storage::Storage;
