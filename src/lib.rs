// sgcache: durable keyed record store with a typed item-list cache.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod tk;

pub use config::StoreConfig;
pub use error::{Result, SgError};
pub use store::{FileKvStore, KvStore, MemoryKvStore, Record};
pub use tk::{ItemId, TK_KEY, TkCache, TkItem};
