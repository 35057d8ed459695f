// Keyed record store.
// Durable key -> JSON value mapping with a per-key update timestamp.

pub mod file;
pub mod memory;
pub mod paths;

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

pub use file::FileKvStore;
pub use memory::MemoryKvStore;

/// A stored unit: one value under one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub key: String,
    /// Opaque to the store; only callers interpret it.
    pub value: Value,
    /// Milliseconds since the Unix epoch of the last write.
    pub updated_at: i64,
}

impl Record {
    pub fn updated_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.updated_at)
    }
}

/// Async key-addressed storage of arbitrary JSON values.
///
/// A write fully replaces any previous record for the key. Missing keys are
/// reported as `Ok(None)`, never as errors.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Look up the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.get_record(key).await?.map(|record| record.value))
    }

    /// Create or overwrite the record for `key`.
    async fn put(&self, key: &str, value: Value) -> Result<()>;

    /// Look up the full record, including its timestamp.
    async fn get_record(&self, key: &str) -> Result<Option<Record>>;

    /// All keys, least recently updated first.
    async fn keys(&self) -> Result<Vec<String>>;
}

/// Issues `updatedAt` stamps that never go backwards, even when two writes
/// land in the same millisecond or the wall clock steps back.
#[derive(Debug, Default)]
pub(crate) struct StampClock {
    last: AtomicI64,
}

impl StampClock {
    /// Next stamp, strictly greater than `previous` when one is known.
    pub(crate) fn next_after(&self, previous: Option<i64>) -> i64 {
        let now = Utc::now().timestamp_millis();
        let floor = previous.map_or(now, |prev| now.max(prev + 1));
        let last = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(floor.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        floor.max(last + 1)
    }
}
