// In-process record store.
// Same contract as the file store, for tests and sessions that need no durability.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{KvStore, Record, StampClock};
use crate::error::Result;

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    records: RwLock<HashMap<String, Record>>,
    clock: StampClock,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn put(&self, key: &str, value: Value) -> Result<()> {
        let mut records = self.records.write().await;
        let previous = records.get(key).map(|record| record.updated_at);
        let record = Record {
            key: key.to_string(),
            value,
            updated_at: self.clock.next_after(previous),
        };
        records.insert(key.to_string(), record);
        Ok(())
    }

    async fn get_record(&self, key: &str) -> Result<Option<Record>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let records = self.records.read().await;
        let mut stamped: Vec<_> = records
            .values()
            .map(|record| (record.updated_at, record.key.clone()))
            .collect();
        stamped.sort();
        Ok(stamped.into_iter().map(|(_, key)| key).collect())
    }
}
