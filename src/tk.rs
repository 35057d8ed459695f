// Typed cache of the question/answer item list.
// Binds the generic record store to one reserved, versioned key.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::store::KvStore;

/// Reserved key holding the item list. Bump the suffix on incompatible
/// changes to [`TkItem`] instead of migrating data in place.
pub const TK_KEY: &str = "tkList:v1";

/// Item identifier; callers use either numbers or strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(serde_json::Number),
    Text(String),
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        ItemId::Number(id.into())
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        ItemId::Text(id.to_string())
    }
}

/// A cached question/answer pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TkItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub question: String,
    pub answer: String,
    /// Auxiliary annotation owned by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexes: Option<String>,
}

impl TkItem {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: None,
            question: question.into(),
            answer: answer.into(),
            indexes: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<ItemId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_indexes(mut self, indexes: impl Into<String>) -> Self {
        self.indexes = Some(indexes.into());
        self
    }
}

/// Cache of "the item list", backed by any [`KvStore`].
///
/// Store errors are passed through untouched. Data under the reserved key
/// that is not a list of items is treated as a cache miss.
#[derive(Clone)]
pub struct TkCache {
    store: Arc<dyn KvStore>,
}

impl TkCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// The cached list, or None when nothing usable is cached.
    pub async fn get_cached_list(&self) -> Result<Option<Vec<TkItem>>> {
        let Some(value) = self.store.get(TK_KEY).await? else {
            debug!(key = TK_KEY, "item list not cached");
            return Ok(None);
        };
        Ok(decode_list(value))
    }

    pub async fn set_cached_list(&self, items: &[TkItem]) -> Result<()> {
        let value = serde_json::to_value(items)?;
        self.store.put(TK_KEY, value).await?;
        debug!(key = TK_KEY, count = items.len(), "item list cached");
        Ok(())
    }
}

fn decode_list(value: Value) -> Option<Vec<TkItem>> {
    if !value.is_array() {
        warn!(key = TK_KEY, kind = value_kind(&value), "cached item list is not a list, ignoring");
        return None;
    }
    match serde_json::from_value(value) {
        Ok(items) => Some(items),
        Err(e) => {
            warn!(key = TK_KEY, error = %e, "cached item list has malformed items, ignoring");
            None
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
