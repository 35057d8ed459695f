// Store contract checks run against every backend.

use std::sync::Arc;

use serde_json::json;
use sgcache::{FileKvStore, KvStore, MemoryKvStore, StoreConfig, TK_KEY, TkCache, TkItem};
use tempfile::TempDir;

async fn check_round_trip(store: &dyn KvStore) {
    let values = [
        json!(null),
        json!(3.5),
        json!("text"),
        json!([1, "two", {"three": 3}]),
        json!({"nested": {"list": [true, false]}}),
    ];
    for (i, value) in values.into_iter().enumerate() {
        let key = format!("key-{i}");
        store.put(&key, value.clone()).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(value));
    }
}

async fn check_missing_key(store: &dyn KvStore) {
    assert_eq!(store.get("never-written").await.unwrap(), None);
}

async fn check_last_write_wins(store: &dyn KvStore) {
    store.put("lww", json!({"v": 1})).await.unwrap();
    let first = store.get_record("lww").await.unwrap().unwrap();
    store.put("lww", json!({"v": 2})).await.unwrap();
    let second = store.get_record("lww").await.unwrap().unwrap();

    assert_eq!(store.get("lww").await.unwrap(), Some(json!({"v": 2})));
    assert!(second.updated_at > first.updated_at);
}

async fn check_facade(store: Arc<dyn KvStore>) {
    let cache = TkCache::new(store.clone());
    assert_eq!(cache.get_cached_list().await.unwrap(), None);

    store.put(TK_KEY, json!({"not": "a list"})).await.unwrap();
    assert_eq!(cache.get_cached_list().await.unwrap(), None);

    cache.set_cached_list(&[TkItem::new("Q1", "A1")]).await.unwrap();
    let items = cache.get_cached_list().await.unwrap().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].question, "Q1");
    assert_eq!(items[0].answer, "A1");
    assert_eq!(cache.get_cached_list().await.unwrap(), Some(items));
}

#[tokio::test]
async fn memory_store_contract() {
    let store = Arc::new(MemoryKvStore::new());
    check_round_trip(store.as_ref()).await;
    check_missing_key(store.as_ref()).await;
    check_last_write_wins(store.as_ref()).await;
    check_facade(store).await;
}

#[tokio::test]
async fn file_store_contract() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileKvStore::new(StoreConfig::new(temp_dir.path())));
    check_round_trip(store.as_ref()).await;
    check_missing_key(store.as_ref()).await;
    check_last_write_wins(store.as_ref()).await;
    check_facade(store.clone()).await;
    assert_eq!(store.open_connections(), 0);
}

#[tokio::test]
async fn sequential_writers_from_separate_handles() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::new(temp_dir.path());
    let alice = TkCache::new(Arc::new(FileKvStore::new(config.clone())));
    let bob = TkCache::new(Arc::new(FileKvStore::new(config.clone())));

    alice.set_cached_list(&[TkItem::new("from", "alice")]).await.unwrap();
    bob.set_cached_list(&[TkItem::new("from", "bob")]).await.unwrap();

    let observer = TkCache::new(Arc::new(FileKvStore::new(config)));
    let items = observer.get_cached_list().await.unwrap().unwrap();
    assert_eq!(items, vec![TkItem::new("from", "bob")]);
}

#[tokio::test]
async fn abandoned_operations_release_connections() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileKvStore::new(StoreConfig::new(temp_dir.path())));

    for i in 0..20 {
        let pending = store.put("k", json!(i));
        // Poll once at most, then drop the future.
        let _ = tokio::time::timeout(std::time::Duration::ZERO, pending).await;
    }
    assert_eq!(store.open_connections(), 0);

    store.put("k", json!("final")).await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), Some(json!("final")));

    let dir = temp_dir.path().join("sg").join("kv");
    let leftovers: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .filter(|name| name.to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}
