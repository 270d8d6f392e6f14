//! Integration tests for the Redis list store.
//!
//! Requires Redis to be running: docker run -p 6379:6379 redis
//! Run with: cargo test --test redis_integration -- --ignored

#![cfg(feature = "redis-backend")]

use std::sync::Arc;

use chatmem_common::{MemoryConfig, RedisConfig};
use chatmem_memory::{ListStore, RedisListStore, ShortTermMemory};

async fn connect() -> RedisListStore {
    let config = RedisConfig {
        key_prefix: format!("chatmem_test_{}:", unique_suffix()),
        ..RedisConfig::default()
    };
    RedisListStore::connect(&config)
        .await
        .expect("Failed to connect to Redis")
}

fn unique_suffix() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos().to_string())
        .unwrap_or_default()
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn redis_health_check() {
    let store = connect().await;
    assert!(store.health_check().await);
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn redis_push_trims_to_bound() {
    let store = connect().await;
    for i in 0..20 {
        let len = store.push_bounded("s", &format!("m{i}"), 15).await.unwrap();
        assert!(len <= 15);
    }

    let records = store.range("s", None).await.unwrap();
    assert_eq!(records.len(), 15);
    assert_eq!(records[0], "m19");
    assert_eq!(records[14], "m5");

    assert_eq!(store.range("s", Some(3)).await.unwrap(), vec!["m19", "m18", "m17"]);
    assert!(store.delete("s").await.unwrap());
    assert_eq!(store.len("s").await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn redis_backed_memory_round_trip() {
    let store: Arc<dyn ListStore> = Arc::new(connect().await);
    let memory = ShortTermMemory::new(store, &MemoryConfig::default()).unwrap();

    memory.store("session", "a").await.unwrap();
    memory.store("session", "b").await.unwrap();
    assert_eq!(memory.retrieve("session").await.unwrap(), vec!["b", "a"]);

    memory.delete("session").await.unwrap();
    assert!(memory.retrieve("session").await.unwrap().is_empty());
    assert!(memory.retrieve("missing").await.unwrap().is_empty());
}
