//! Ordered list store abstraction.
//!
//! Session history lives in one list per key, newest entry at index 0. Every
//! write is a prepend followed by a trim, performed atomically by the backend.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{MemoryError, MemoryResult};

/// Ordered per-key list storage (the shape of a Redis list).
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Backend name (e.g. "redis", "memory").
    fn name(&self) -> &str;

    /// Prepend `value` to the list at `key`, then keep only the first
    /// `max_len` entries. Both steps happen atomically.
    ///
    /// Returns the list length after trimming.
    async fn push_bounded(&self, key: &str, value: &str, max_len: usize) -> MemoryResult<usize>;

    /// Read entries most-recent-first. `limit = None` reads the whole list.
    ///
    /// A missing key yields an empty list.
    async fn range(&self, key: &str, limit: Option<usize>) -> MemoryResult<Vec<String>>;

    /// Number of entries at `key` (0 when missing).
    async fn len(&self, key: &str) -> MemoryResult<usize>;

    /// Remove the list at `key`. Returns true if it existed.
    async fn delete(&self, key: &str) -> MemoryResult<bool>;

    /// Health check: returns true if the backend is reachable.
    async fn health_check(&self) -> bool;
}

/// Decode raw list entries, reporting the first entry that is not UTF-8.
pub(crate) fn decode_entries(key: &str, raw: Vec<Vec<u8>>) -> MemoryResult<Vec<String>> {
    raw.into_iter()
        .enumerate()
        .map(|(index, bytes)| {
            String::from_utf8(bytes).map_err(|source| MemoryError::Decode {
                key: key.to_string(),
                index,
                source,
            })
        })
        .collect()
}

/// In-process list store for local runs and tests.
///
/// A single write lock covers prepend-and-trim, which gives the same
/// per-key atomicity as a Redis MULTI/EXEC block.
#[derive(Default)]
pub struct InMemoryListStore {
    lists: RwLock<HashMap<String, VecDeque<Vec<u8>>>>,
}

impl InMemoryListStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend raw bytes without trimming or UTF-8 checks.
    ///
    /// Lets callers reproduce entries written by foreign clients.
    pub async fn push_raw(&self, key: &str, bytes: Vec<u8>) {
        let mut lists = self.lists.write().await;
        lists.entry(key.to_string()).or_default().push_front(bytes);
    }

    /// Number of keys currently held.
    pub async fn key_count(&self) -> usize {
        self.lists.read().await.len()
    }
}

#[async_trait]
impl ListStore for InMemoryListStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn push_bounded(&self, key: &str, value: &str, max_len: usize) -> MemoryResult<usize> {
        if max_len == 0 {
            return Err(MemoryError::Config("max_len must be at least 1".into()));
        }

        let mut lists = self.lists.write().await;
        let list = lists.entry(key.to_string()).or_default();
        list.push_front(value.as_bytes().to_vec());
        list.truncate(max_len);
        Ok(list.len())
    }

    async fn range(&self, key: &str, limit: Option<usize>) -> MemoryResult<Vec<String>> {
        let lists = self.lists.read().await;
        let Some(list) = lists.get(key) else {
            return Ok(Vec::new());
        };

        let take = limit.unwrap_or(list.len());
        let raw: Vec<Vec<u8>> = list.iter().take(take).cloned().collect();
        decode_entries(key, raw)
    }

    async fn len(&self, key: &str) -> MemoryResult<usize> {
        Ok(self.lists.read().await.get(key).map_or(0, VecDeque::len))
    }

    async fn delete(&self, key: &str) -> MemoryResult<bool> {
        Ok(self.lists.write().await.remove(key).is_some())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn push_bounded_prepends_and_trims() {
        let store = InMemoryListStore::new();
        for i in 0..5 {
            store.push_bounded("k", &format!("m{i}"), 3).await.unwrap();
        }
        let entries = store.range("k", None).await.unwrap();
        assert_eq!(entries, vec!["m4", "m3", "m2"]);
        assert_eq!(store.len("k").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn range_with_limit() {
        let store = InMemoryListStore::new();
        for i in 0..4 {
            store.push_bounded("k", &format!("m{i}"), 10).await.unwrap();
        }
        assert_eq!(store.range("k", Some(2)).await.unwrap(), vec!["m3", "m2"]);
        assert_eq!(store.range("k", Some(10)).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn missing_key_is_empty() {
        let store = InMemoryListStore::new();
        assert!(store.range("nope", None).await.unwrap().is_empty());
        assert_eq!(store.len("nope").await.unwrap(), 0);
        assert!(!store.delete("nope").await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_key() {
        let store = InMemoryListStore::new();
        store.push_bounded("k", "a", 5).await.unwrap();
        assert!(store.delete("k").await.unwrap());
        assert_eq!(store.key_count().await, 0);
    }

    #[tokio::test]
    async fn zero_max_len_rejected() {
        let store = InMemoryListStore::new();
        let err = store.push_bounded("k", "a", 0).await.unwrap_err();
        assert!(matches!(err, MemoryError::Config(_)));
    }

    #[tokio::test]
    async fn invalid_utf8_surfaces_decode_error() {
        let store = InMemoryListStore::new();
        store.push_bounded("k", "fine", 5).await.unwrap();
        store.push_raw("k", vec![0xc3, 0x28]).await;

        let err = store.range("k", None).await.unwrap_err();
        assert!(matches!(err, MemoryError::Decode { index: 0, .. }));
    }
}
