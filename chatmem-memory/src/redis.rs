//! Redis-backed list store.
//!
//! Holds one long-lived [`ConnectionManager`] for the life of the store; each
//! call clones the handle (which shares the underlying multiplexed connection)
//! instead of opening a new socket. Reconnects are handled by the manager.

use async_trait::async_trait;
use chatmem_common::RedisConfig;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};

use crate::error::{MemoryError, MemoryResult};
use crate::store::{decode_entries, ListStore};

/// Session list store on top of Redis LPUSH/LTRIM/LRANGE.
pub struct RedisListStore {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisListStore {
    /// Connect using host/port/db from `config`.
    ///
    /// Errors when the server cannot be reached once the connection
    /// manager's own retry budget is exhausted.
    pub async fn connect(config: &RedisConfig) -> MemoryResult<Self> {
        let client = redis::Client::open(connection_info(config))?;
        let conn = client.get_connection_manager().await?;

        tracing::info!(
            host = %config.host,
            port = config.port,
            db = config.db,
            "Connected to Redis"
        );

        Ok(Self {
            conn,
            key_prefix: config.key_prefix.clone(),
        })
    }

    /// Build a store from an existing connection manager.
    pub fn from_manager(conn: ConnectionManager, key_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Get the prefixed key name.
    fn prefixed_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

/// Connection parameters taken field by field, so passwords never pass through
/// URL parsing.
fn connection_info(config: &RedisConfig) -> ConnectionInfo {
    ConnectionInfo {
        addr: ConnectionAddr::Tcp(config.host.clone(), config.port),
        redis: RedisConnectionInfo {
            db: config.db,
            password: config.password.clone(),
            ..RedisConnectionInfo::default()
        },
    }
}

/// LTRIM stop index keeping the first `max_len` entries.
fn trim_stop(max_len: usize) -> isize {
    isize::try_from(max_len).map_or(isize::MAX, |n| n - 1)
}

/// LRANGE stop index for an optional limit (`-1` means "to the end").
fn range_stop(limit: Option<usize>) -> isize {
    match limit {
        Some(n) if n > 0 => isize::try_from(n).map_or(-1, |n| n - 1),
        _ => -1,
    }
}

#[async_trait]
impl ListStore for RedisListStore {
    fn name(&self) -> &str {
        "redis"
    }

    async fn push_bounded(&self, key: &str, value: &str, max_len: usize) -> MemoryResult<usize> {
        if max_len == 0 {
            return Err(MemoryError::Config("max_len must be at least 1".into()));
        }

        let key = self.prefixed_key(key);
        let mut conn = self.conn.clone();

        // MULTI/EXEC so concurrent writers never observe an untrimmed list.
        let (len,): (usize,) = redis::pipe()
            .atomic()
            .lpush(&key, value)
            .ignore()
            .ltrim(&key, 0, trim_stop(max_len))
            .ignore()
            .llen(&key)
            .query_async(&mut conn)
            .await?;

        tracing::debug!(key = %key, len, "Stored message in Redis");
        Ok(len)
    }

    async fn range(&self, key: &str, limit: Option<usize>) -> MemoryResult<Vec<String>> {
        if limit == Some(0) {
            return Ok(Vec::new());
        }

        let key = self.prefixed_key(key);
        let mut conn = self.conn.clone();
        let raw: Vec<Vec<u8>> = conn.lrange(&key, 0, range_stop(limit)).await?;
        decode_entries(&key, raw)
    }

    async fn len(&self, key: &str) -> MemoryResult<usize> {
        let key = self.prefixed_key(key);
        let mut conn = self.conn.clone();
        let len: usize = conn.llen(&key).await?;
        Ok(len)
    }

    async fn delete(&self, key: &str) -> MemoryResult<bool> {
        let key = self.prefixed_key(key);
        let mut conn = self.conn.clone();
        let removed: usize = conn.del(&key).await?;

        tracing::debug!(key = %key, removed, "Deleted session list from Redis");
        Ok(removed > 0)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        match redis::cmd("PING").query_async::<String>(&mut conn).await {
            Ok(response) => response == "PONG",
            Err(_) => false,
        }
    }
}
