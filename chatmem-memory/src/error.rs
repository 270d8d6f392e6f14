//! Error types for session memory.

use chatmem_common::ErrorKind;
use thiserror::Error;

/// Result type for memory operations.
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Session memory errors.
#[derive(Error, Debug)]
pub enum MemoryError {
    /// The backing list store failed or could not be reached.
    #[error("Store error: {0}")]
    Store(String),

    /// Redis client error, passed through unchanged.
    #[cfg(feature = "redis-backend")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A stored entry is not valid UTF-8.
    #[error("Entry {index} under key {key} is not valid UTF-8: {source}")]
    Decode {
        key: String,
        index: usize,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Window sizes or connection settings are unusable.
    #[error("Invalid memory configuration: {0}")]
    Config(String),
}

impl MemoryError {
    /// True when the error came from the backing store rather than from data
    /// or configuration.
    pub fn is_store_failure(&self) -> bool {
        match self {
            Self::Store(_) => true,
            #[cfg(feature = "redis-backend")]
            Self::Redis(_) => true,
            _ => false,
        }
    }
}

impl ErrorKind for MemoryError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Store(_) => "StoreError",
            #[cfg(feature = "redis-backend")]
            Self::Redis(_) => "StoreError",
            Self::Decode { .. } => "DecodeError",
            Self::Config(_) => "ConfigError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(MemoryError::Store("down".into()).kind(), "StoreError");
        assert_eq!(MemoryError::Config("bad".into()).kind(), "ConfigError");
        assert!(MemoryError::Store("down".into()).is_store_failure());
        assert!(!MemoryError::Config("bad".into()).is_store_failure());
    }

    #[test]
    fn test_decode_error_message() {
        let source = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        let err = MemoryError::Decode {
            key: "user_1".into(),
            index: 2,
            source,
        };
        assert_eq!(err.kind(), "DecodeError");
        assert!(err.to_string().contains("user_1"));
    }
}
