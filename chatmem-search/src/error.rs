//! Error types for FAQ retrieval.

use chatmem_common::ErrorKind;
use thiserror::Error;

/// Result type for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// FAQ retrieval errors.
#[derive(Error, Debug)]
pub enum SearchError {
    /// A row or query does not fit the collection schema.
    #[error("Schema error: {0}")]
    Schema(String),

    /// The embedding endpoint failed or returned unusable vectors.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Qdrant request failed.
    #[error("Vector index error: {0}")]
    VectorIndex(String),

    /// SQLite request failed.
    #[error("Keyword index error: {0}")]
    KeywordIndex(#[from] rusqlite::Error),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// File or task I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON input.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid search parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<qdrant_client::QdrantError> for SearchError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        Self::VectorIndex(err.to_string())
    }
}

impl From<tokio::task::JoinError> for SearchError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Io(std::io::Error::other(err))
    }
}

impl ErrorKind for SearchError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Schema(_) => "SchemaError",
            Self::Embedding(_) | Self::Http(_) => "EmbeddingError",
            Self::VectorIndex(_) => "VectorIndexError",
            Self::KeywordIndex(_) => "KeywordIndexError",
            Self::Io(_) => "IoError",
            Self::Json(_) => "JsonError",
            Self::InvalidInput(_) => "InvalidInput",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(SearchError::Schema("x".into()).kind(), "SchemaError");
        assert_eq!(
            SearchError::VectorIndex("down".into()).kind(),
            "VectorIndexError"
        );
        assert_eq!(SearchError::InvalidInput("x".into()).kind(), "InvalidInput");
    }

    #[test]
    fn display_includes_detail() {
        let err = SearchError::Embedding("dimension mismatch".into());
        assert_eq!(err.to_string(), "Embedding error: dimension mismatch");
    }
}
