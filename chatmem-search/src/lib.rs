//! chatmem search - FAQ retrieval.
//!
//! This crate provides:
//! - The FAQ collection schema and row validation
//! - Embedding providers (OpenAI-compatible HTTP, no-op)
//! - A Qdrant dense index and an SQLite FTS5 keyword index
//! - Hybrid search with weighted fusion and an explicit dense fallback
//! - Bulk ingestion into both indexes

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod embedding;
pub mod error;
pub mod fusion;
pub mod hybrid;
pub mod indexer;
pub mod keyword;
pub mod qdrant;
pub mod schema;
pub mod traits;

// Re-export commonly used types
pub use embedding::{EmbeddingProvider, HttpEmbedding, NoopEmbedding};
pub use error::{SearchError, SearchResult};
pub use fusion::{normalize_scores, weighted_fusion};
pub use hybrid::{
    HybridSearcher, SearchOutcome, SearchPath, DEFAULT_KEYWORD_WEIGHT, DEFAULT_VECTOR_WEIGHT,
};
pub use indexer::FaqIndexer;
pub use keyword::KeywordIndex;
pub use qdrant::QdrantFaqIndex;
pub use schema::{load_rows, parse_rows, CollectionSchema, FaqRecord, FieldSchema, FieldType};
pub use traits::{record_id, DenseIndex, EmbeddedFaq, FaqHit, KeywordSearch, SearchField};
