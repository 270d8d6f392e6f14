//! Index traits and shared search types.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

use crate::error::SearchResult;
use crate::schema::FaqRecord;

/// Which text column a search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    #[default]
    Question,
    Answer,
}

impl SearchField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Answer => "answer",
        }
    }

    /// Text of this column in `record`.
    pub fn text_of(self, record: &FaqRecord) -> &str {
        match self {
            Self::Question => &record.question,
            Self::Answer => &record.answer,
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqHit {
    /// Record ID shared by every index.
    pub id: u64,
    pub question: String,
    pub answer: String,
    /// Relevance score; higher is better. Scale depends on the source.
    pub score: f32,
}

/// A record with its ID and one embedding per text column.
#[derive(Debug, Clone)]
pub struct EmbeddedFaq {
    pub id: u64,
    pub record: FaqRecord,
    pub question_vector: Vec<f32>,
    pub answer_vector: Vec<f32>,
}

/// Record ID derived from the question and answer text.
///
/// XXH3 output is fixed by its specification, so IDs stay valid across
/// toolchain upgrades. Only fully identical rows share an ID.
pub fn record_id(record: &FaqRecord) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.update(&(record.question.len() as u64).to_le_bytes());
    hasher.update(record.question.as_bytes());
    hasher.update(record.answer.as_bytes());
    hasher.digest()
}

/// Dense vector index over FAQ records.
#[async_trait]
pub trait DenseIndex: Send + Sync {
    /// Backend name (e.g. "qdrant").
    fn name(&self) -> &str;

    /// Insert or replace records.
    async fn upsert(&self, entries: &[EmbeddedFaq]) -> SearchResult<usize>;

    /// Nearest neighbours of `vector` among the given column's embeddings.
    async fn search(
        &self,
        vector: &[f32],
        field: SearchField,
        limit: usize,
    ) -> SearchResult<Vec<FaqHit>>;

    /// Health check: returns true if the backend is reachable.
    async fn health_check(&self) -> bool;
}

/// Keyword (full-text) index over FAQ records.
#[async_trait]
pub trait KeywordSearch: Send + Sync {
    /// Backend name (e.g. "sqlite").
    fn name(&self) -> &str;

    /// Insert or replace records.
    async fn upsert(&self, entries: &[(u64, FaqRecord)]) -> SearchResult<usize>;

    /// Ranked keyword matches in the given column.
    async fn search(&self, query: &str, field: SearchField, limit: usize)
        -> SearchResult<Vec<FaqHit>>;

    /// Number of indexed records.
    async fn count(&self) -> SearchResult<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_covers_question_and_answer() {
        let a = FaqRecord::new("When is the deadline?", "June");
        let b = FaqRecord::new("When is the deadline?", "July");
        assert_eq!(record_id(&a), record_id(&a.clone()));
        assert_ne!(record_id(&a), record_id(&b));
        assert_ne!(record_id(&a), record_id(&FaqRecord::new("Other?", "June")));
    }

    #[test]
    fn record_id_separates_columns() {
        let a = FaqRecord::new("ab", "c");
        let b = FaqRecord::new("a", "bc");
        assert_ne!(record_id(&a), record_id(&b));
    }

    #[test]
    fn field_selects_text() {
        let record = FaqRecord::new("q", "a");
        assert_eq!(SearchField::Question.text_of(&record), "q");
        assert_eq!(SearchField::Answer.text_of(&record), "a");
        assert_eq!(SearchField::default(), SearchField::Question);
    }
}
