//! Hybrid search combining dense and keyword retrieval.
//!
//! ```text
//! Query → Embedding → Dense Search ───┐
//!                                     ├── Weighted Fusion → Results
//! Query → FTS5 ─────→ Keyword Search ─┘
//! ```
//!
//! The path actually taken is reported with the results; a keyword failure
//! degrades to dense-only results instead of an empty list.

use std::sync::Arc;

use serde::Serialize;

use crate::embedding::EmbeddingProvider;
use crate::error::{SearchError, SearchResult};
use crate::fusion::weighted_fusion;
use crate::traits::{DenseIndex, FaqHit, KeywordSearch, SearchField};

/// Default weight for dense results (70%).
pub const DEFAULT_VECTOR_WEIGHT: f32 = 0.7;

/// Default weight for keyword results (30%).
pub const DEFAULT_KEYWORD_WEIGHT: f32 = 0.3;

/// How a result set was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum SearchPath {
    /// Both sources answered and were fused.
    Hybrid,
    /// Keyword search failed; results are dense-only.
    DenseFallback { reason: String },
}

/// Results together with the path that produced them.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub hits: Vec<FaqHit>,
    #[serde(flatten)]
    pub path: SearchPath,
}

impl SearchOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self.path, SearchPath::DenseFallback { .. })
    }
}

/// Dense + keyword FAQ search.
pub struct HybridSearcher {
    dense: Arc<dyn DenseIndex>,
    keyword: Arc<dyn KeywordSearch>,
    embedding: Arc<dyn EmbeddingProvider>,
    vector_weight: f32,
    keyword_weight: f32,
}

impl HybridSearcher {
    /// Create a searcher with default weights (70% dense, 30% keyword).
    pub fn new(
        dense: Arc<dyn DenseIndex>,
        keyword: Arc<dyn KeywordSearch>,
        embedding: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            dense,
            keyword,
            embedding,
            vector_weight: DEFAULT_VECTOR_WEIGHT,
            keyword_weight: DEFAULT_KEYWORD_WEIGHT,
        }
    }

    /// Override the fusion weights.
    pub fn with_weights(mut self, vector_weight: f32, keyword_weight: f32) -> Self {
        self.vector_weight = vector_weight;
        self.keyword_weight = keyword_weight;
        self
    }

    pub fn vector_weight(&self) -> f32 {
        self.vector_weight
    }

    pub fn keyword_weight(&self) -> f32 {
        self.keyword_weight
    }

    /// Search one column.
    ///
    /// Both sources are queried concurrently with `limit * 2` candidates each.
    /// A dense failure (including a failed query embedding) fails the search.
    pub async fn search(
        &self,
        query: &str,
        field: SearchField,
        limit: usize,
    ) -> SearchResult<SearchOutcome> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidInput("query is empty".into()));
        }
        if limit == 0 {
            return Ok(SearchOutcome {
                hits: Vec::new(),
                path: SearchPath::Hybrid,
            });
        }

        let fetch_limit = limit.saturating_mul(2);
        let dense_leg = async {
            let vector = self.embedding.embed_one(query).await?;
            self.dense.search(&vector, field, fetch_limit).await
        };
        let keyword_leg = self.keyword.search(query, field, fetch_limit);

        let (dense_hits, keyword_hits) = tokio::join!(dense_leg, keyword_leg);
        let dense_hits = dense_hits?;

        match keyword_hits {
            Ok(keyword_hits) => {
                let hits = weighted_fusion(
                    &dense_hits,
                    &keyword_hits,
                    self.vector_weight,
                    self.keyword_weight,
                    limit,
                );
                tracing::debug!(
                    field = %field,
                    dense = dense_hits.len(),
                    keyword = keyword_hits.len(),
                    returned = hits.len(),
                    "Hybrid search complete"
                );
                Ok(SearchOutcome {
                    hits,
                    path: SearchPath::Hybrid,
                })
            }
            Err(e) => {
                tracing::warn!(
                    field = %field,
                    backend = self.keyword.name(),
                    error = %e,
                    "Keyword search failed, falling back to dense results"
                );
                let mut hits = dense_hits;
                hits.truncate(limit);
                Ok(SearchOutcome {
                    hits,
                    path: SearchPath::DenseFallback {
                        reason: e.to_string(),
                    },
                })
            }
        }
    }

    /// Check health of both backends.
    ///
    /// # Returns
    /// Tuple of (dense_healthy, keyword_healthy)
    pub async fn health_check(&self) -> (bool, bool) {
        let (dense, keyword) = tokio::join!(self.dense.health_check(), self.keyword.count());
        (dense, keyword.is_ok())
    }
}
