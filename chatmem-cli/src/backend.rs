//! Backend construction from configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use chatmem_common::Config;
use chatmem_memory::{InMemoryListStore, ListStore, RedisListStore, ShortTermMemory};
use chatmem_search::{
    DenseIndex, EmbeddingProvider, FaqIndexer, HttpEmbedding, HybridSearcher, KeywordIndex,
    KeywordSearch, QdrantFaqIndex,
};

/// Session list store: Redis, or process memory with `--in-memory`.
pub async fn list_store(config: &Config, in_memory: bool) -> Result<Arc<dyn ListStore>> {
    if in_memory {
        tracing::info!("Using in-process session store");
        return Ok(Arc::new(InMemoryListStore::new()));
    }

    let store = RedisListStore::connect(&config.redis)
        .await
        .with_context(|| format!("Failed to connect to Redis at {}", config.redis.endpoint()))?;
    Ok(Arc::new(store))
}

/// Session memory over the selected store.
pub async fn memory(config: &Config, in_memory: bool) -> Result<ShortTermMemory> {
    let store = list_store(config, in_memory).await?;
    Ok(ShortTermMemory::new(store, &config.memory)?)
}

/// Search backends built from the `search` section.
pub struct SearchParts {
    pub dense: Arc<dyn DenseIndex>,
    pub keyword: Arc<dyn KeywordSearch>,
    pub embedding: Arc<dyn EmbeddingProvider>,
}

impl SearchParts {
    pub fn searcher(&self, config: &Config) -> HybridSearcher {
        HybridSearcher::new(
            self.dense.clone(),
            self.keyword.clone(),
            self.embedding.clone(),
        )
        .with_weights(config.search.vector_weight, config.search.keyword_weight)
    }

    pub fn indexer(&self) -> FaqIndexer {
        FaqIndexer::new(
            self.dense.clone(),
            self.keyword.clone(),
            self.embedding.clone(),
        )
    }
}

pub async fn search_parts(config: &Config) -> Result<SearchParts> {
    let search = &config.search;

    let embedding: Arc<dyn EmbeddingProvider> = Arc::new(HttpEmbedding::new(&search.embedding)?);
    let dense = QdrantFaqIndex::connect(
        &search.qdrant_url,
        &search.collection,
        embedding.dimensions(),
    )
    .await
    .with_context(|| format!("Failed to connect to Qdrant at {}", search.qdrant_url))?;
    let keyword = KeywordIndex::open(&search.keyword_db_path())?;

    Ok(SearchParts {
        dense: Arc::new(dense),
        keyword: Arc::new(keyword),
        embedding,
    })
}
