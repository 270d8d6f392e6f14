//! Text embedding providers.

use std::time::Duration;

use async_trait::async_trait;
use chatmem_common::EmbeddingConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{SearchError, SearchResult};

/// Turns text into dense vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name (e.g. "http", "noop").
    fn name(&self) -> &str;

    /// Length of every returned vector.
    fn dimensions(&self) -> usize;

    /// Embed a batch; output order matches input order.
    async fn embed(&self, texts: &[&str]) -> SearchResult<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed_one(&self, text: &str) -> SearchResult<Vec<f32>> {
        self.embed(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SearchError::Embedding("no embedding returned".into()))
    }
}

/// Provider for keyword-only setups. Has zero dimensions and embeds nothing.
pub struct NoopEmbedding;

#[async_trait]
impl EmbeddingProvider for NoopEmbedding {
    fn name(&self) -> &str {
        "noop"
    }

    fn dimensions(&self) -> usize {
        0
    }

    async fn embed(&self, _texts: &[&str]) -> SearchResult<Vec<Vec<f32>>> {
        Err(SearchError::Embedding(
            "embeddings are disabled for this configuration".into(),
        ))
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// Client for an OpenAI-compatible `/v1/embeddings` endpoint.
pub struct HttpEmbedding {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    dimensions: usize,
}

impl HttpEmbedding {
    pub fn new(config: &EmbeddingConfig) -> SearchResult<Self> {
        if config.dimensions == 0 {
            return Err(SearchError::InvalidInput(
                "embedding dimensions must be non-zero".into(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            dimensions: config.dimensions,
        })
    }

    fn url(&self) -> String {
        format!("{}/v1/embeddings", self.endpoint)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbedding {
    fn name(&self) -> &str {
        "http"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, texts: &[&str]) -> SearchResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let mut builder = self.client.post(self.url()).json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Embedding(format!(
                "endpoint returned {status}: {}",
                chatmem_common::util::truncate_with_ellipsis(&body, 200)
            )));
        }

        let mut data = response.json::<EmbeddingResponse>().await?.data;
        if data.len() != texts.len() {
            return Err(SearchError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                data.len()
            )));
        }

        data.sort_by_key(|d| d.index);
        let vectors: Vec<Vec<f32>> = data.into_iter().map(|d| d.embedding).collect();

        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimensions) {
            return Err(SearchError::Embedding(format!(
                "expected {} dimensions, got {}",
                self.dimensions,
                bad.len()
            )));
        }

        tracing::debug!(count = vectors.len(), model = %self.model, "Embedded texts");
        Ok(vectors)
    }
}
