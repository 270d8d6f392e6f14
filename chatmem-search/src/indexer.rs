//! Bulk FAQ ingestion into both indexes.

use std::sync::Arc;

use crate::embedding::EmbeddingProvider;
use crate::error::{SearchError, SearchResult};
use crate::schema::FaqRecord;
use crate::traits::{record_id, DenseIndex, EmbeddedFaq, KeywordSearch};

/// Records embedded per request.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Writes FAQ records into the dense and keyword indexes.
pub struct FaqIndexer {
    dense: Arc<dyn DenseIndex>,
    keyword: Arc<dyn KeywordSearch>,
    embedding: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl FaqIndexer {
    pub fn new(
        dense: Arc<dyn DenseIndex>,
        keyword: Arc<dyn KeywordSearch>,
        embedding: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            dense,
            keyword,
            embedding,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Embed questions and answers batch by batch and upsert each batch into
    /// both indexes. Returns the number of records written.
    pub async fn index(&self, records: &[FaqRecord]) -> SearchResult<usize> {
        let mut written = 0;

        for batch in records.chunks(self.batch_size) {
            let questions: Vec<&str> = batch.iter().map(|r| r.question.as_str()).collect();
            let answers: Vec<&str> = batch.iter().map(|r| r.answer.as_str()).collect();

            let question_vectors = self.embedding.embed(&questions).await?;
            let answer_vectors = self.embedding.embed(&answers).await?;
            if question_vectors.len() != batch.len() || answer_vectors.len() != batch.len() {
                return Err(SearchError::Embedding(format!(
                    "expected {} embeddings per column, got {} and {}",
                    batch.len(),
                    question_vectors.len(),
                    answer_vectors.len()
                )));
            }

            let embedded: Vec<EmbeddedFaq> = batch
                .iter()
                .zip(question_vectors)
                .zip(answer_vectors)
                .map(|((record, question_vector), answer_vector)| EmbeddedFaq {
                    id: record_id(record),
                    record: record.clone(),
                    question_vector,
                    answer_vector,
                })
                .collect();
            let keyed: Vec<(u64, FaqRecord)> = embedded
                .iter()
                .map(|e| (e.id, e.record.clone()))
                .collect();

            self.dense.upsert(&embedded).await?;
            self.keyword.upsert(&keyed).await?;

            written += batch.len();
            tracing::debug!(written, total = records.len(), "Indexed FAQ batch");
        }

        tracing::info!(
            records = written,
            dense = self.dense.name(),
            keyword = self.keyword.name(),
            "FAQ indexing complete"
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword::KeywordIndex;
    use crate::traits::{FaqHit, SearchField};
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    struct CountingEmbedding;

    #[async_trait]
    impl EmbeddingProvider for CountingEmbedding {
        fn name(&self) -> &str {
            "counting"
        }

        fn dimensions(&self) -> usize {
            1
        }

        async fn embed(&self, texts: &[&str]) -> SearchResult<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32]).collect())
        }
    }

    #[derive(Default)]
    struct RecordingDense {
        batches: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl DenseIndex for RecordingDense {
        fn name(&self) -> &str {
            "recording"
        }

        async fn upsert(&self, entries: &[EmbeddedFaq]) -> SearchResult<usize> {
            self.batches.lock().await.push(entries.len());
            Ok(entries.len())
        }

        async fn search(&self, _: &[f32], _: SearchField, _: usize) -> SearchResult<Vec<FaqHit>> {
            Ok(Vec::new())
        }

        async fn health_check(&self) -> bool {
            true
        }
    }

    fn records(n: usize) -> Vec<FaqRecord> {
        (0..n)
            .map(|i| FaqRecord::new(format!("Question number {i}?"), format!("Answer {i}")))
            .collect()
    }

    #[tokio::test]
    async fn indexes_in_batches_into_both_indexes() {
        let tmp = tempfile::TempDir::new().unwrap();
        let keyword = Arc::new(KeywordIndex::open(&tmp.path().join("faq.db")).unwrap());
        let dense = Arc::new(RecordingDense::default());

        let indexer = FaqIndexer::new(dense.clone(), keyword.clone(), Arc::new(CountingEmbedding))
            .with_batch_size(2);
        let written = indexer.index(&records(5)).await.unwrap();

        assert_eq!(written, 5);
        assert_eq!(*dense.batches.lock().await, vec![2, 2, 1]);
        assert_eq!(keyword.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn rows_sharing_a_question_are_kept_apart() {
        let tmp = tempfile::TempDir::new().unwrap();
        let keyword = Arc::new(KeywordIndex::open(&tmp.path().join("faq.db")).unwrap());
        let indexer = FaqIndexer::new(
            Arc::new(RecordingDense::default()),
            keyword.clone(),
            Arc::new(CountingEmbedding),
        );

        let rows = vec![
            FaqRecord::new("When is the deadline?", "June 1st for autumn."),
            FaqRecord::new("When is the deadline?", "November 1st for spring."),
        ];
        indexer.index(&rows).await.unwrap();
        assert_eq!(keyword.count().await.unwrap(), 2);

        // Re-indexing identical rows replaces them.
        indexer.index(&rows).await.unwrap();
        assert_eq!(keyword.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn embedding_failure_stops_indexing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let keyword = Arc::new(KeywordIndex::open(&tmp.path().join("faq.db")).unwrap());
        let indexer = FaqIndexer::new(
            Arc::new(RecordingDense::default()),
            keyword.clone(),
            Arc::new(crate::embedding::NoopEmbedding),
        );

        assert!(indexer.index(&records(3)).await.is_err());
        assert_eq!(keyword.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_input_writes_nothing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let indexer = FaqIndexer::new(
            Arc::new(RecordingDense::default()),
            Arc::new(KeywordIndex::open(&tmp.path().join("faq.db")).unwrap()),
            Arc::new(CountingEmbedding),
        );
        assert_eq!(indexer.index(&[]).await.unwrap(), 0);
    }
}
