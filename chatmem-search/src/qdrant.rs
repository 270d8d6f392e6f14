//! Qdrant-backed dense index for FAQ records.
//!
//! Each record is stored as two points, one per text column, so a search can
//! be restricted to question or answer embeddings with a payload filter.

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, Distance, Filter, PointId, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use xxhash_rust::xxh3::Xxh3;

use crate::error::{SearchError, SearchResult};
use crate::traits::{DenseIndex, EmbeddedFaq, FaqHit, SearchField};

/// Dense FAQ index in one Qdrant collection.
pub struct QdrantFaqIndex {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantFaqIndex {
    /// Connect and make sure the collection exists.
    pub async fn connect(url: &str, collection: &str, dimension: usize) -> SearchResult<Self> {
        if dimension == 0 {
            return Err(SearchError::InvalidInput(
                "dense index needs non-zero embedding dimensions".into(),
            ));
        }

        let client = Qdrant::from_url(url).build()?;
        let index = Self {
            client,
            collection: collection.to_string(),
            dimension,
        };
        index.ensure_collection().await?;

        Ok(index)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Create the collection (cosine distance) when missing.
    pub async fn ensure_collection(&self) -> SearchResult<()> {
        let collections = self.client.list_collections().await?;
        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection);

        if !exists {
            tracing::info!(
                collection = %self.collection,
                dimension = self.dimension,
                "Creating Qdrant collection"
            );
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(
                        VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                    ),
                )
                .await?;
        }

        Ok(())
    }

    fn check_dimension(&self, vector: &[f32]) -> SearchResult<()> {
        if vector.len() != self.dimension {
            return Err(SearchError::Embedding(format!(
                "expected {} dimensions, got {}",
                self.dimension,
                vector.len()
            )));
        }
        Ok(())
    }
}

/// Point ID for one column of one record.
fn point_id(record_id: u64, field: SearchField) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.update(&record_id.to_le_bytes());
    hasher.update(field.as_str().as_bytes());
    hasher.digest()
}

fn build_payload(entry: &EmbeddedFaq, field: SearchField) -> HashMap<String, Value> {
    HashMap::from([
        ("id".to_string(), Value::from(entry.id.to_string())),
        ("field".to_string(), Value::from(field.as_str())),
        ("question".to_string(), Value::from(entry.record.question.clone())),
        ("answer".to_string(), Value::from(entry.record.answer.clone())),
    ])
}

fn hit_from_payload(payload: &HashMap<String, Value>, score: f32) -> Option<FaqHit> {
    let id = payload.get("id")?.as_str()?.parse().ok()?;
    let question = payload.get("question")?.as_str()?.to_string();
    let answer = payload.get("answer")?.as_str()?.to_string();

    Some(FaqHit {
        id,
        question,
        answer,
        score,
    })
}

#[async_trait]
impl DenseIndex for QdrantFaqIndex {
    fn name(&self) -> &str {
        "qdrant"
    }

    async fn upsert(&self, entries: &[EmbeddedFaq]) -> SearchResult<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let mut points = Vec::with_capacity(entries.len() * 2);
        for entry in entries {
            for (field, vector) in [
                (SearchField::Question, &entry.question_vector),
                (SearchField::Answer, &entry.answer_vector),
            ] {
                self.check_dimension(vector)?;
                points.push(PointStruct::new(
                    PointId::from(point_id(entry.id, field)),
                    vector.clone(),
                    build_payload(entry, field),
                ));
            }
        }

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await?;

        tracing::debug!(
            collection = %self.collection,
            records = entries.len(),
            "Upserted FAQ records into Qdrant"
        );
        Ok(entries.len())
    }

    async fn search(
        &self,
        vector: &[f32],
        field: SearchField,
        limit: usize,
    ) -> SearchResult<Vec<FaqHit>> {
        self.check_dimension(vector)?;

        let filter = Filter::must([Condition::matches("field", field.as_str().to_string())]);
        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector.to_vec(), limit as u64)
                    .filter(filter)
                    .with_payload(true),
            )
            .await?;

        Ok(results
            .result
            .iter()
            .filter_map(|point| hit_from_payload(&point.payload, point.score))
            .collect())
    }

    async fn health_check(&self) -> bool {
        self.client.health_check().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FaqRecord;

    fn entry() -> EmbeddedFaq {
        EmbeddedFaq {
            id: u64::MAX - 7,
            record: FaqRecord::new("When does term start?", "September 1st"),
            question_vector: vec![1.0, 0.0],
            answer_vector: vec![0.0, 1.0],
        }
    }

    #[test]
    fn point_ids_differ_per_field() {
        assert_ne!(
            point_id(42, SearchField::Question),
            point_id(42, SearchField::Answer)
        );
        assert_eq!(
            point_id(42, SearchField::Answer),
            point_id(42, SearchField::Answer)
        );
    }

    #[test]
    fn payload_round_trips_full_u64_id() {
        let entry = entry();
        let payload = build_payload(&entry, SearchField::Answer);

        let hit = hit_from_payload(&payload, 0.5).unwrap();
        assert_eq!(hit.id, entry.id);
        assert_eq!(hit.question, "When does term start?");
        assert_eq!(hit.answer, "September 1st");
        assert!(matches!(
            payload.get("field").and_then(|v| v.as_str()).map(String::as_str),
            Some("answer")
        ));
    }

    #[test]
    fn incomplete_payload_is_skipped() {
        let mut payload = build_payload(&entry(), SearchField::Question);
        payload.remove("answer");
        assert!(hit_from_payload(&payload, 1.0).is_none());
    }

    #[tokio::test]
    async fn zero_dimension_rejected() {
        let result = QdrantFaqIndex::connect("http://localhost:6334", "faq", 0).await;
        assert!(matches!(result, Err(SearchError::InvalidInput(_))));
    }
}
