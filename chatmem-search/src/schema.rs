//! FAQ collection schema and row validation.
//!
//! The collection is declared once, up front; rows are checked against it
//! before anything is embedded or written.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SearchError, SearchResult};

/// Column holding the question text.
pub const QUESTION_FIELD: &str = "Question";

/// Column holding the answer text.
pub const ANSWER_FIELD: &str = "Answer";

/// Maximum length of a text column, in bytes.
pub const MAX_TEXT_LENGTH: usize = 65_535;

/// Dimension of the default sentence embedding model.
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Int64 { primary: bool, auto_id: bool },
    Text { max_length: usize },
    DenseVector { dim: usize },
    SparseVector,
}

/// One declared column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    /// True for columns supplied by input rows (as opposed to generated ones).
    pub fn is_input(&self) -> bool {
        matches!(self.field_type, FieldType::Text { .. })
    }
}

/// Declared layout of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSchema {
    fields: Vec<FieldSchema>,
}

impl CollectionSchema {
    /// The FAQ layout: auto ID, question and answer text, and a dense and a
    /// sparse embedding per text column.
    pub fn faq(dim: usize) -> Self {
        let text = FieldType::Text {
            max_length: MAX_TEXT_LENGTH,
        };
        Self {
            fields: vec![
                FieldSchema::new(
                    "ID",
                    FieldType::Int64 {
                        primary: true,
                        auto_id: true,
                    },
                ),
                FieldSchema::new(QUESTION_FIELD, text),
                FieldSchema::new(ANSWER_FIELD, text),
                FieldSchema::new("Question_dense_embedding", FieldType::DenseVector { dim }),
                FieldSchema::new("Answer_dense_embedding", FieldType::DenseVector { dim }),
                FieldSchema::new("Question_sparse_embedding", FieldType::SparseVector),
                FieldSchema::new("Answer_sparse_embedding", FieldType::SparseVector),
            ],
        }
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Dimension of the first dense vector column, if any.
    pub fn dense_dim(&self) -> Option<usize> {
        self.fields.iter().find_map(|f| match f.field_type {
            FieldType::DenseVector { dim } => Some(dim),
            _ => None,
        })
    }

    /// Check one input row and turn it into a record.
    ///
    /// Unknown columns, missing text columns, empty values, and values past
    /// the column's `max_length` are all rejected.
    pub fn validate_row(&self, row: &BTreeMap<String, String>) -> SearchResult<FaqRecord> {
        for name in row.keys() {
            match self.field(name) {
                Some(field) if field.is_input() => {}
                Some(_) => {
                    return Err(SearchError::Schema(format!(
                        "column '{name}' is generated and cannot be supplied"
                    )))
                }
                None => return Err(SearchError::Schema(format!("unknown column '{name}'"))),
            }
        }

        let question = self.text_value(row, QUESTION_FIELD)?;
        let answer = self.text_value(row, ANSWER_FIELD)?;
        Ok(FaqRecord { question, answer })
    }

    fn text_value(&self, row: &BTreeMap<String, String>, name: &str) -> SearchResult<String> {
        let max_length = match self.field(name).map(|f| f.field_type) {
            Some(FieldType::Text { max_length }) => max_length,
            _ => return Err(SearchError::Schema(format!("column '{name}' is not declared"))),
        };

        let value = row
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SearchError::Schema(format!("column '{name}' is empty")))?;

        if value.len() > max_length {
            return Err(SearchError::Schema(format!(
                "column '{name}' exceeds {max_length} bytes"
            )));
        }
        Ok(value.to_string())
    }
}

/// One question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqRecord {
    pub question: String,
    pub answer: String,
}

impl FaqRecord {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Load FAQ rows from a JSON array of objects.
///
/// Rows missing a question or answer are skipped; any other schema violation
/// fails the whole load.
pub fn load_rows(path: &Path, schema: &CollectionSchema) -> SearchResult<Vec<FaqRecord>> {
    let content = std::fs::read_to_string(path)?;
    parse_rows(&content, schema)
}

/// Parse and validate rows from JSON text.
pub fn parse_rows(content: &str, schema: &CollectionSchema) -> SearchResult<Vec<FaqRecord>> {
    let rows: Vec<BTreeMap<String, String>> = serde_json::from_str(content)?;
    let total = rows.len();

    let mut records = Vec::with_capacity(total);
    for (index, row) in rows.iter().enumerate() {
        if is_blank(row, QUESTION_FIELD) || is_blank(row, ANSWER_FIELD) {
            tracing::debug!(row = index, "Skipping FAQ row without question or answer");
            continue;
        }
        let record = schema
            .validate_row(row)
            .map_err(|e| SearchError::Schema(format!("row {index}: {e}")))?;
        records.push(record);
    }

    tracing::info!(loaded = records.len(), total, "Loaded FAQ rows");
    Ok(records)
}

fn is_blank(row: &BTreeMap<String, String>, name: &str) -> bool {
    row.get(name).map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn faq_schema_layout() {
        let schema = CollectionSchema::faq(DEFAULT_DIMENSIONS);
        assert_eq!(schema.fields().len(), 7);
        assert_eq!(schema.dense_dim(), Some(384));
        assert!(matches!(
            schema.field("ID").unwrap().field_type,
            FieldType::Int64 {
                primary: true,
                auto_id: true
            }
        ));
        assert_eq!(
            schema.field("Answer_sparse_embedding").unwrap().field_type,
            FieldType::SparseVector
        );
    }

    #[test]
    fn valid_row_becomes_record() {
        let schema = CollectionSchema::faq(384);
        let record = schema
            .validate_row(&row(&[("Question", " When? "), ("Answer", "In May")]))
            .unwrap();
        assert_eq!(record, FaqRecord::new("When?", "In May"));
    }

    #[test]
    fn unknown_column_rejected() {
        let schema = CollectionSchema::faq(384);
        let err = schema
            .validate_row(&row(&[("Question", "q"), ("Answer", "a"), ("Category", "x")]))
            .unwrap_err();
        assert!(err.to_string().contains("unknown column 'Category'"));
    }

    #[test]
    fn generated_column_rejected() {
        let schema = CollectionSchema::faq(384);
        let err = schema
            .validate_row(&row(&[
                ("Question", "q"),
                ("Answer", "a"),
                ("Question_dense_embedding", "[0.1]"),
            ]))
            .unwrap_err();
        assert!(err.to_string().contains("generated"));
    }

    #[test]
    fn oversized_value_rejected() {
        let schema = CollectionSchema::faq(384);
        let long = "x".repeat(MAX_TEXT_LENGTH + 1);
        assert!(schema
            .validate_row(&row(&[("Question", "q"), ("Answer", &long)]))
            .is_err());
    }

    #[test]
    fn parse_rows_skips_incomplete_rows() {
        let schema = CollectionSchema::faq(384);
        let json = r#"[
            {"Question": "What is the deadline?", "Answer": "June 1st"},
            {"Question": "", "Answer": "orphan"},
            {"Question": "No answer"}
        ]"#;

        let records = parse_rows(json, &schema).unwrap();
        assert_eq!(records, vec![FaqRecord::new("What is the deadline?", "June 1st")]);
    }

    #[test]
    fn parse_rows_fails_on_unknown_column() {
        let schema = CollectionSchema::faq(384);
        let json = r#"[{"Question": "q", "Answer": "a", "Extra": "e"}]"#;
        let err = parse_rows(json, &schema).unwrap_err();
        assert!(err.to_string().contains("row 0"));
    }

    #[test]
    fn load_rows_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("faq.json");
        std::fs::write(&path, r#"[{"Question": "q", "Answer": "a"}]"#).unwrap();

        let records = load_rows(&path, &CollectionSchema::faq(384)).unwrap();
        assert_eq!(records.len(), 1);
    }
}
