//! SQLite FTS5 keyword index for FAQ records.
//!
//! Ranking is SQLite's built-in `bm25()`; scores are negated so that higher is
//! better, matching the dense index.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{params, Connection};

use crate::error::SearchResult;
use crate::schema::FaqRecord;
use crate::traits::{FaqHit, KeywordSearch, SearchField};

/// FTS5 index stored in a single SQLite file.
pub struct KeywordIndex {
    db_path: PathBuf,
}

impl KeywordIndex {
    /// Open (or create) the index at `db_path`.
    pub fn open(db_path: &Path) -> SearchResult<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS faq (
                id TEXT PRIMARY KEY,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                indexed_at TEXT NOT NULL
            );

            CREATE VIRTUAL TABLE IF NOT EXISTS faq_fts USING fts5(
                question,
                answer,
                content='faq',
                content_rowid='rowid'
            );

            CREATE TRIGGER IF NOT EXISTS faq_ai AFTER INSERT ON faq BEGIN
                INSERT INTO faq_fts(rowid, question, answer)
                VALUES (new.rowid, new.question, new.answer);
            END;

            CREATE TRIGGER IF NOT EXISTS faq_ad AFTER DELETE ON faq BEGIN
                INSERT INTO faq_fts(faq_fts, rowid, question, answer)
                VALUES ('delete', old.rowid, old.question, old.answer);
            END;

            CREATE TRIGGER IF NOT EXISTS faq_au AFTER UPDATE ON faq BEGIN
                INSERT INTO faq_fts(faq_fts, rowid, question, answer)
                VALUES ('delete', old.rowid, old.question, old.answer);
                INSERT INTO faq_fts(rowid, question, answer)
                VALUES (new.rowid, new.question, new.answer);
            END;
            "#,
        )?;

        Ok(Self {
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

/// Reduce free text to an OR of quoted terms.
///
/// Punctuation is dropped and every remaining word becomes an FTS5 string, so
/// words like `AND`, `NOT` and `NEAR` are matched as text, never as operators.
fn escape_fts5_query(query: &str) -> String {
    query
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(|term| format!("\"{term}\""))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// FTS5 expression restricted to one column.
fn column_query(field: SearchField, query: &str) -> Option<String> {
    let terms = escape_fts5_query(query);
    if terms.is_empty() {
        return None;
    }
    Some(format!("{} : ({terms})", field.as_str()))
}

#[async_trait]
impl KeywordSearch for KeywordIndex {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn upsert(&self, entries: &[(u64, FaqRecord)]) -> SearchResult<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let db_path = self.db_path.clone();
        let entries = entries.to_vec();

        tokio::task::spawn_blocking(move || -> SearchResult<usize> {
            let mut conn = Connection::open(&db_path)?;
            let now = chrono::Utc::now().to_rfc3339();

            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO faq (id, question, answer, indexed_at) VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(id) DO UPDATE SET
                        question = excluded.question,
                        answer = excluded.answer,
                        indexed_at = excluded.indexed_at",
                )?;
                for (id, record) in &entries {
                    stmt.execute(params![id.to_string(), record.question, record.answer, now])?;
                }
            }
            tx.commit()?;

            tracing::debug!(records = entries.len(), "Upserted FAQ records into keyword index");
            Ok(entries.len())
        })
        .await?
    }

    async fn search(
        &self,
        query: &str,
        field: SearchField,
        limit: usize,
    ) -> SearchResult<Vec<FaqHit>> {
        let Some(expr) = column_query(field, query) else {
            return Ok(Vec::new());
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || -> SearchResult<Vec<FaqHit>> {
            let conn = Connection::open(&db_path)?;
            let mut stmt = conn.prepare(
                "SELECT f.id, f.question, f.answer, -bm25(faq_fts) AS score
                 FROM faq_fts JOIN faq f ON f.rowid = faq_fts.rowid
                 WHERE faq_fts MATCH ?1
                 ORDER BY score DESC
                 LIMIT ?2",
            )?;

            let rows = stmt.query_map(params![expr, limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, f64>(3)?,
                ))
            })?;

            let mut hits = Vec::new();
            for row in rows {
                let (id, question, answer, score) = row?;
                let Ok(id) = id.parse::<u64>() else {
                    tracing::warn!(id = %id, "Skipping keyword row with malformed id");
                    continue;
                };
                hits.push(FaqHit {
                    id,
                    question,
                    answer,
                    score: score as f32,
                });
            }
            Ok(hits)
        })
        .await?
    }

    async fn count(&self) -> SearchResult<usize> {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || -> SearchResult<usize> {
            let conn = Connection::open(&db_path)?;
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM faq", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await?
    }
}
