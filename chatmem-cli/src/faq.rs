//! FAQ indexing and search commands.

use std::path::Path;

use anyhow::{Context, Result};
use chatmem_common::Config;
use chatmem_search::{load_rows, CollectionSchema, FaqHit, SearchField, SearchPath};

use crate::backend;

pub async fn index(config: &Config, rows: &Path) -> Result<()> {
    let schema = CollectionSchema::faq(config.search.embedding.dimensions);
    let records = load_rows(rows, &schema)
        .with_context(|| format!("Failed to load FAQ rows from {}", rows.display()))?;

    let parts = backend::search_parts(config).await?;
    let written = parts.indexer().index(&records).await?;
    println!("Indexed {written} FAQ entries into '{}'", config.search.collection);
    Ok(())
}

pub async fn search(
    config: &Config,
    query: &str,
    answers: bool,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let field = if answers {
        SearchField::Answer
    } else {
        SearchField::Question
    };
    let limit = limit.unwrap_or(config.search.default_limit);

    let parts = backend::search_parts(config).await?;
    let outcome = parts.searcher(config).search(query, field, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if let SearchPath::DenseFallback { reason } = &outcome.path {
        println!("(keyword search unavailable, vector results only: {reason})");
    }
    if outcome.hits.is_empty() {
        println!("No matches.");
    }
    for (rank, hit) in outcome.hits.iter().enumerate() {
        println!("{}", format_hit(rank + 1, hit));
    }
    Ok(())
}

fn format_hit(rank: usize, hit: &FaqHit) -> String {
    format!(
        "{rank}. [{:.3}] {}\n   {}",
        hit.score, hit.question, hit.answer
    )
}
