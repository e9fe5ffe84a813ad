//! `hposim search` / `hposim similar`: read-only queries over an artifact.

use anyhow::{anyhow, Result};
use colored::Colorize;
use hposim_core::ArtifactIndex;
use std::path::Path;

fn open(path: &Path) -> Result<ArtifactIndex> {
    let index = ArtifactIndex::load(path)?;
    tracing::debug!(
        path = %path.display(),
        terms = index.len(),
        version = index.version(),
        "loaded artifact"
    );
    Ok(index)
}

pub fn cmd_search(artifact: &Path, query: &str, limit: usize, json: bool) -> Result<()> {
    let index = open(artifact)?;
    let hits = index.search_limit(query, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }
    if hits.is_empty() {
        eprintln!("{} no terms match `{}`", "info:".yellow().bold(), query);
        return Ok(());
    }
    for hit in &hits {
        println!("{}  {}", hit.id.cyan(), hit.label);
    }
    Ok(())
}

pub fn cmd_similar(artifact: &Path, id: &str, json: bool) -> Result<()> {
    let index = open(artifact)?;
    let term = index
        .get(id)
        .ok_or_else(|| anyhow!("no term `{id}` in {}", artifact.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&term.similar)?);
        return Ok(());
    }
    println!("{} {}", term.id.cyan().bold(), term.label.bold());
    if term.similar.is_empty() {
        println!("  (no similar terms)");
    }
    for similar in &term.similar {
        let label = index.get(&similar.id).map_or("", |t| t.label.as_str());
        println!("  {:.3}  {}  {}", similar.score, similar.id.cyan(), label);
    }
    Ok(())
}
