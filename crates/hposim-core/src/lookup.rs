//! Read-only lookup over a loaded artifact.
//!
//! Matching is a plain case-insensitive substring test, checked against the
//! label first, then the definition, then each synonym. Results keep
//! artifact order.

use crate::artifact::read_artifact;
use crate::error::Result;
use crate::model::{Artifact, SimilarTerm, Term};
use ahash::AHashMap;
use serde::Serialize;
use std::path::Path;

/// Queries shorter than this (after trimming) match nothing.
pub const MIN_QUERY_CHARS: usize = 2;

/// Upper bound on hits returned by [`ArtifactIndex::search`].
pub const MAX_SEARCH_RESULTS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub label: String,
}

/// Immutable in-memory view of an artifact.
#[derive(Debug)]
pub struct ArtifactIndex {
    artifact: Artifact,
    by_id: AHashMap<String, usize>,
    // Lower-cased label, definition, synonyms per node.
    folded: Vec<(String, String, Vec<String>)>,
}

impl ArtifactIndex {
    pub fn from_artifact(artifact: Artifact) -> Self {
        let by_id = artifact
            .nodes
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        let folded = artifact
            .nodes
            .iter()
            .map(|t| {
                (
                    t.label.to_lowercase(),
                    t.definition.to_lowercase(),
                    t.synonyms.iter().map(|s| s.to_lowercase()).collect(),
                )
            })
            .collect();
        Self {
            artifact,
            by_id,
            folded,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::from_artifact(read_artifact(path)?))
    }

    pub fn version(&self) -> &str {
        &self.artifact.version
    }

    pub fn len(&self) -> usize {
        self.artifact.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifact.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Term> {
        self.by_id.get(id).map(|&i| &self.artifact.nodes[i])
    }

    /// Stored neighbours of `id`; empty if unknown.
    pub fn similar_to(&self, id: &str) -> &[SimilarTerm] {
        self.get(id).map(|t| t.similar.as_slice()).unwrap_or(&[])
    }

    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        self.search_limit(query, MAX_SEARCH_RESULTS)
    }

    pub fn search_limit(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Vec::new();
        }

        self.folded
            .iter()
            .zip(&self.artifact.nodes)
            .filter(|((label, definition, synonyms), _)| {
                label.contains(&query)
                    || definition.contains(&query)
                    || synonyms.iter().any(|s| s.contains(&query))
            })
            .take(limit)
            .map(|(_, term)| SearchHit {
                id: term.id.clone(),
                label: term.label.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> ArtifactIndex {
        let mut seizure = Term::new("HP:0001250", "Seizure")
            .with_definition("A seizure is an intermittent abnormality of nervous system physiology")
            .with_synonyms(["Epileptic seizure", "Fits"]);
        seizure.similar.push(SimilarTerm {
            id: "HP:0002069".into(),
            score: 0.71,
        });
        ArtifactIndex::from_artifact(Artifact {
            version: "2024-01-16".into(),
            nodes: vec![
                seizure,
                Term::new("HP:0002069", "Bilateral tonic-clonic seizure"),
                Term::new("HP:0000707", "Abnormality of the nervous system"),
            ],
        })
    }

    fn hit_ids(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| h.id.as_str()).collect()
    }

    #[test]
    fn matches_label_definition_and_synonym_case_insensitively() {
        let idx = index();
        assert_eq!(hit_ids(&idx.search("SEIZURE")), vec!["HP:0001250", "HP:0002069"]);
        assert_eq!(hit_ids(&idx.search("intermittent")), vec!["HP:0001250"]);
        assert_eq!(hit_ids(&idx.search("  fits ")), vec!["HP:0001250"]);
        assert_eq!(hit_ids(&idx.search("nervous")), vec!["HP:0001250", "HP:0000707"]);
    }

    #[test]
    fn short_queries_match_nothing() {
        let idx = index();
        assert!(idx.search("s").is_empty());
        assert!(idx.search(" ").is_empty());
    }

    #[test]
    fn limit_caps_results() {
        let idx = index();
        assert_eq!(idx.search_limit("se", 1).len(), 1);
    }

    #[test]
    fn get_and_similar_to() {
        let idx = index();
        assert_eq!(idx.len(), 3);
        assert_eq!(idx.version(), "2024-01-16");
        assert_eq!(idx.get("HP:0002069").unwrap().label, "Bilateral tonic-clonic seizure");
        assert_eq!(idx.similar_to("HP:0001250")[0].id, "HP:0002069");
        assert!(idx.similar_to("HP:0002069").is_empty());
        assert!(idx.similar_to("HP:9999999").is_empty());
    }
}
