//! Precomputed score table backend.
//!
//! Reads scores produced by some other tool as tab-separated lines:
//!
//! ```text
//! # a           b            score
//! HP:0000118    HP:0001250   0.4812
//! ```
//!
//! Ids are normalized to short form on load. Pairs are unordered; a later
//! line for the same pair replaces an earlier one.

use crate::backend::{ConceptResolver, SimilarityOracle};
use crate::error::{PipelineError, ResolveError, Result, ScoreError};
use crate::ids::shorten;
use ahash::AHashMap;
use std::path::Path;

/// Handle into a [`ScoreTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableConcept(u32);

#[derive(Debug, Default)]
pub struct ScoreTable {
    ids: Vec<String>,
    index: AHashMap<String, u32>,
    scores: AHashMap<(u32, u32), f64>,
}

fn pair_key(a: u32, b: u32) -> (u32, u32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, short: String) -> u32 {
        if let Some(&idx) = self.index.get(&short) {
            return idx;
        }
        let idx = self.ids.len() as u32;
        self.index.insert(short.clone(), idx);
        self.ids.push(short);
        idx
    }

    /// Record the score for an unordered pair.
    ///
    /// Returns `false` (and records nothing) if either id has no short form.
    pub fn insert(&mut self, a: &str, b: &str, score: f64) -> bool {
        let (Some(a), Some(b)) = (shorten(a), shorten(b)) else {
            return false;
        };
        let a = self.intern(a);
        let b = self.intern(b);
        self.scores.insert(pair_key(a, b), score);
        true
    }

    /// Register an id with no scores (it resolves, but compares to nothing).
    pub fn insert_concept(&mut self, id: &str) -> bool {
        match shorten(id) {
            Some(short) => {
                self.intern(short);
                true
            }
            None => false,
        }
    }

    pub fn concepts(&self) -> usize {
        self.ids.len()
    }

    pub fn pairs(&self) -> usize {
        self.scores.len()
    }

    /// Parse TSV text. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut table = Self::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            let [a, b, score] = fields.as_slice() else {
                return Err(PipelineError::Structural(format!(
                    "score table line {}: expected 3 tab-separated fields, got {}",
                    lineno + 1,
                    fields.len()
                )));
            };
            let score: f64 = score.parse().map_err(|_| {
                PipelineError::Structural(format!(
                    "score table line {}: invalid score `{score}`",
                    lineno + 1
                ))
            })?;
            if !table.insert(a, b, score) {
                tracing::warn!(
                    line = lineno + 1,
                    a = %a,
                    b = %b,
                    "score table row has unnormalizable id"
                );
            }
        }
        Ok(table)
    }

    /// Read a score file. Open/read failures are I/O; bytes that are not
    /// UTF-8 are structural.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| PipelineError::io(path, e))?;
        let text = String::from_utf8(bytes).map_err(|e| {
            PipelineError::Structural(format!("{}: not valid UTF-8: {e}", path.display()))
        })?;
        let table = Self::parse(&text)?;
        tracing::info!(
            path = %path.display(),
            concepts = table.concepts(),
            pairs = table.pairs(),
            "loaded score table"
        );
        Ok(table)
    }
}

impl ConceptResolver for ScoreTable {
    type Concept = TableConcept;

    fn resolve(&self, short_id: &str) -> Result<TableConcept, ResolveError> {
        self.index
            .get(short_id)
            .map(|&idx| TableConcept(idx))
            .ok_or_else(|| ResolveError::NotFound(short_id.to_string()))
    }

    fn concept_id(&self, concept: &TableConcept) -> String {
        self.ids[concept.0 as usize].clone()
    }
}

impl SimilarityOracle<TableConcept> for ScoreTable {
    fn score(&self, a: &TableConcept, b: &TableConcept) -> Result<f64, ScoreError> {
        if a == b {
            return Ok(1.0);
        }
        self.scores
            .get(&pair_key(a.0, b.0))
            .copied()
            .ok_or(ScoreError::NotComparable)
    }
}
