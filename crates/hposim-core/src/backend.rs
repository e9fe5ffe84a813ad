//! Seams to the ontology library that owns concepts and scores them.
//!
//! The pipeline never reaches for process-wide state: a backend is an
//! ordinary value, built by the caller, borrowed for the length of a run and
//! dropped afterwards. Two runs (or two tests) can hold independent backends
//! side by side.

use crate::error::{ResolveError, ScoreError};

/// Looks up concepts by short id.
pub trait ConceptResolver {
    /// Opaque handle handed back to the oracle.
    type Concept: Send + Sync;

    fn resolve(&self, short_id: &str) -> Result<Self::Concept, ResolveError>;

    /// Canonical short id the backend associates with `concept`.
    fn concept_id(&self, concept: &Self::Concept) -> String;
}

/// Scores a pair of resolved concepts.
///
/// Implementations must be deterministic and side-effect free: the engine
/// calls them from several threads and in no particular order.
pub trait SimilarityOracle<C>: Sync {
    /// Similarity in `[0, 1]`.
    fn score(&self, a: &C, b: &C) -> Result<f64, ScoreError>;
}
