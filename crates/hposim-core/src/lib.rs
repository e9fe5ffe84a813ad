//! hposim-core: pairwise ontology similarity precompute.
//!
//! Turns a catalog of ontology terms into a bounded, query-ready index:
//!
//! ```text
//!   Catalog ──► resolve ──► score pairs ──► prune top-K ──► artifact
//!               (ids)       (O(n²), rayon)  (per node)      (JSON, atomic)
//! ```
//!
//! The ontology library that resolves concepts and scores pairs is a
//! pluggable backend ([`ConceptResolver`] + [`SimilarityOracle`]). This crate
//! ships one backend, [`ScoreTable`], for precomputed scores; the graph
//! backend lives in `hposim-ingest`.
//!
//! Failure handling:
//! - per-record problems (unresolvable ids, failed scoring calls) are values
//!   that end up in [`PipelineReport`] counters,
//! - structural, configuration and I/O problems are [`PipelineError`]s and
//!   abort the run without leaving an artifact behind.

pub mod artifact;
pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod ids;
pub mod lookup;
pub mod model;
pub mod pipeline;
pub mod prune;
pub mod resolve;
pub mod table;

pub use artifact::{read_artifact, write_artifact, DEFAULT_ARTIFACT_FILE};
pub use backend::{ConceptResolver, SimilarityOracle};
pub use config::PipelineConfig;
pub use engine::{score_pairs, CandidateEdge, Candidates, EngineOptions, EngineStats};
pub use error::{PipelineError, ResolveError, ScoreError};
pub use ids::{lengthen, shorten, OBO_PURL_BASE};
pub use lookup::{ArtifactIndex, SearchHit, MAX_SEARCH_RESULTS, MIN_QUERY_CHARS};
pub use model::{Artifact, Catalog, SimilarTerm, Term, UNKNOWN_VERSION};
pub use pipeline::{build_index, run, PipelineReport, ResolveStats};
pub use prune::{prune, PruneStats};
pub use resolve::{resolve_catalog, Resolution};
pub use table::{ScoreTable, TableConcept};
