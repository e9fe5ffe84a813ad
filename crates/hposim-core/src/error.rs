//! Error taxonomy for the precompute pipeline.
//!
//! Two families live here:
//!
//! - **Fatal** errors ([`PipelineError`]): malformed input structure, bad
//!   configuration, or I/O failure. These abort the run and no artifact is
//!   produced.
//! - **Per-record** errors ([`ResolveError`], [`ScoreError`]): a single id
//!   or pair could not be used. They are carried as values, aggregated into
//!   stats, and never abort a run.

use std::path::PathBuf;

/// Fatal pipeline failure.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Input container has the wrong shape (e.g. no `graphs[0].nodes`).
    #[error("malformed input: {0}")]
    Structural(String),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Unable to read a source or write the artifact.
    #[error("I/O error on `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact could not be encoded/decoded.
    #[error("artifact encoding error on `{}`: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this failure class.
    ///
    /// Structural and environment failures get distinct codes so operators
    /// can tell "bad data" from "bad environment".
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Structural(_) => 2,
            Self::Io { .. } | Self::Encode { .. } => 3,
            Self::Config(_) => 4,
        }
    }
}

/// Why a catalog id could not be mapped to a backend concept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The id is neither a short id nor a URI ending in one.
    #[error("identifier `{0}` has no short form")]
    Unnormalizable(String),

    /// The backend does not know this short id.
    #[error("concept `{0}` not found")]
    NotFound(String),

    /// The backend answered with a concept for a different id.
    #[error("requested `{requested}` but backend resolved `{resolved}`")]
    Mismatch { requested: String, resolved: String },
}

/// Why the scoring oracle produced no score for a pair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    #[error("concepts are not comparable")]
    NotComparable,

    #[error("scoring backend unavailable: {0}")]
    Unavailable(String),

    #[error("scoring call exceeded {0} ms")]
    Timeout(u64),
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
