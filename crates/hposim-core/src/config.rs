//! Pipeline configuration.

use crate::artifact::DEFAULT_ARTIFACT_FILE;
use crate::engine::{EngineOptions, DEFAULT_THRESHOLD};
use crate::error::{PipelineError, Result};
use crate::prune::DEFAULT_MAX_SIMILAR;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default ontology document name inside `source_dir`.
pub const DEFAULT_SOURCE_FILE: &str = "hp.json";

/// Configuration for one precompute run.
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Minimum raw score for a pair to become a candidate.
    pub threshold: f64,
    /// Maximum neighbours kept per term.
    pub max_similar: usize,
    /// Artifact destination.
    pub output: PathBuf,
    /// Directory holding the raw ontology sources.
    pub source_dir: PathBuf,
    /// Ontology document name inside `source_dir`.
    pub source_file: String,
    /// Worker threads for the pair scan (`None` = one per core).
    pub threads: Option<usize>,
    /// Oracle calls slower than this count as failures.
    pub max_call_latency_ms: Option<u64>,
    /// Indent the artifact JSON.
    pub pretty: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_similar: DEFAULT_MAX_SIMILAR,
            output: PathBuf::from(DEFAULT_ARTIFACT_FILE),
            source_dir: PathBuf::from("."),
            source_file: DEFAULT_SOURCE_FILE.to_string(),
            threads: None,
            max_call_latency_ms: None,
            pretty: false,
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| PipelineError::io(path, e))?;
        let config: Self = serde_json::from_slice(&bytes)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(PipelineError::Config(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        if self.max_similar == 0 {
            return Err(PipelineError::Config("max_similar must be at least 1".into()));
        }
        if self.threads == Some(0) {
            return Err(PipelineError::Config("threads must be at least 1".into()));
        }
        if self.source_file.is_empty() {
            return Err(PipelineError::Config("source_file must not be empty".into()));
        }
        Ok(())
    }

    /// Full path of the ontology document.
    pub fn source_path(&self) -> PathBuf {
        self.source_dir.join(&self.source_file)
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            threshold: self.threshold,
            max_call_latency: self.max_call_latency_ms.map(Duration::from_millis),
            ..EngineOptions::default()
        }
    }
}
