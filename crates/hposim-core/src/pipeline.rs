//! Resolve → score → prune → write.

use crate::artifact::write_artifact;
use crate::backend::{ConceptResolver, SimilarityOracle};
use crate::config::PipelineConfig;
use crate::engine::{score_pairs, EngineStats};
use crate::error::{PipelineError, ResolveError, Result};
use crate::model::{Artifact, Catalog};
use crate::prune::{prune, PruneStats};
use crate::resolve::resolve_catalog;
use std::time::{Duration, Instant};

/// Resolution failures by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub resolved: u64,
    pub unnormalizable: u64,
    pub not_found: u64,
    pub mismatch: u64,
}

impl ResolveStats {
    pub fn failed(&self) -> u64 {
        self.unnormalizable + self.not_found + self.mismatch
    }
}

/// Aggregate counters for one run.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub terms: u64,
    pub resolve: ResolveStats,
    pub engine: EngineStats,
    pub prune: PruneStats,
    pub elapsed: Duration,
}

/// Compute the similarity index for `catalog` and return the artifact.
///
/// Nothing is written; see [`run`] for the full job.
pub fn build_index<B>(
    mut catalog: Catalog,
    version: &str,
    backend: &B,
    config: &PipelineConfig,
) -> Result<(Artifact, PipelineReport)>
where
    B: ConceptResolver + SimilarityOracle<<B as ConceptResolver>::Concept>,
{
    config.validate()?;
    let started = Instant::now();

    let resolution = resolve_catalog(backend, &catalog);
    let mut resolve = ResolveStats {
        resolved: resolution.resolved.len() as u64,
        ..ResolveStats::default()
    };
    for (_, err) in &resolution.failures {
        match err {
            ResolveError::Unnormalizable(_) => resolve.unnormalizable += 1,
            ResolveError::NotFound(_) => resolve.not_found += 1,
            ResolveError::Mismatch { .. } => resolve.mismatch += 1,
        }
    }
    if resolve.failed() > 0 {
        tracing::warn!(
            unnormalizable = resolve.unnormalizable,
            not_found = resolve.not_found,
            mismatch = resolve.mismatch,
            "some terms could not be resolved and will have no similar terms"
        );
    }

    let options = config.engine_options();
    let concepts = resolution.resolved;
    let (candidates, engine) = match config.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("hposim-score-{i}"))
                .build()
                .map_err(|e| PipelineError::Config(format!("thread pool: {e}")))?;
            pool.install(|| score_pairs(&concepts, backend, &options))
        }
        None => score_pairs(&concepts, backend, &options),
    };
    drop(concepts);

    let prune_stats = prune(&mut catalog, candidates, config.max_similar);

    let report = PipelineReport {
        terms: catalog.len() as u64,
        resolve,
        engine,
        prune: prune_stats,
        elapsed: started.elapsed(),
    };
    Ok((Artifact::from_catalog(version, catalog), report))
}

/// Build the index and write it to `config.output`.
pub fn run<B>(
    catalog: Catalog,
    version: &str,
    backend: &B,
    config: &PipelineConfig,
) -> Result<PipelineReport>
where
    B: ConceptResolver + SimilarityOracle<<B as ConceptResolver>::Concept>,
{
    let (artifact, report) = build_index(catalog, version, backend, config)?;
    write_artifact(&config.output, &artifact, config.pretty)?;
    tracing::info!(
        terms = report.terms,
        accepted_pairs = report.engine.accepted,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "precompute finished"
    );
    Ok(report)
}
