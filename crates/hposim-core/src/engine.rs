//! Pairwise similarity scan.
//!
//! Every unordered pair `(i, j)`, `i < j`, of resolved concepts is scored
//! exactly once. Accepted pairs fan out into two half-edges, one on each
//! endpoint, so the candidate relation is symmetric before pruning.
//!
//! The scan is parallel over rows of the upper triangle. Half-edges are
//! accumulated in one mutex-guarded slot per concept; a worker only ever
//! holds one slot lock at a time, so there is no lock ordering to get wrong.

use crate::backend::SimilarityOracle;
use crate::error::ScoreError;
use ahash::AHashMap;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Default similarity threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.4;

/// Number of decimal digits kept in stored scores.
pub const SCORE_DECIMALS: i32 = 3;

/// Round a raw score to [`SCORE_DECIMALS`] digits.
pub fn round_score(score: f64) -> f64 {
    let scale = 10f64.powi(SCORE_DECIMALS);
    (score * scale).round() / scale
}

/// Directed half of an accepted pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEdge {
    pub source: String,
    pub target: String,
    pub score: f64,
}

/// Candidate lists keyed by source id. Ids without accepted pairs are absent.
pub type Candidates = AHashMap<String, Vec<CandidateEdge>>;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Pairs scoring at or above this are kept.
    pub threshold: f64,
    /// Calls slower than this are treated as failed.
    pub max_call_latency: Option<Duration>,
    /// Emit a progress line every this many finished rows (0 = never).
    pub progress_every: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_call_latency: None,
            progress_every: 1000,
        }
    }
}

/// Counters for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Pairs considered (`n * (n - 1) / 2`).
    pub pairs: u64,
    /// Pairs the oracle returned a usable score for.
    pub scored: u64,
    /// Pairs at or above threshold.
    pub accepted: u64,
    pub failed_not_comparable: u64,
    pub failed_unavailable: u64,
    pub failed_timeout: u64,
}

impl EngineStats {
    pub fn failed(&self) -> u64 {
        self.failed_not_comparable + self.failed_unavailable + self.failed_timeout
    }

    fn record_failure(&mut self, err: &ScoreError) {
        match err {
            ScoreError::NotComparable => self.failed_not_comparable += 1,
            ScoreError::Unavailable(_) => self.failed_unavailable += 1,
            ScoreError::Timeout(_) => self.failed_timeout += 1,
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.pairs += other.pairs;
        self.scored += other.scored;
        self.accepted += other.accepted;
        self.failed_not_comparable += other.failed_not_comparable;
        self.failed_unavailable += other.failed_unavailable;
        self.failed_timeout += other.failed_timeout;
        self
    }
}

/// Score one pair, folding latency overruns and non-finite values into
/// [`ScoreError`].
fn score_pair<C, O>(oracle: &O, a: &C, b: &C, limit: Option<Duration>) -> Result<f64, ScoreError>
where
    O: SimilarityOracle<C> + ?Sized,
{
    let started = Instant::now();
    let result = oracle.score(a, b);
    if let Some(limit) = limit {
        if started.elapsed() > limit {
            return Err(ScoreError::Timeout(limit.as_millis() as u64));
        }
    }
    match result {
        Ok(score) if score.is_finite() => Ok(score),
        Ok(_) => Err(ScoreError::NotComparable),
        Err(err) => Err(err),
    }
}

/// Score all pairs of `concepts` and collect symmetric candidate edges.
///
/// Runs on the current rayon pool; callers that want a bounded thread count
/// should wrap this in `ThreadPool::install`.
pub fn score_pairs<C, O>(
    concepts: &[(String, C)],
    oracle: &O,
    options: &EngineOptions,
) -> (Candidates, EngineStats)
where
    C: Send + Sync,
    O: SimilarityOracle<C> + ?Sized,
{
    let n = concepts.len();
    let slots: Vec<Mutex<Vec<(u32, f64)>>> = (0..n).map(|_| Mutex::new(Vec::new())).collect();
    let rows_done = AtomicUsize::new(0);

    tracing::info!(
        concepts = n,
        pairs = (n as u64) * (n.saturating_sub(1) as u64) / 2,
        threshold = options.threshold,
        "scoring concept pairs"
    );

    let stats = (0..n)
        .into_par_iter()
        .map(|i| {
            let mut stats = EngineStats::default();
            let mut own = Vec::new();
            let (_, a) = &concepts[i];

            for (j, (_, b)) in concepts.iter().enumerate().skip(i + 1) {
                stats.pairs += 1;
                match score_pair(oracle, a, b, options.max_call_latency) {
                    Ok(score) => {
                        stats.scored += 1;
                        if score >= options.threshold {
                            stats.accepted += 1;
                            let stored = round_score(score);
                            own.push((j as u32, stored));
                            slots[j].lock().push((i as u32, stored));
                        }
                    }
                    Err(err) => stats.record_failure(&err),
                }
            }

            if !own.is_empty() {
                slots[i].lock().extend(own);
            }

            let done = rows_done.fetch_add(1, Ordering::Relaxed) + 1;
            if options.progress_every > 0 && done % options.progress_every == 0 {
                tracing::debug!(rows = done, total = n, "similarity scan progress");
            }
            stats
        })
        .reduce(EngineStats::default, EngineStats::merge);

    let mut candidates = Candidates::default();
    for (i, slot) in slots.into_iter().enumerate() {
        let edges = slot.into_inner();
        if edges.is_empty() {
            continue;
        }
        let source = &concepts[i].0;
        let list = edges
            .into_iter()
            .map(|(j, score)| CandidateEdge {
                source: source.clone(),
                target: concepts[j as usize].0.clone(),
                score,
            })
            .collect();
        candidates.insert(source.clone(), list);
    }

    tracing::info!(
        scored = stats.scored,
        accepted = stats.accepted,
        failed = stats.failed(),
        "similarity scan finished"
    );

    (candidates, stats)
}
