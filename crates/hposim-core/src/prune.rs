//! Per-node top-K selection.

use crate::engine::{CandidateEdge, Candidates};
use crate::model::{Catalog, SimilarTerm};
use ahash::AHashSet;
use std::cmp::Ordering;

/// Default number of neighbours kept per term.
pub const DEFAULT_MAX_SIMILAR: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    /// Candidates whose target is not in the catalog.
    pub dangling: u64,
    /// Repeated targets and self-edges.
    pub duplicates: u64,
    /// Terms that still had a keepable candidate after `max_similar` were kept.
    pub truncated_nodes: u64,
    /// Terms that ended with a non-empty `similar` list.
    pub nodes_with_similar: u64,
}

/// Ranking order: score descending, then target id ascending.
fn rank(a: &CandidateEdge, b: &CandidateEdge) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.target.cmp(&b.target))
}

/// Select the kept neighbours of one term.
fn select(
    source: &str,
    mut edges: Vec<CandidateEdge>,
    catalog: &Catalog,
    max_similar: usize,
    stats: &mut PruneStats,
) -> Vec<SimilarTerm> {
    edges.sort_by(rank);

    let mut kept = Vec::with_capacity(max_similar.min(edges.len()));
    let mut seen: AHashSet<&str> = AHashSet::new();

    for edge in &edges {
        if edge.target == source || seen.contains(edge.target.as_str()) {
            stats.duplicates += 1;
            continue;
        }
        if !catalog.contains_key(&edge.target) {
            stats.dangling += 1;
            continue;
        }
        if kept.len() >= max_similar {
            stats.truncated_nodes += 1;
            break;
        }
        seen.insert(edge.target.as_str());
        kept.push(SimilarTerm {
            id: edge.target.clone(),
            score: edge.score,
        });
    }

    kept
}

/// Fill `similar` on every catalog term that has candidates.
///
/// Terms without candidates keep an empty list. Candidate lists for ids that
/// are not in the catalog are ignored.
pub fn prune(catalog: &mut Catalog, mut candidates: Candidates, max_similar: usize) -> PruneStats {
    let mut stats = PruneStats::default();

    let ids: Vec<String> = catalog.keys().cloned().collect();
    for id in ids {
        let Some(edges) = candidates.remove(&id) else {
            continue;
        };
        let similar = select(&id, edges, catalog, max_similar, &mut stats);
        if !similar.is_empty() {
            stats.nodes_with_similar += 1;
        }
        if let Some(term) = catalog.get_mut(&id) {
            term.similar = similar;
        }
    }

    if !candidates.is_empty() {
        tracing::warn!(
            orphaned = candidates.len(),
            "candidate lists for ids outside the catalog were discarded"
        );
    }

    tracing::info!(
        with_similar = stats.nodes_with_similar,
        truncated = stats.truncated_nodes,
        dangling = stats.dangling,
        duplicates = stats.duplicates,
        "pruned similarity lists"
    );

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Term;

    fn catalog(ids: &[&str]) -> Catalog {
        ids.iter()
            .map(|id| (id.to_string(), Term::new(*id, *id)))
            .collect()
    }

    fn edge(source: &str, target: &str, score: f64) -> CandidateEdge {
        CandidateEdge {
            source: source.to_string(),
            target: target.to_string(),
            score,
        }
    }

    fn ids(similar: &[SimilarTerm]) -> Vec<&str> {
        similar.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn sorts_descending_and_breaks_ties_by_id() {
        let mut cat = catalog(&["A", "B", "C", "D"]);
        let mut cands = Candidates::default();
        cands.insert(
            "A".into(),
            vec![edge("A", "D", 0.5), edge("A", "C", 0.7), edge("A", "B", 0.5)],
        );

        prune(&mut cat, cands, 10);
        assert_eq!(ids(&cat["A"].similar), vec!["C", "B", "D"]);
    }

    #[test]
    fn drops_dangling_duplicate_and_self_edges() {
        let mut cat = catalog(&["A", "B"]);
        let mut cands = Candidates::default();
        cands.insert(
            "A".into(),
            vec![
                edge("A", "GONE", 0.9),
                edge("A", "B", 0.8),
                edge("A", "B", 0.8),
                edge("A", "A", 1.0),
            ],
        );

        let stats = prune(&mut cat, cands, 10);
        assert_eq!(ids(&cat["A"].similar), vec!["B"]);
        assert_eq!(stats.dangling, 1);
        assert_eq!(stats.duplicates, 2);
    }

    #[test]
    fn truncates_to_max_similar() {
        let mut cat = catalog(&["A", "B", "C", "D"]);
        let mut cands = Candidates::default();
        cands.insert(
            "A".into(),
            vec![edge("A", "B", 0.9), edge("A", "C", 0.8), edge("A", "D", 0.7)],
        );

        let stats = prune(&mut cat, cands, 2);
        assert_eq!(ids(&cat["A"].similar), vec!["B", "C"]);
        assert_eq!(stats.truncated_nodes, 1);
    }

    #[test]
    fn unkeepable_leftovers_do_not_count_as_truncation() {
        let mut cat = catalog(&["A", "B", "C"]);
        let mut cands = Candidates::default();
        cands.insert(
            "A".into(),
            vec![edge("A", "B", 0.9), edge("A", "B", 0.5), edge("A", "GONE", 0.4)],
        );
        cands.insert("C".into(), vec![edge("C", "A", 0.9), edge("C", "B", 0.5)]);

        let stats = prune(&mut cat, cands, 1);
        assert_eq!(ids(&cat["A"].similar), vec!["B"]);
        assert_eq!(ids(&cat["C"].similar), vec!["A"]);
        assert_eq!(stats.truncated_nodes, 1);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.dangling, 1);
    }

    #[test]
    fn terms_without_candidates_stay_empty() {
        let mut cat = catalog(&["A", "B"]);
        prune(&mut cat, Candidates::default(), 10);
        assert!(cat["A"].similar.is_empty());
        assert!(cat["B"].similar.is_empty());
        assert_eq!(cat.len(), 2);
    }
}
