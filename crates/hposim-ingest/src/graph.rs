//! Built-in similarity backend over the ontology's own `is_a` hierarchy.
//!
//! Each concept's handle is its index in the graph. Similarity is the
//! information-content weighted overlap of the two ancestor sets (each set
//! includes the concept itself):
//!
//! ```text
//! sim(a, b) = Σ IC(anc(a) ∩ anc(b)) / Σ IC(anc(a) ∪ anc(b))
//! IC(t)     = -ln(|desc(t)| / N)          desc(t) includes t
//! ```
//!
//! IC is intrinsic (derived from the hierarchy alone, no annotation corpus),
//! so the root has IC 0 and leaves have the highest IC.

use crate::obograph::{OboGraph, CLASS_NODE_TYPE};
use ahash::AHashMap;
use hposim_core::error::{ResolveError, ScoreError};
use hposim_core::{shorten, ConceptResolver, SimilarityOracle};
use rayon::prelude::*;
use serde_json::Value;
use std::collections::VecDeque;

/// Local name of the alternative-id property, matched whatever its prefix.
const ALT_ID_LOCAL_NAME: &str = "hasAlternativeId";

/// Index of a concept inside a [`GraphOntology`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphConcept(u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub concepts: usize,
    pub alt_ids: usize,
    pub is_a_edges: usize,
    /// `is_a` edges with an endpoint outside the concept set.
    pub skipped_edges: usize,
}

/// Concept hierarchy with precomputed ancestor sets and IC values.
#[derive(Debug)]
pub struct GraphOntology {
    ids: Vec<String>,
    index: AHashMap<String, u32>,
    // alternative short id → primary concept
    alt_index: AHashMap<String, u32>,
    // sorted, includes self
    ancestors: Vec<Vec<u32>>,
    ic: Vec<f64>,
    stats: GraphStats,
}

fn alt_ids(node: &Value) -> Vec<String> {
    let Some(Value::Array(props)) = node.pointer("/meta/basicPropertyValues") else {
        return Vec::new();
    };
    props
        .iter()
        .filter(|pv| {
            pv.get("pred")
                .and_then(Value::as_str)
                .is_some_and(|p| p.ends_with(ALT_ID_LOCAL_NAME))
        })
        .filter_map(|pv| pv.get("val").and_then(Value::as_str))
        .filter_map(shorten)
        .collect()
}

fn is_class(node: &Value) -> bool {
    node.get("type")
        .and_then(Value::as_str)
        .map_or(true, |kind| kind == CLASS_NODE_TYPE)
}

fn ancestors_of(start: u32, parents: &[Vec<u32>]) -> Vec<u32> {
    let mut seen = vec![start];
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        for &p in &parents[node as usize] {
            if !seen.contains(&p) {
                seen.push(p);
                queue.push_back(p);
            }
        }
    }
    seen.sort_unstable();
    seen
}

impl GraphOntology {
    /// Build from a parsed document.
    ///
    /// Concepts are the non-obsolete class nodes whose id has a short form;
    /// hierarchy comes from `is_a` edges between them. Nodes without a `type`
    /// count as classes.
    pub fn from_graph(graph: &OboGraph) -> Self {
        let mut ids = Vec::new();
        let mut index = AHashMap::default();
        let mut pending_alts = Vec::new();

        for node in &graph.nodes {
            if crate::extract::is_obsolete(node) || !is_class(node) {
                continue;
            }
            let Some(short) = node.get("id").and_then(Value::as_str).and_then(shorten) else {
                continue;
            };
            if index.contains_key(&short) {
                continue;
            }
            let idx = ids.len() as u32;
            index.insert(short.clone(), idx);
            ids.push(short);
            pending_alts.push((idx, alt_ids(node)));
        }

        let mut alt_index = AHashMap::default();
        for (idx, alts) in pending_alts {
            for alt in alts {
                if !index.contains_key(&alt) {
                    alt_index.insert(alt, idx);
                }
            }
        }

        let n = ids.len();
        let mut parents: Vec<Vec<u32>> = vec![Vec::new(); n];
        let mut stats = GraphStats {
            concepts: n,
            alt_ids: alt_index.len(),
            ..GraphStats::default()
        };
        for edge in graph.is_a_edges() {
            let child = shorten(&edge.sub).and_then(|s| index.get(&s).copied());
            let parent = shorten(&edge.obj).and_then(|s| index.get(&s).copied());
            match (child, parent) {
                (Some(c), Some(p)) if c != p => {
                    if !parents[c as usize].contains(&p) {
                        parents[c as usize].push(p);
                    }
                    stats.is_a_edges += 1;
                }
                _ => stats.skipped_edges += 1,
            }
        }

        let ancestors: Vec<Vec<u32>> = (0..n as u32)
            .into_par_iter()
            .map(|i| ancestors_of(i, &parents))
            .collect();

        let mut descendants = vec![0u64; n];
        for anc in &ancestors {
            for &a in anc {
                descendants[a as usize] += 1;
            }
        }
        let total = n.max(1) as f64;
        let ic = descendants
            .iter()
            .map(|&d| -((d.max(1) as f64) / total).ln())
            .collect();

        tracing::info!(
            concepts = stats.concepts,
            alt_ids = stats.alt_ids,
            is_a_edges = stats.is_a_edges,
            skipped_edges = stats.skipped_edges,
            "built concept hierarchy"
        );

        Self {
            ids,
            index,
            alt_index,
            ancestors,
            ic,
            stats,
        }
    }

    pub fn stats(&self) -> GraphStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Intrinsic information content of a concept.
    pub fn information_content(&self, concept: GraphConcept) -> f64 {
        self.ic[concept.0 as usize]
    }

    /// Ancestors of `concept` (including itself), as short ids.
    pub fn ancestor_ids(&self, concept: GraphConcept) -> Vec<&str> {
        self.ancestors[concept.0 as usize]
            .iter()
            .map(|&a| self.ids[a as usize].as_str())
            .collect()
    }
}

impl ConceptResolver for GraphOntology {
    type Concept = GraphConcept;

    fn resolve(&self, short_id: &str) -> Result<GraphConcept, ResolveError> {
        self.index
            .get(short_id)
            .or_else(|| self.alt_index.get(short_id))
            .map(|&idx| GraphConcept(idx))
            .ok_or_else(|| ResolveError::NotFound(short_id.to_string()))
    }

    fn concept_id(&self, concept: &GraphConcept) -> String {
        self.ids[concept.0 as usize].clone()
    }
}

impl SimilarityOracle<GraphConcept> for GraphOntology {
    fn score(&self, a: &GraphConcept, b: &GraphConcept) -> Result<f64, ScoreError> {
        if a == b {
            return Ok(1.0);
        }
        let (xs, ys) = (&self.ancestors[a.0 as usize], &self.ancestors[b.0 as usize]);

        // Both lists are sorted: one merge pass gives intersection and union.
        let (mut i, mut j) = (0, 0);
        let (mut common, mut combined) = (0.0, 0.0);
        while i < xs.len() && j < ys.len() {
            let (x, y) = (xs[i], ys[j]);
            if x == y {
                common += self.ic[x as usize];
                combined += self.ic[x as usize];
                i += 1;
                j += 1;
            } else if x < y {
                combined += self.ic[x as usize];
                i += 1;
            } else {
                combined += self.ic[y as usize];
                j += 1;
            }
        }
        combined += xs[i..].iter().map(|&x| self.ic[x as usize]).sum::<f64>();
        combined += ys[j..].iter().map(|&y| self.ic[y as usize]).sum::<f64>();

        if combined <= 0.0 {
            return Err(ScoreError::NotComparable);
        }
        Ok(common / combined)
    }
}
