//! Raw node records → term catalog.
//!
//! A record is kept whatever its declared `type`: any node with an id and a
//! label that is not flagged obsolete becomes a term.

use hposim_core::{Catalog, Term};
use serde_json::Value;

/// Why a node record was not turned into a term.
///
/// A record missing its id or label is `BadId` even if it is also obsolete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No usable `id` or `lbl` (or the record is not an object).
    BadId,
    /// `meta.obsolete` is `true`.
    Obsolete,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub seen: u64,
    pub kept: u64,
    pub bad_id: u64,
    pub obsolete: u64,
    /// Records whose id was already in the catalog (the later one wins).
    pub duplicates: u64,
}

impl ExtractStats {
    fn skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::BadId => self.bad_id += 1,
            SkipReason::Obsolete => self.obsolete += 1,
        }
    }
}

/// String field, missing when absent or empty. Whitespace is kept verbatim.
fn non_empty_str<'a>(node: &'a Value, key: &str) -> Option<&'a str> {
    node.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// `true` when `meta.obsolete` is literally `true`.
pub fn is_obsolete(node: &Value) -> bool {
    node.pointer("/meta/obsolete")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// `meta.definition.val`, or empty.
fn definition(node: &Value) -> String {
    node.pointer("/meta/definition/val")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// `meta.synonyms[*].val`, keeping only non-empty string values.
fn synonyms(node: &Value) -> Vec<String> {
    let Some(Value::Array(raw)) = node.pointer("/meta/synonyms") else {
        return Vec::new();
    };
    raw.iter()
        .filter_map(|syn| syn.get("val").and_then(Value::as_str))
        .filter(|val| !val.is_empty())
        .map(str::to_string)
        .collect()
}

/// Interpret one raw node record.
pub fn extract_node(node: &Value) -> Result<Term, SkipReason> {
    let (Some(id), Some(label)) = (non_empty_str(node, "id"), non_empty_str(node, "lbl")) else {
        return Err(SkipReason::BadId);
    };
    if is_obsolete(node) {
        return Err(SkipReason::Obsolete);
    }

    Ok(Term::new(id, label)
        .with_definition(definition(node))
        .with_synonyms(synonyms(node)))
}

/// Build the catalog from raw node records.
pub fn extract_catalog<'a, I>(nodes: I) -> (Catalog, ExtractStats)
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut catalog = Catalog::new();
    let mut stats = ExtractStats::default();

    for node in nodes {
        stats.seen += 1;
        match extract_node(node) {
            Ok(term) => {
                if catalog.insert(term.id.clone(), term).is_some() {
                    stats.duplicates += 1;
                }
            }
            Err(reason) => stats.skip(reason),
        }
    }
    stats.kept = catalog.len() as u64;

    tracing::info!(
        seen = stats.seen,
        kept = stats.kept,
        bad_id = stats.bad_id,
        obsolete = stats.obsolete,
        duplicates = stats.duplicates,
        "extracted ontology terms"
    );

    (catalog, stats)
}
