//! Catalog and artifact data model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version tag used when the ontology declares none.
pub const UNKNOWN_VERSION: &str = "unknown";

/// One ranked neighbour of a term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarTerm {
    pub id: String,
    pub score: f64,
}

/// One ontology concept as published in the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// Filled by the pruner; empty before that.
    #[serde(default)]
    pub similar: Vec<SimilarTerm>,
}

impl Term {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            definition: String::new(),
            synonyms: Vec::new(),
            similar: Vec::new(),
        }
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = definition.into();
        self
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }
}

/// All retained terms of one run, keyed by original id.
///
/// Ordered so that iteration (and therefore the artifact) is deterministic.
pub type Catalog = BTreeMap<String, Term>;

/// The serialized snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub version: String,
    pub nodes: Vec<Term>,
}

impl Artifact {
    /// Build an artifact from a finished catalog, in catalog order.
    pub fn from_catalog(version: impl Into<String>, catalog: Catalog) -> Self {
        let version = version.into();
        let version = if version.trim().is_empty() {
            UNKNOWN_VERSION.to_string()
        } else {
            version
        };
        Self {
            version,
            nodes: catalog.into_values().collect(),
        }
    }
}
