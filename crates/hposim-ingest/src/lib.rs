//! OBO-Graphs ingestion for hposim.
//!
//! Reads an ontology document (`hp.json`, or an `.obo` flat file) and
//! produces:
//! - the term catalog the precompute pipeline runs over ([`extract`]),
//! - the sanitized release version tag ([`version`]),
//! - a similarity backend built from the document's own hierarchy
//!   ([`graph::GraphOntology`]).
//!
//! The container shape is checked strictly (a malformed document is a
//! structural error); individual records are interpreted leniently and
//! skipped with a counted reason.

pub mod extract;
pub mod graph;
pub mod obo;
pub mod obograph;
pub mod version;

pub use extract::{extract_catalog, extract_node, ExtractStats, SkipReason};
pub use graph::{GraphConcept, GraphOntology, GraphStats};
pub use obo::{load_obo, parse_obo};
pub use obograph::{load_document, parse_bytes, parse_document, OboGraph};
pub use version::{ontology_version, sanitize_version};

use hposim_core::error::Result;
use hposim_core::Catalog;
use std::path::Path;

/// A parsed ontology document and everything extracted from it.
#[derive(Debug)]
pub struct Ingested {
    pub graph: OboGraph,
    pub catalog: Catalog,
    pub stats: ExtractStats,
    pub version: String,
}

impl Ingested {
    pub fn from_graph(graph: OboGraph) -> Self {
        let (catalog, stats) = extract_catalog(&graph.nodes);
        let version = ontology_version(&graph.meta);
        tracing::info!(version = %version, terms = catalog.len(), "ingested ontology");
        Self {
            graph,
            catalog,
            stats,
            version,
        }
    }

    /// Build the hierarchy backend for this document.
    pub fn graph_backend(&self) -> GraphOntology {
        GraphOntology::from_graph(&self.graph)
    }
}

/// Load an ontology document, picking the reader by file extension:
/// `.obo` is read as OBO 1.4, anything else as OBO-Graphs JSON.
pub fn load_ontology(path: &Path) -> Result<OboGraph> {
    let is_obo = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("obo"));
    if is_obo {
        load_obo(path)
    } else {
        load_document(path)
    }
}

/// Read and extract an ontology document.
pub fn ingest_file(path: &Path) -> Result<Ingested> {
    Ok(Ingested::from_graph(load_ontology(path)?))
}
