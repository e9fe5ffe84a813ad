//! OBO-Graphs JSON document model.
//!
//! Only the first graph of a document is used. The container shape
//! (`graphs[0].nodes`) is checked strictly; individual nodes and edges are
//! kept as raw JSON and interpreted leniently by the extractor, so one odd
//! record never sinks the whole document.

use hposim_core::error::{PipelineError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// `pred` of subclass edges.
pub const IS_A: &str = "is_a";

/// Node `type` value for ontology classes.
pub const CLASS_NODE_TYPE: &str = "CLASS";

/// `pred` of the property value carrying a merged (alternative) id.
pub const HAS_ALTERNATIVE_ID: &str = "http://www.geneontology.org/formats/oboInOwl#hasAlternativeId";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyValue {
    #[serde(default)]
    pub pred: String,
    #[serde(default)]
    pub val: String,
}

/// Graph-level metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMeta {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub basic_property_values: Vec<PropertyValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawEdge {
    pub sub: String,
    pub pred: String,
    pub obj: String,
}

/// First graph of an OBO-Graphs document.
#[derive(Debug, Clone, Default)]
pub struct OboGraph {
    pub id: Option<String>,
    pub meta: GraphMeta,
    /// Raw node records, in document order.
    pub nodes: Vec<Value>,
    /// Well-formed edges; malformed ones are dropped on load.
    pub edges: Vec<RawEdge>,
}

impl OboGraph {
    pub fn is_a_edges(&self) -> impl Iterator<Item = &RawEdge> {
        self.edges.iter().filter(|e| e.pred == IS_A)
    }
}

fn structural(msg: impl Into<String>) -> PipelineError {
    PipelineError::Structural(msg.into())
}

/// Pull the first graph out of a parsed document.
pub fn from_value(mut doc: Value) -> Result<OboGraph> {
    let graphs = match doc.get_mut("graphs") {
        Some(Value::Array(graphs)) => graphs,
        Some(_) => return Err(structural("`graphs` is not an array")),
        None => return Err(structural("missing `graphs`")),
    };
    if graphs.is_empty() {
        return Err(structural("`graphs` is empty"));
    }
    let mut graph = graphs.swap_remove(0);

    let nodes = match graph.get_mut("nodes").map(Value::take) {
        Some(Value::Array(nodes)) => nodes,
        Some(_) => return Err(structural("`graphs[0].nodes` is not an array")),
        None => return Err(structural("missing `graphs[0].nodes`")),
    };

    let meta = match graph.get_mut("meta").map(Value::take) {
        Some(meta) => serde_json::from_value(meta).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable graph metadata");
            GraphMeta::default()
        }),
        None => GraphMeta::default(),
    };

    let mut edges = Vec::new();
    let mut malformed_edges = 0usize;
    if let Some(Value::Array(raw)) = graph.get_mut("edges").map(Value::take) {
        edges.reserve(raw.len());
        for edge in raw {
            match serde_json::from_value::<RawEdge>(edge) {
                Ok(edge) => edges.push(edge),
                Err(_) => malformed_edges += 1,
            }
        }
    }
    if malformed_edges > 0 {
        tracing::warn!(malformed_edges, "skipped malformed edges");
    }

    let id = graph.get("id").and_then(Value::as_str).map(str::to_string);

    tracing::info!(
        graph = id.as_deref().unwrap_or("<anonymous>"),
        nodes = nodes.len(),
        edges = edges.len(),
        "parsed ontology graph"
    );

    Ok(OboGraph {
        id,
        meta,
        nodes,
        edges,
    })
}

pub fn parse_document(text: &str) -> Result<OboGraph> {
    parse_bytes(text.as_bytes())
}

/// Parse raw document bytes. Invalid UTF-8 inside the document is a
/// structural error, not an I/O one.
pub fn parse_bytes(bytes: &[u8]) -> Result<OboGraph> {
    let doc: Value =
        serde_json::from_slice(bytes).map_err(|e| structural(format!("invalid JSON: {e}")))?;
    from_value(doc)
}

/// Read a source file. Only failures to open or read it are I/O errors.
pub(crate) fn read_source(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| PipelineError::io(path, e))
}

pub fn load_document(path: &Path) -> Result<OboGraph> {
    parse_bytes(&read_source(path)?)
}
