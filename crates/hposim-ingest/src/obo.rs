//! OBO 1.4 flat-file reader.
//!
//! `[Term]` stanzas become the same raw node records an OBO-Graphs document
//! carries, so extraction and the graph backend do not care which format
//! the ontology came in:
//!
//! | OBO tag        | node record                                   |
//! |----------------|-----------------------------------------------|
//! | `id`           | `id` (kept in its short form)                 |
//! | `name`         | `lbl`                                         |
//! | `def`          | `meta.definition.val`                         |
//! | `synonym`      | `meta.synonyms[].val` (+ scope as `pred`)     |
//! | `is_obsolete`  | `meta.obsolete`                               |
//! | `alt_id`       | `meta.basicPropertyValues[]` (alternative id) |
//! | `is_a`         | `is_a` edge                                   |
//!
//! The header's `data-version` becomes the graph version. Other stanza
//! types (`[Typedef]`, `[Instance]`) are skipped.

use crate::obograph::{
    read_source, GraphMeta, OboGraph, RawEdge, CLASS_NODE_TYPE, HAS_ALTERNATIVE_ID, IS_A,
};
use hposim_core::error::{PipelineError, Result};
use serde_json::{json, Map, Value};
use std::path::Path;

const TERM_STANZA: &str = "Term";

#[derive(Debug, Default)]
struct Stanza {
    kind: String,
    id: Option<String>,
    name: Option<String>,
    def: Option<String>,
    synonyms: Vec<(String, String)>,
    alt_ids: Vec<String>,
    is_a: Vec<String>,
    obsolete: bool,
}

impl Stanza {
    fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..Self::default()
        }
    }

    fn into_node(self, edges: &mut Vec<RawEdge>) -> Value {
        let mut meta = Map::new();
        if let Some(def) = self.def {
            meta.insert("definition".into(), json!({ "val": def }));
        }
        if !self.synonyms.is_empty() {
            let synonyms: Vec<Value> = self
                .synonyms
                .into_iter()
                .map(|(pred, val)| json!({ "pred": pred, "val": val }))
                .collect();
            meta.insert("synonyms".into(), Value::Array(synonyms));
        }
        if !self.alt_ids.is_empty() {
            let values: Vec<Value> = self
                .alt_ids
                .into_iter()
                .map(|alt| json!({ "pred": HAS_ALTERNATIVE_ID, "val": alt }))
                .collect();
            meta.insert("basicPropertyValues".into(), Value::Array(values));
        }
        if self.obsolete {
            meta.insert("obsolete".into(), Value::Bool(true));
        }

        if let Some(id) = &self.id {
            edges.extend(self.is_a.into_iter().map(|parent| RawEdge {
                sub: id.clone(),
                pred: IS_A.to_string(),
                obj: parent,
            }));
        }

        let mut node = Map::new();
        if let Some(id) = self.id {
            node.insert("id".into(), Value::String(id));
        }
        if let Some(name) = self.name {
            node.insert("lbl".into(), Value::String(name));
        }
        node.insert("type".into(), Value::String(CLASS_NODE_TYPE.into()));
        if !meta.is_empty() {
            node.insert("meta".into(), Value::Object(meta));
        }
        Value::Object(node)
    }
}

/// Drop a trailing ` ! comment` and surrounding whitespace.
fn strip_comment(value: &str) -> &str {
    value.split(" !").next().unwrap_or(value).trim()
}

/// First whitespace-separated token, ignoring trailing modifiers and comments.
fn first_token(value: &str) -> Option<&str> {
    strip_comment(value).split_whitespace().next()
}

/// Split a `"quoted text" REST` value into its unescaped text and the rest.
fn quoted(value: &str) -> Option<(String, &str)> {
    let body = value.trim_start().strip_prefix('"')?;
    let mut text = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                if let Some((_, escaped)) = chars.next() {
                    text.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                }
            }
            '"' => return Some((text, body[i + 1..].trim_start())),
            _ => text.push(c),
        }
    }
    None
}

/// `pred` for a synonym scope keyword.
fn synonym_pred(rest: &str) -> &'static str {
    match rest.split_whitespace().next() {
        Some("EXACT") => "hasExactSynonym",
        Some("BROAD") => "hasBroadSynonym",
        Some("NARROW") => "hasNarrowSynonym",
        _ => "hasRelatedSynonym",
    }
}

/// Close a stanza: terms become nodes, anything else counts as skipped.
fn finish(stanza: Option<Stanza>, nodes: &mut Vec<Value>, edges: &mut Vec<RawEdge>) -> usize {
    match stanza {
        Some(stanza) if stanza.kind == TERM_STANZA => {
            nodes.push(stanza.into_node(edges));
            0
        }
        Some(_) => 1,
        None => 0,
    }
}

/// Parse OBO text into the first-graph model.
pub fn parse_obo(text: &str) -> Result<OboGraph> {
    let mut meta = GraphMeta::default();
    let mut graph_id = None;
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut current: Option<Stanza> = None;
    let mut skipped_stanzas = 0usize;
    let mut saw_content = false;

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('!') {
            continue;
        }
        saw_content = true;

        if let Some(kind) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            skipped_stanzas += finish(current.take(), &mut nodes, &mut edges);
            current = Some(Stanza::new(kind.trim()));
            continue;
        }

        let Some((tag, value)) = line.split_once(':') else {
            return Err(PipelineError::Structural(format!(
                "OBO line {}: expected `tag: value`, got `{line}`",
                lineno + 1
            )));
        };
        let (tag, value) = (tag.trim(), value.trim());

        let Some(stanza) = current.as_mut() else {
            match tag {
                "data-version" => meta.version = Some(strip_comment(value).to_string()),
                "ontology" => graph_id = Some(strip_comment(value).to_string()),
                _ => {}
            }
            continue;
        };

        match tag {
            "id" => stanza.id = first_token(value).map(str::to_string),
            "name" => stanza.name = Some(strip_comment(value).to_string()),
            "def" => match quoted(value) {
                Some((text, _)) => stanza.def = Some(text),
                None => tracing::warn!(line = lineno + 1, "ignoring unquoted definition"),
            },
            "synonym" => match quoted(value) {
                Some((text, rest)) => stanza.synonyms.push((synonym_pred(rest).to_string(), text)),
                None => tracing::warn!(line = lineno + 1, "ignoring unquoted synonym"),
            },
            "alt_id" => stanza.alt_ids.extend(first_token(value).map(str::to_string)),
            "is_a" => stanza.is_a.extend(first_token(value).map(str::to_string)),
            "is_obsolete" => stanza.obsolete = first_token(value) == Some("true"),
            _ => {}
        }
    }
    skipped_stanzas += finish(current.take(), &mut nodes, &mut edges);

    if !saw_content {
        return Err(PipelineError::Structural("empty OBO document".into()));
    }
    if skipped_stanzas > 0 {
        tracing::debug!(skipped_stanzas, "skipped non-term OBO stanzas");
    }
    tracing::info!(
        ontology = graph_id.as_deref().unwrap_or("<anonymous>"),
        nodes = nodes.len(),
        edges = edges.len(),
        "parsed OBO ontology"
    );

    Ok(OboGraph {
        id: graph_id,
        meta,
        nodes,
        edges,
    })
}

/// Read an `.obo` file. Invalid UTF-8 is a structural error.
pub fn load_obo(path: &Path) -> Result<OboGraph> {
    let bytes = read_source(path)?;
    let text = String::from_utf8(bytes).map_err(|e| {
        PipelineError::Structural(format!("{}: not valid UTF-8: {e}", path.display()))
    })?;
    parse_obo(&text)
}
