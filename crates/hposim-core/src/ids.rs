//! Short/long identifier forms.
//!
//! Ontology sources mix two encodings of the same concept:
//!
//! - short CURIE-like ids: `HP:0000118`
//! - OBO PURLs: `http://purl.obolibrary.org/obo/HP_0000118`
//!
//! Backends are always queried with the short form.

use regex::Regex;
use std::sync::LazyLock;

/// Default PURL prefix used by [`lengthen`].
pub const OBO_PURL_BASE: &str = "http://purl.obolibrary.org/obo/";

static SHORT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]+:[0-9]{7}$").expect("valid short id regex"));

static LONG_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]+)_([0-9]{7})$").expect("valid long id regex"));

/// `true` if `id` is already in `NS:NNNNNNN` form, `NS` upper-case ASCII.
pub fn is_short_id(id: &str) -> bool {
    SHORT_ID.is_match(id)
}

/// Convert `id` to its short form, or `None` when it has none.
pub fn shorten(id: &str) -> Option<String> {
    if is_short_id(id) {
        return Some(id.to_string());
    }
    if !id.contains('/') {
        return None;
    }
    let segment = id.rsplit('/').next()?;
    let caps = LONG_SEGMENT.captures(segment)?;
    Some(format!("{}:{}", &caps[1], &caps[2]))
}

/// Build the PURL form of a short id under `base`.
///
/// Returns `None` if `short` is not a short id.
pub fn lengthen(short: &str, base: &str) -> Option<String> {
    if !is_short_id(short) {
        return None;
    }
    let (ns, local) = short.split_once(':')?;
    let sep = if base.ends_with('/') { "" } else { "/" };
    Some(format!("{base}{sep}{ns}_{local}"))
}
