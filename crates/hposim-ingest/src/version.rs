//! Ontology release version.

use crate::obograph::GraphMeta;
use hposim_core::UNKNOWN_VERSION;

/// Make a version string safe as a file/tag token: spaces become `_` and
/// slashes become `-`.
pub fn sanitize_version(raw: &str) -> String {
    raw.trim().replace(' ', "_").replace('/', "-")
}

/// Reduce a release PURL (`.../releases/2024-01-16/hp.json`) to its release
/// segment. Anything else is returned trimmed.
pub fn release_tag(raw: &str) -> &str {
    let raw = raw.trim();
    let mut segments = raw.split('/');
    while let Some(seg) = segments.next() {
        if seg == "releases" {
            if let Some(tag) = segments.next().filter(|t| !t.is_empty()) {
                return tag;
            }
        }
    }
    raw
}

/// Declared version of a graph, sanitized; `"unknown"` when absent.
///
/// `meta.version` wins over an `owl:versionInfo` property value.
pub fn ontology_version(meta: &GraphMeta) -> String {
    let declared = meta
        .version
        .as_deref()
        .map(release_tag)
        .filter(|v| !v.is_empty())
        .or_else(|| {
            meta.basic_property_values
                .iter()
                .find(|pv| pv.pred.ends_with("versionInfo"))
                .map(|pv| pv.val.trim())
                .filter(|v| !v.is_empty())
        });

    match declared {
        Some(v) => sanitize_version(v),
        None => UNKNOWN_VERSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obograph::PropertyValue;

    #[test]
    fn sanitizes_spaces_and_slashes() {
        assert_eq!(sanitize_version("2024-01 release/v2"), "2024-01_release-v2");
        assert_eq!(sanitize_version("  2024-01-16 "), "2024-01-16");
    }

    #[test]
    fn release_purls_reduce_to_tag() {
        assert_eq!(
            release_tag("http://purl.obolibrary.org/obo/hp/releases/2024-01-16/hp.json"),
            "2024-01-16"
        );
        assert_eq!(release_tag("2024-01-16"), "2024-01-16");
        assert_eq!(release_tag("a/releases/"), "a/releases/");
    }

    #[test]
    fn version_sources_in_order() {
        let meta = GraphMeta {
            version: Some("http://purl.obolibrary.org/obo/hp/releases/2024-01-16/hp.json".into()),
            basic_property_values: vec![PropertyValue {
                pred: "http://www.w3.org/2002/07/owl#versionInfo".into(),
                val: "ignored".into(),
            }],
        };
        assert_eq!(ontology_version(&meta), "2024-01-16");

        let meta = GraphMeta {
            version: None,
            basic_property_values: vec![PropertyValue {
                pred: "http://www.w3.org/2002/07/owl#versionInfo".into(),
                val: "2024-01 release/v2".into(),
            }],
        };
        assert_eq!(ontology_version(&meta), "2024-01_release-v2");

        assert_eq!(ontology_version(&GraphMeta::default()), "unknown");
    }
}
