use hposim_core::{build_index, ConceptResolver, PipelineConfig, PipelineError, ResolveError};
use hposim_ingest::{ingest_file, ExtractStats, Ingested};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/mini_hp.json")
}

fn obo_fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/mini_hp.obo")
}

fn hp(n: u32) -> String {
    format!("http://purl.obolibrary.org/obo/HP_{n:07}")
}

fn load() -> Ingested {
    ingest_file(&fixture()).expect("fixture should ingest")
}

#[test]
fn test_fixture_extraction_counts_and_version() {
    let ingested = load();

    assert_eq!(ingested.version, "2024-01-16");
    assert_eq!(
        ingested.stats,
        ExtractStats {
            seen: 12,
            kept: 10,
            bad_id: 1,
            obsolete: 1,
            duplicates: 0,
        }
    );
    assert!(!ingested.catalog.contains_key(&hp(100)), "obsolete term kept");
    assert!(!ingested.catalog.contains_key(&hp(200)), "unlabelled term kept");
    // Property nodes are catalog entries like any other record.
    assert_eq!(
        ingested.catalog["http://purl.obolibrary.org/obo/hp#has_modifier"].label,
        "has modifier"
    );

    let seizure = &ingested.catalog[&hp(1250)];
    assert_eq!(seizure.label, "Seizure");
    assert_eq!(seizure.synonyms, vec!["Epileptic seizure"]);
    assert!(seizure.definition.starts_with("A seizure is"));
}

#[test]
fn test_graph_backend_resolution() {
    let ingested = load();
    let graph = ingested.graph_backend();

    // Unlabelled nodes are still part of the hierarchy.
    assert_eq!(graph.len(), 9);

    let alt = graph.resolve("HP:0002279").unwrap();
    assert_eq!(graph.concept_id(&alt), "HP:0001250");
    assert!(matches!(
        graph.resolve("HP:0000100"),
        Err(ResolveError::NotFound(_))
    ));
}

#[test]
fn test_end_to_end_with_graph_backend() {
    let ingested = load();
    let graph = ingested.graph_backend();
    let config = PipelineConfig::default();

    let (artifact, report) =
        build_index(ingested.catalog, &ingested.version, &graph, &config).unwrap();

    assert_eq!(artifact.version, "2024-01-16");
    assert_eq!(artifact.nodes.len(), 10);
    assert_eq!(report.resolve.resolved, 8);
    assert_eq!(report.resolve.unnormalizable, 2);
    assert_eq!(report.engine.accepted, 4);

    let similar = |id: &str| -> Vec<(String, f64)> {
        artifact
            .nodes
            .iter()
            .find(|t| t.id == id)
            .unwrap()
            .similar
            .iter()
            .map(|s| (s.id.clone(), s.score))
            .collect()
    };

    assert_eq!(
        similar(&hp(1250)),
        vec![(hp(707), 0.518), (hp(2069), 0.509), (hp(7359), 0.509)]
    );
    assert_eq!(similar(&hp(2069)), vec![(hp(1250), 0.509)]);
    assert_eq!(similar(&hp(505)), vec![(hp(478), 0.46)]);
    assert!(similar(&hp(1)).is_empty());
    assert!(similar("http://example.org/custom/local_term").is_empty());
}

#[test]
fn test_artifact_is_byte_identical_across_runs() {
    let render = || {
        let ingested = load();
        let graph = ingested.graph_backend();
        let (artifact, _) = build_index(
            ingested.catalog,
            &ingested.version,
            &graph,
            &PipelineConfig::default(),
        )
        .unwrap();
        serde_json::to_string(&artifact).unwrap()
    };
    assert_eq!(render(), render());
}

#[test]
fn test_obo_fixture_matches_json_scores() {
    let ingested = ingest_file(&obo_fixture()).unwrap();
    assert_eq!(ingested.version, "2024-01-16");
    assert_eq!(
        ingested.stats,
        ExtractStats {
            seen: 11,
            kept: 9,
            bad_id: 1,
            obsolete: 1,
            duplicates: 0,
        }
    );

    let graph = ingested.graph_backend();
    assert_eq!(graph.len(), 9);
    let alt = graph.resolve("HP:0002279").unwrap();
    assert_eq!(graph.concept_id(&alt), "HP:0001250");

    let (artifact, report) = build_index(
        ingested.catalog,
        &ingested.version,
        &graph,
        &PipelineConfig::default(),
    )
    .unwrap();
    assert_eq!(report.resolve.resolved, 8);
    assert_eq!(report.resolve.unnormalizable, 1);
    assert_eq!(report.engine.accepted, 4);

    let seizure = artifact.nodes.iter().find(|t| t.id == "HP:0001250").unwrap();
    let similar: Vec<(&str, f64)> = seizure
        .similar
        .iter()
        .map(|s| (s.id.as_str(), s.score))
        .collect();
    assert_eq!(
        similar,
        vec![("HP:0000707", 0.518), ("HP:0002069", 0.509), ("HP:0007359", 0.509)]
    );
}

#[test]
fn test_undecodable_documents_are_structural() {
    let dir = tempdir().unwrap();
    for name in ["hp.json", "hp.obo"] {
        let path = dir.path().join(name);
        fs::write(&path, b"[Term]\nid: HP:0000001\nname: \xff\xfe\n").unwrap();
        let err = ingest_file(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Structural(_)), "{name}: {err}");
        assert_eq!(err.exit_code(), 2);
    }

    let missing = ingest_file(&dir.path().join("absent.obo")).unwrap_err();
    assert_eq!(missing.exit_code(), 3);
}
