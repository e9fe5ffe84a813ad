//! Integration tests for the complete hposim pipeline
//!
//! These tests run the whole path across crates:
//! - OBO-Graphs document → ingest → catalog + version
//! - catalog → resolve → score → prune → artifact on disk
//! - artifact on disk → `ArtifactIndex` lookups
//!
//! Run with: cargo test --test integration_tests

use hposim_core::{read_artifact, run, ArtifactIndex, PipelineConfig, ScoreTable};
use hposim_ingest::ingest_file;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn purl(n: u32) -> String {
    format!("http://purl.obolibrary.org/obo/HP_{n:07}")
}

/// Root with three children A, B, C (HP:0000002..4) plus an obsolete node.
fn write_document(dir: &Path) {
    let doc = json!({
        "graphs": [{
            "id": "http://purl.obolibrary.org/obo/hp.json",
            "meta": { "version": "http://purl.obolibrary.org/obo/hp/releases/2025-05-06/hp.json" },
            "nodes": [
                { "id": purl(1), "lbl": "All", "type": "CLASS" },
                { "id": purl(2), "lbl": "Term A", "type": "CLASS",
                  "meta": { "synonyms": [ { "val": "Alpha" } ] } },
                { "id": purl(3), "lbl": "Term B", "type": "CLASS",
                  "meta": { "definition": { "val": "Shared with alpha and gamma." } } },
                { "id": purl(4), "lbl": "Term C", "type": "CLASS" },
                { "id": purl(5), "lbl": "Retired", "type": "CLASS", "meta": { "obsolete": true } }
            ],
            "edges": [
                { "sub": purl(2), "pred": "is_a", "obj": purl(1) },
                { "sub": purl(3), "pred": "is_a", "obj": purl(1) },
                { "sub": purl(4), "pred": "is_a", "obj": purl(1) }
            ]
        }]
    });
    fs::write(dir.join("hp.json"), serde_json::to_string(&doc).unwrap()).unwrap();
}

fn config(dir: &Path, out: &str) -> PipelineConfig {
    PipelineConfig {
        source_dir: dir.to_path_buf(),
        output: dir.join(out),
        ..PipelineConfig::default()
    }
}

// ============================================================================
// Document → artifact → lookup
// ============================================================================

#[test]
fn test_table_scores_top1_selection_end_to_end() {
    let dir = tempdir().unwrap();
    write_document(dir.path());

    let ingested = ingest_file(&dir.path().join("hp.json")).unwrap();
    assert_eq!(ingested.version, "2025-05-06");
    assert_eq!(ingested.catalog.len(), 4);

    let table = ScoreTable::parse("HP:0000002\tHP:0000003\t0.5\nHP:0000003\tHP:0000004\t0.6\n")
        .unwrap();
    let config = PipelineConfig {
        max_similar: 1,
        ..config(dir.path(), "out/hpo_similarity.json")
    };
    let report = run(ingested.catalog, &ingested.version, &table, &config).unwrap();
    assert_eq!(report.engine.accepted, 2);
    assert_eq!(report.prune.truncated_nodes, 1);

    let index = ArtifactIndex::load(&config.output).unwrap();
    assert_eq!(index.version(), "2025-05-06");

    let top = |n: u32| -> Vec<(String, f64)> {
        index
            .similar_to(&purl(n))
            .iter()
            .map(|s| (s.id.clone(), s.score))
            .collect()
    };
    assert_eq!(top(2), vec![(purl(3), 0.5)]);
    assert_eq!(top(3), vec![(purl(4), 0.6)]);
    assert_eq!(top(4), vec![(purl(3), 0.6)]);
    assert!(top(1).is_empty());

    let hits: Vec<String> = index.search("alpha").into_iter().map(|h| h.id).collect();
    assert_eq!(hits, vec![purl(2), purl(3)]);
    assert!(index.search("a").is_empty());
}

#[test]
fn test_graph_backend_siblings_are_mutual_neighbours() {
    let dir = tempdir().unwrap();
    write_document(dir.path());

    let ingested = ingest_file(&dir.path().join("hp.json")).unwrap();
    let graph = ingested.graph_backend();
    let config = PipelineConfig {
        threshold: 0.0,
        ..config(dir.path(), "hpo_similarity.json")
    };
    run(ingested.catalog, &ingested.version, &graph, &config).unwrap();

    let index = ArtifactIndex::load(&config.output).unwrap();
    // Siblings A, B, C score 0 against each other (only the IC-0 root is
    // shared) and against the root, so with threshold 0 everything pairs up.
    for n in 2..=4 {
        let similar = index.similar_to(&purl(n));
        assert_eq!(similar.len(), 3, "{}", purl(n));
        assert!(similar.iter().all(|s| s.score == 0.0));
        assert!(similar.iter().all(|s| s.id != purl(n)));
    }
}

#[test]
fn test_pretty_and_compact_artifacts_hold_the_same_data() {
    let dir = tempdir().unwrap();
    write_document(dir.path());
    let table = ScoreTable::parse("HP:0000002\tHP:0000003\t0.75\n").unwrap();

    let compact = config(dir.path(), "compact.json");
    let pretty = PipelineConfig {
        pretty: true,
        ..config(dir.path(), "pretty.json")
    };
    for config in [&compact, &pretty] {
        let ingested = ingest_file(&dir.path().join("hp.json")).unwrap();
        run(ingested.catalog, &ingested.version, &table, config).unwrap();
    }

    let compact_text = fs::read_to_string(&compact.output).unwrap();
    let pretty_text = fs::read_to_string(&pretty.output).unwrap();
    assert!(!compact_text.contains('\n'));
    assert!(pretty_text.contains('\n'));
    assert_eq!(
        read_artifact(&compact.output).unwrap(),
        read_artifact(&pretty.output).unwrap()
    );
}

#[test]
fn test_rerun_replaces_previous_artifact() {
    let dir = tempdir().unwrap();
    write_document(dir.path());
    let config = config(dir.path(), "hpo_similarity.json");

    let first = ScoreTable::parse("HP:0000002\tHP:0000003\t0.9\n").unwrap();
    let ingested = ingest_file(&dir.path().join("hp.json")).unwrap();
    run(ingested.catalog, &ingested.version, &first, &config).unwrap();

    let second = ScoreTable::parse("HP:0000003\tHP:0000004\t0.8\n").unwrap();
    let ingested = ingest_file(&dir.path().join("hp.json")).unwrap();
    run(ingested.catalog, &ingested.version, &second, &config).unwrap();

    let index = ArtifactIndex::load(&config.output).unwrap();
    assert!(index.similar_to(&purl(2)).is_empty());
    assert_eq!(index.similar_to(&purl(4))[0].id, purl(3));

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}
