//! `hposim build`: run the precompute job.

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use hposim_core::{run, PipelineConfig, PipelineError, PipelineReport, ScoreTable};
use hposim_ingest::{ingest_file, sanitize_version};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Intrinsic-IC similarity over the document's own `is_a` hierarchy.
    #[default]
    Graph,
    /// Precomputed pair scores from a TSV file (`--scores`).
    Table,
}

#[derive(Debug, Clone, Default, Args)]
pub struct BuildArgs {
    /// JSON config file. Flags below override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the ontology document.
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// Ontology document name inside the source directory.
    #[arg(long)]
    pub source_file: Option<String>,

    /// Artifact destination.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Minimum similarity score for a pair to be kept, in [0, 1].
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Maximum neighbours stored per term.
    #[arg(long)]
    pub max_similar: Option<usize>,

    /// Worker threads for the pair scan (default: one per core).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Count oracle calls slower than this as failures.
    #[arg(long)]
    pub max_call_latency_ms: Option<u64>,

    /// Indent the artifact JSON.
    #[arg(long)]
    pub pretty: bool,

    /// Similarity backend.
    #[arg(long, value_enum, default_value_t = BackendKind::Graph)]
    pub backend: BackendKind,

    /// Score table for `--backend table` (`a<TAB>b<TAB>score`).
    #[arg(long)]
    pub scores: Option<PathBuf>,

    /// Override the version recorded in the artifact.
    #[arg(long)]
    pub version_tag: Option<String>,
}

impl BuildArgs {
    /// Effective configuration: defaults, then `--config`, then flags.
    pub fn pipeline_config(&self) -> Result<PipelineConfig, PipelineError> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(dir) = &self.source_dir {
            config.source_dir = dir.clone();
        }
        if let Some(file) = &self.source_file {
            config.source_file = file.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(max_similar) = self.max_similar {
            config.max_similar = max_similar;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        if self.max_call_latency_ms.is_some() {
            config.max_call_latency_ms = self.max_call_latency_ms;
        }
        if self.pretty {
            config.pretty = true;
        }

        config.validate()?;
        Ok(config)
    }
}

pub fn cmd_build(args: &BuildArgs) -> Result<()> {
    let config = args.pipeline_config()?;
    let source = config.source_path();
    println!("{} {}", "Ingesting".green().bold(), source.display());

    let ingested = ingest_file(&source)?;
    let version = match &args.version_tag {
        Some(tag) => sanitize_version(tag),
        None => ingested.version.clone(),
    };

    println!(
        "{} {} terms ({} backend, threshold {}, top {})",
        "Scoring".green().bold(),
        ingested.catalog.len(),
        match args.backend {
            BackendKind::Graph => "graph",
            BackendKind::Table => "table",
        },
        config.threshold,
        config.max_similar
    );

    let report = match args.backend {
        BackendKind::Graph => {
            let graph = ingested.graph_backend();
            run(ingested.catalog, &version, &graph, &config)?
        }
        BackendKind::Table => {
            let path = args.scores.as_ref().ok_or_else(|| {
                PipelineError::Config("`--scores` is required with `--backend table`".into())
            })?;
            let table = ScoreTable::load(path)?;
            run(ingested.catalog, &version, &table, &config)?
        }
    };

    print_report(&report, &config, &version);
    Ok(())
}

fn print_report(report: &PipelineReport, config: &PipelineConfig, version: &str) {
    println!(
        "{} {} ({} terms, version {})",
        "wrote".green().bold(),
        config.output.display().to_string().bold(),
        report.terms,
        version
    );
    println!(
        "  {} resolved {}, unnormalizable {}, not found {}, mismatched {}",
        "→".cyan(),
        report.resolve.resolved,
        report.resolve.unnormalizable,
        report.resolve.not_found,
        report.resolve.mismatch
    );
    println!(
        "  {} pairs {}, scored {}, accepted {}, failed {}",
        "→".cyan(),
        report.engine.pairs,
        report.engine.scored,
        report.engine.accepted,
        report.engine.failed()
    );
    println!(
        "  {} {} terms with neighbours, {} truncated lists",
        "→".cyan(),
        report.prune.nodes_with_similar,
        report.prune.truncated_nodes
    );
    println!("  {} elapsed {:.2?}", "→".cyan(), report.elapsed);

    let skipped = report.resolve.failed() + report.engine.failed();
    if skipped > 0 {
        eprintln!(
            "{} {} ids or pairs were skipped (see log for details)",
            "warning:".yellow().bold(),
            skipped
        );
    }
}
