//! hposim CLI
//!
//! - `build`: precompute the top-K similarity index for an ontology release
//! - `search` / `similar`: query a written artifact
//! - `version`: print the sanitized release tag of an ontology document

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use hposim_core::{PipelineConfig, PipelineError, MAX_SEARCH_RESULTS};
use hposim_ingest::{load_ontology, ontology_version};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod build;
mod lookup;

use build::BuildArgs;

#[derive(Parser)]
#[command(name = "hposim")]
#[command(
    author,
    version,
    about = "Precompute and query pairwise ontology term similarity"
)]
struct Cli {
    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score all term pairs and write the similarity artifact.
    Build(BuildArgs),

    /// Case-insensitive search over labels, definitions and synonyms.
    Search {
        /// Text to look for (at least 2 characters).
        query: String,

        /// Artifact to search.
        #[arg(long, default_value = hposim_core::DEFAULT_ARTIFACT_FILE)]
        artifact: PathBuf,

        /// Maximum number of hits.
        #[arg(long, default_value_t = MAX_SEARCH_RESULTS)]
        limit: usize,

        /// Print hits as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the stored neighbours of one term.
    Similar {
        /// Term id as it appears in the artifact.
        id: String,

        /// Artifact to read.
        #[arg(long, default_value = hposim_core::DEFAULT_ARTIFACT_FILE)]
        artifact: PathBuf,

        /// Print neighbours as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the release version an ontology document declares.
    Version {
        /// Ontology document, JSON or `.obo` (default: `./hp.json`).
        source: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_version(source: &Path) -> Result<()> {
    let graph = load_ontology(source)?;
    println!("{}", ontology_version(&graph.meta));
    Ok(())
}

/// Process status for a failed command: pipeline failures carry their own
/// code, anything else is 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<PipelineError>())
        .map_or(1, |e| e.exit_code() as u8)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Build(args) => build::cmd_build(&args),
        Commands::Search {
            query,
            artifact,
            limit,
            json,
        } => lookup::cmd_search(&artifact, &query, limit, json),
        Commands::Similar { id, artifact, json } => lookup::cmd_similar(&artifact, &id, json),
        Commands::Version { source } => {
            let source = source.unwrap_or_else(|| PipelineConfig::default().source_path());
            cmd_version(&source)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(exit_code(&err))
        }
    }
}
