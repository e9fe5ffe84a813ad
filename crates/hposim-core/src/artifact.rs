//! Artifact file I/O.
//!
//! The artifact is written to a sibling temp file first and renamed into
//! place, so readers see either the previous artifact or the complete new
//! one, never a partial write.

use crate::error::{PipelineError, Result};
use crate::model::Artifact;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Default artifact file name.
pub const DEFAULT_ARTIFACT_FILE: &str = "hpo_similarity.json";

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_ARTIFACT_FILE.to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

fn write_temp(tmp: &Path, artifact: &Artifact, pretty: bool) -> Result<()> {
    let file = fs::File::create(tmp).map_err(|e| PipelineError::io(tmp, e))?;
    let mut out = BufWriter::new(file);
    let encoded = if pretty {
        serde_json::to_writer_pretty(&mut out, artifact)
    } else {
        serde_json::to_writer(&mut out, artifact)
    };
    encoded.map_err(|source| PipelineError::Encode {
        path: tmp.to_path_buf(),
        source,
    })?;
    out.flush().map_err(|e| PipelineError::io(tmp, e))?;
    let file = out
        .into_inner()
        .map_err(|e| PipelineError::io(tmp, e.into_error()))?;
    file.sync_all().map_err(|e| PipelineError::io(tmp, e))?;
    Ok(())
}

/// Write `artifact` to `path`, creating parent directories.
pub fn write_artifact(path: &Path, artifact: &Artifact, pretty: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
    }

    let tmp = temp_path(path);
    let written = write_temp(&tmp, artifact, pretty)
        .and_then(|()| fs::rename(&tmp, path).map_err(|e| PipelineError::io(path, e)));
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written?;

    tracing::info!(
        path = %path.display(),
        nodes = artifact.nodes.len(),
        version = %artifact.version,
        "wrote artifact"
    );
    Ok(())
}

/// Load an artifact written by [`write_artifact`].
pub fn read_artifact(path: &Path) -> Result<Artifact> {
    let file = fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| PipelineError::Encode {
        path: path.to_path_buf(),
        source,
    })
}
