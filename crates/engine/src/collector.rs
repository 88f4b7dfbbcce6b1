// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collection of the job's outputs after the external process exits.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use stitch_adapters::Uploader;
use stitch_core::{CollectionOutcome, OutputArtifact};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::CollectError;

/// Reason recorded when the job did not produce an artifact.
pub const NOT_FOUND: &str = "not found";

/// Locates, renames or compresses, and uploads manifest entries.
#[derive(Debug, Clone)]
pub struct ArtifactCollector<U> {
    uploader: U,
}

impl<U: Uploader> ArtifactCollector<U> {
    pub fn new(uploader: U) -> Self {
        Self { uploader }
    }

    /// Collect every entry in manifest order.
    ///
    /// Entries are independent: a missing or failing entry is recorded and
    /// the rest are still processed.
    pub async fn collect_all(
        &self,
        workspace: &Path,
        manifest: &[OutputArtifact],
    ) -> Vec<CollectionOutcome> {
        let mut outcomes = Vec::with_capacity(manifest.len());
        for artifact in manifest {
            let outcome = self.collect_one(workspace, artifact).await;
            match &outcome {
                CollectionOutcome::Uploaded { name, .. } => {
                    tracing::info!(id = %artifact.id, name = %name, "artifact uploaded")
                }
                CollectionOutcome::Skipped { source, reason, .. } => {
                    tracing::info!(id = %artifact.id, source = %source, "artifact skipped: {}", reason)
                }
                CollectionOutcome::Failed { name, error, .. } => {
                    tracing::warn!(id = %artifact.id, name = %name, error = %error, "artifact failed")
                }
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn collect_one(&self, workspace: &Path, artifact: &OutputArtifact) -> CollectionOutcome {
        let name = artifact.upload_name();
        if let Err(e) = check_paths(artifact) {
            return CollectionOutcome::Failed { id: artifact.id.clone(), name, error: e.to_string() };
        }

        let source = workspace.join(&artifact.source);
        let present = tokio::fs::metadata(&source).await.map(|m| m.is_file()).unwrap_or(false);
        if !present {
            return CollectionOutcome::Skipped {
                id: artifact.id.clone(),
                source: artifact.source.clone(),
                reason: NOT_FOUND.to_string(),
            };
        }

        match self.prepare_and_upload(workspace, &source, artifact).await {
            Ok(path) => CollectionOutcome::Uploaded { id: artifact.id.clone(), name, path },
            Err(e) => {
                CollectionOutcome::Failed { id: artifact.id.clone(), name, error: e.to_string() }
            }
        }
    }

    async fn prepare_and_upload(
        &self,
        workspace: &Path,
        source: &Path,
        artifact: &OutputArtifact,
    ) -> Result<PathBuf, CollectError> {
        let dest = workspace.join(artifact.upload_name());
        if artifact.compress {
            let (from, to, entry) = (source.to_path_buf(), dest.clone(), artifact.destination.clone());
            tokio::task::spawn_blocking(move || compress(&from, &to, &entry)).await??;
        } else {
            tokio::fs::rename(source, &dest).await.map_err(|e| CollectError::Move {
                from: source.to_path_buf(),
                to: dest.clone(),
                source: e,
            })?;
        }
        self.uploader.upload(&dest).await?;
        Ok(dest)
    }
}

/// Both ends of a collection must stay inside the workspace.
fn check_paths(artifact: &OutputArtifact) -> Result<(), CollectError> {
    if !artifact.has_plain_destination() {
        return Err(CollectError::InvalidDestination(artifact.destination.clone()));
    }
    let inside = Path::new(&artifact.source)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if artifact.source.is_empty() || !inside {
        return Err(CollectError::InvalidSource(artifact.source.clone()));
    }
    Ok(())
}

/// Stream `source` into a single-entry deflate archive at `dest`.
fn compress(source: &Path, dest: &Path, entry: &str) -> Result<(), CollectError> {
    let io_err = |e| CollectError::Compress { path: source.to_path_buf(), source: e };
    let zip_err = |e| CollectError::Archive { path: dest.to_path_buf(), source: e };

    let mut input = BufReader::new(File::open(source).map_err(io_err)?);
    let output = File::create(dest).map_err(io_err)?;
    let mut zip = ZipWriter::new(BufWriter::new(output));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);
    zip.start_file(entry, options).map_err(zip_err)?;
    std::io::copy(&mut input, &mut zip).map_err(io_err)?;
    zip.finish().map_err(zip_err)?.flush().map_err(io_err)
}

#[cfg(test)]
#[path = "collector_tests.rs"]
mod tests;
