// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output artifact manifest and per-artifact collection outcomes.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// True when `name` is a single plain file name: no separators, `.` or `..`.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && Path::new(name).file_name() == Some(OsStr::new(name))
}

/// One expected output of the reconstruction job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputArtifact {
    /// Stable identifier used for name overrides (e.g. `orthophoto`).
    pub id: String,
    /// Path relative to the workspace.
    pub source: String,
    /// File name the artifact is uploaded under.
    pub destination: String,
    pub compress: bool,
}

impl OutputArtifact {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
        compress: bool,
    ) -> Self {
        Self { id: id.into(), source: source.into(), destination: destination.into(), compress }
    }

    /// Lower-cased extension of the source path, used for type filters.
    pub fn file_type(&self) -> Option<String> {
        let name = self.source.rsplit('/').next().unwrap_or(&self.source);
        name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
    }

    /// Whether the destination stays inside the workspace root.
    pub fn has_plain_destination(&self) -> bool {
        is_plain_file_name(&self.destination)
    }

    /// Name of the file actually handed to the uploader.
    pub fn upload_name(&self) -> String {
        if self.compress {
            format!("{}.zip", self.destination)
        } else {
            self.destination.clone()
        }
    }
}

/// The outputs a reconstruction run is expected to produce.
pub fn default_manifest() -> Vec<OutputArtifact> {
    vec![
        OutputArtifact::new("orthophoto", "odm_orthophoto/odm_orthophoto.tif", "orthophoto.tif", false),
        OutputArtifact::new(
            "orthophoto_png",
            "odm_orthophoto/odm_orthophoto.png",
            "orthophoto.png",
            false,
        ),
        OutputArtifact::new(
            "pointcloud",
            "odm_georeferencing/odm_georeferenced_model.ply",
            "pointcloud.ply",
            true,
        ),
        OutputArtifact::new(
            "pointcloud_las",
            "odm_georeferencing/odm_georeferenced_model.las",
            "pointcloud.las",
            true,
        ),
        OutputArtifact::new(
            "textured_model",
            "odm_texturing/odm_textured_model.obj",
            "textured_model.obj",
            true,
        ),
        OutputArtifact::new("mesh", "odm_meshing/odm_mesh.ply", "mesh.ply", true),
    ]
}

/// Operator policy applied to a manifest before collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactPolicy {
    /// File types (extensions) whose artifacts are not collected at all.
    pub skip_types: HashSet<String>,
    /// File types that are always uploaded uncompressed.
    pub no_compress: HashSet<String>,
    /// Destination-name overrides keyed by artifact id.
    pub names: HashMap<String, String>,
}

impl ArtifactPolicy {
    /// Parse a comma-separated extension list (`".tif, PLY"` → `{tif, ply}`).
    pub fn parse_types(list: &str) -> HashSet<String> {
        list.split(',')
            .map(|t| t.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Apply the policy, preserving manifest order.
    ///
    /// Name overrides that are not a plain file name are ignored.
    pub fn apply(&self, manifest: &[OutputArtifact]) -> Vec<OutputArtifact> {
        manifest
            .iter()
            .filter(|a| a.file_type().is_none_or(|t| !self.skip_types.contains(&t)))
            .map(|a| {
                let mut artifact = a.clone();
                if artifact.file_type().is_some_and(|t| self.no_compress.contains(&t)) {
                    artifact.compress = false;
                }
                if let Some(name) = self.names.get(&artifact.id).filter(|n| is_plain_file_name(n)) {
                    artifact.destination = name.clone();
                }
                artifact
            })
            .collect()
    }
}

/// Result of collecting one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CollectionOutcome {
    /// Handed to the uploader successfully.
    Uploaded { id: String, name: String, path: PathBuf },
    /// Not collected; the job did not produce it.
    Skipped { id: String, source: String, reason: String },
    /// Found but could not be prepared or uploaded.
    Failed { id: String, name: String, error: String },
}

impl CollectionOutcome {
    pub fn id(&self) -> &str {
        match self {
            CollectionOutcome::Uploaded { id, .. }
            | CollectionOutcome::Skipped { id, .. }
            | CollectionOutcome::Failed { id, .. } => id,
        }
    }

    pub fn is_uploaded(&self) -> bool {
        matches!(self, CollectionOutcome::Uploaded { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, CollectionOutcome::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CollectionOutcome::Failed { .. })
    }
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
