// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job workspace lifecycle (create, rerun purge, input linking, teardown).

use std::path::{Path, PathBuf};

use stitch_core::ProjectName;

use crate::error::WorkspaceError;

/// Input area inside the workspace.
pub const IMAGES_DIR: &str = "images";

/// Intermediate outputs removed before a rerun.
pub const PURGE_DIRS: [&str; 7] = [
    "images_resize",
    "odm_georeferencing",
    "odm_meshing",
    "odm_orthophoto",
    "odm_texturing",
    "opensfm",
    "pmvs",
];

/// An input image and the name it is linked under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputImage {
    pub path: PathBuf,
    pub name: String,
}

impl InputImage {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self { path: path.into(), name: name.into() }
    }

    /// Use the path's own file name. `None` for paths like `/` or `..`.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let name = path.file_name()?.to_string_lossy().into_owned();
        Some(Self { path, name })
    }
}

/// Working directory of one job: `<root>/<project>`.
#[derive(Debug)]
pub struct JobWorkspace {
    root: PathBuf,
    name: ProjectName,
    path: PathBuf,
    links: Vec<PathBuf>,
    /// Set once this job created or took over the directory.
    owned: bool,
}

impl JobWorkspace {
    pub fn new(root: impl Into<PathBuf>, name: ProjectName) -> Self {
        let root = root.into();
        let path = root.join(name.as_str());
        Self { root, name, path, links: Vec::new(), owned: false }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> &ProjectName {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn images_dir(&self) -> PathBuf {
        self.path.join(IMAGES_DIR)
    }

    /// Whether cleanup will remove the directory.
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Input links created so far.
    pub fn links(&self) -> &[PathBuf] {
        &self.links
    }

    /// Establish the workspace directories.
    ///
    /// An existing workspace is only reused when `rerun` is set, in which
    /// case the known intermediate outputs are purged first. A refused
    /// workspace is not owned and survives [`cleanup`](Self::cleanup).
    pub async fn prepare(&mut self, rerun: bool) -> Result<(), WorkspaceError> {
        if tokio::fs::symlink_metadata(&self.path).await.is_ok() {
            if !rerun {
                return Err(WorkspaceError::AlreadyExists(self.path.clone()));
            }
            self.owned = true;
            self.purge().await?;
        }
        self.owned = true;

        let images = self.images_dir();
        tokio::fs::create_dir_all(&images)
            .await
            .map_err(|source| WorkspaceError::Create { path: images.clone(), source })?;
        tracing::debug!(path = %self.path.display(), rerun, "workspace ready");
        Ok(())
    }

    async fn purge(&self) -> Result<(), WorkspaceError> {
        for dir in PURGE_DIRS {
            let path = self.path.join(dir);
            match tokio::fs::remove_dir_all(&path).await {
                Ok(()) => tracing::info!(path = %path.display(), "purged stale output"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => return Err(WorkspaceError::Purge { path, source }),
            }
        }
        Ok(())
    }

    /// Link each input into the images area under its name.
    ///
    /// Inputs are resolved to absolute paths first, so a missing input fails
    /// here rather than inside the external job. An existing entry with the
    /// same name (from a rerun) is replaced.
    pub async fn link_inputs(&mut self, inputs: &[InputImage]) -> Result<usize, WorkspaceError> {
        let images = self.images_dir();
        for input in inputs {
            let dest = images.join(&input.name);
            let link_err = |source| WorkspaceError::Link {
                input: input.path.clone(),
                dest: dest.clone(),
                source,
            };

            let target = tokio::fs::canonicalize(&input.path).await.map_err(link_err)?;
            if tokio::fs::symlink_metadata(&dest).await.is_ok() {
                tokio::fs::remove_file(&dest).await.map_err(link_err)?;
            }
            link(&target, &dest).await.map_err(link_err)?;
            self.links.push(dest);
        }
        tracing::debug!(count = inputs.len(), dir = %images.display(), "linked inputs");
        Ok(inputs.len())
    }

    /// Remove input links and then the whole workspace tree.
    ///
    /// Best-effort and idempotent: failures are logged, never returned, and
    /// calling it on a missing workspace is a no-op. A workspace this job
    /// never owned is left in place.
    pub async fn cleanup(&mut self) {
        if !self.owned {
            tracing::debug!(path = %self.path.display(), "workspace not owned, leaving in place");
            return;
        }
        for link in self.links.drain(..) {
            match tokio::fs::remove_file(&link).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(
                    path = %link.display(),
                    error = %e,
                    "failed to remove input link (best-effort)"
                ),
            }
        }

        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => tracing::debug!(path = %self.path.display(), "workspace removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove workspace directory (best-effort)"
            ),
        }
    }
}

#[cfg(unix)]
async fn link(target: &Path, dest: &Path) -> std::io::Result<()> {
    tokio::fs::symlink(target, dest).await
}

#[cfg(not(unix))]
async fn link(target: &Path, dest: &Path) -> std::io::Result<()> {
    tokio::fs::copy(target, dest).await.map(|_| ())
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
