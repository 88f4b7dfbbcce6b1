// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the end-to-end specs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use stitch_adapters::{DirectoryUploader, FakeStatusSink};
use stitch_core::{ConfigValue, Configuration, Severity, NAME_KEY, PROJECT_PATH_KEY, RERUN_ALL_KEY};
use stitch_engine::{JobCommand, JobOrchestrator, JobRequest, JobResult, ProcessSupervisor, SharedConfig};
use tempfile::TempDir;

pub use stitch_engine::InputImage;

/// Project name every spec runs under.
pub const PROJECT: &str = "site-a";

/// A processing host: projects root, upload target, log archive.
pub struct Site {
    root: TempDir,
    uploads: TempDir,
    archive: TempDir,
    pub config: SharedConfig,
    pub status: FakeStatusSink,
}

impl Site {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let base: Configuration = [
            (PROJECT_PATH_KEY, ConfigValue::from(root.path().display().to_string())),
            (NAME_KEY, ConfigValue::from(PROJECT)),
            (RERUN_ALL_KEY, ConfigValue::Bool(false)),
        ]
        .into_iter()
        .collect();
        Self {
            root,
            uploads: TempDir::new().unwrap(),
            archive: TempDir::new().unwrap(),
            config: Arc::new(RwLock::new(base)),
            status: FakeStatusSink::new(),
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn workspace(&self) -> PathBuf {
        self.root.path().join(PROJECT)
    }

    /// Run `script` under `sh -c` as the external job.
    pub async fn run(&self, script: &str, request: JobRequest) -> JobResult {
        let supervisor = ProcessSupervisor::new(JobCommand::new("sh", ["-c", script]));
        JobOrchestrator::new(
            Arc::clone(&self.config),
            supervisor,
            DirectoryUploader::new(self.uploads.path()),
            self.status.clone(),
        )
        .log_archive_dir(self.archive.path())
        .run(request)
        .await
    }

    pub fn uploaded(&self, name: &str) -> Option<String> {
        std::fs::read_to_string(self.uploads.path().join(name)).ok()
    }

    pub fn upload_exists(&self, name: &str) -> bool {
        self.uploads.path().join(name).exists()
    }

    /// The archived job log.
    pub fn log(&self) -> String {
        std::fs::read_to_string(self.archive.path().join(format!("{}.log", PROJECT))).unwrap()
    }

    pub fn statuses(&self, severity: Severity) -> Vec<String> {
        self.status.messages(severity)
    }

    /// Create `rel` (and its parents) under the projects root.
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }
}

/// Per-job parameters from `key=value` pairs.
pub fn params(pairs: &[(&str, ConfigValue)]) -> Configuration {
    pairs.iter().cloned().collect()
}
