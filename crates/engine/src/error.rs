// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error types.

use std::path::PathBuf;
use stitch_adapters::UploadError;
use stitch_core::{ConfigError, ProjectNameError};
use thiserror::Error;

/// Errors preparing or tearing down a job workspace.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("workspace {0} already exists (set rerun_all to reuse it)")]
    AlreadyExists(PathBuf),

    #[error("failed to create {path}: {source}")]
    Create { path: PathBuf, source: std::io::Error },

    #[error("failed to purge {path}: {source}")]
    Purge { path: PathBuf, source: std::io::Error },

    #[error("failed to link input {input} into {dest}: {source}")]
    Link { input: PathBuf, dest: PathBuf, source: std::io::Error },
}

/// Errors from the process supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to launch `{program}`: {source}")]
    Launch { program: String, source: std::io::Error },

    #[error("no job command configured")]
    EmptyCommand,

    #[error("failed to write settings file {path}: {source}")]
    Settings { path: PathBuf, source: std::io::Error },

    #[error("failed to open job log {path}: {source}")]
    Log { path: PathBuf, source: std::io::Error },

    #[error("failed to create output pipe: {0}")]
    Pipe(std::io::Error),

    #[error("failed waiting for `{program}` to exit: {source}")]
    Wait { program: String, source: std::io::Error },
}

/// Errors preparing or uploading one artifact. Never fatal to the job;
/// recorded as a failed collection outcome.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("destination `{0}` is not a plain file name")]
    InvalidDestination(String),

    #[error("source `{0}` is not a path inside the workspace")]
    InvalidSource(String),

    #[error("failed to move {from} to {to}: {source}")]
    Move { from: PathBuf, to: PathBuf, source: std::io::Error },

    #[error("failed to compress {path}: {source}")]
    Compress { path: PathBuf, source: std::io::Error },

    #[error("failed to write archive {path}: {source}")]
    Archive { path: PathBuf, source: zip::result::ZipError },

    #[error("compression task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Fatal job errors. Only these abort a job outright; everything else is
/// recorded on the result and the job degrades to partial success.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid project name: {0}")]
    InvalidProject(#[from] ProjectNameError),

    #[error("configuration key `{0}` is missing")]
    MissingKey(&'static str),

    #[error("failed to read override file {path}: {source}")]
    OverrideRead { path: PathBuf, source: std::io::Error },

    #[error("invalid override file {path}: {source}")]
    OverrideParse { path: PathBuf, source: ConfigError },

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
}

impl JobError {
    /// Whether the external process failed to start at all.
    pub fn is_launch_failure(&self) -> bool {
        matches!(
            self,
            JobError::Supervisor(
                SupervisorError::Launch { .. }
                    | SupervisorError::EmptyCommand
                    | SupervisorError::Pipe(_)
            )
        )
    }
}
