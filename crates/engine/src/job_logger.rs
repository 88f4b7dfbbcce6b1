// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only durable log of the external job's raw output.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the durable log inside the workspace.
pub const JOB_LOG_FILE: &str = "odm.log";

/// Append-only logger for one job's combined output.
///
/// Each `append()` writes one raw line exactly as the child emitted it
/// (including its newline, if any). The file is opened once per job since
/// the reconstruction job can emit many thousands of lines.
pub struct JobLogger {
    path: PathBuf,
    file: File,
}

impl JobLogger {
    /// Open (or create) the log for appending.
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one raw line.
    ///
    /// Failures are logged via tracing and do not propagate; a full disk
    /// must not stop the output from being drained.
    pub fn append(&mut self, raw: &[u8]) {
        if let Err(e) = self.file.write_all(raw) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write job log");
        }
    }

    pub fn flush(&mut self) {
        if let Err(e) = self.file.flush() {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to flush job log");
        }
    }
}

/// Copy a job log to `<archive_dir>/<project>.log`.
///
/// Best-effort: failures are logged and `None` is returned.
pub fn archive(log_path: &Path, archive_dir: &Path, project: &str) -> Option<PathBuf> {
    let dest = archive_dir.join(format!("{}.log", project));
    let result = fs::create_dir_all(archive_dir).and_then(|_| fs::copy(log_path, &dest));
    match result {
        Ok(_) => {
            tracing::debug!(dest = %dest.display(), "archived job log");
            Some(dest)
        }
        Err(e) => {
            tracing::warn!(
                source = %log_path.display(),
                dest = %dest.display(),
                error = %e,
                "failed to archive job log"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn append_is_byte_exact() {
        let dir = TempDir::new().unwrap();
        let mut logger = JobLogger::open(dir.path().join(JOB_LOG_FILE)).unwrap();

        logger.append(b"[ERROR] bad input\n");
        logger.append(b"\xff raw bytes\r\n");
        logger.append(b"partial");
        logger.flush();

        let content = fs::read(logger.path()).unwrap();
        assert_eq!(content, b"[ERROR] bad input\n\xff raw bytes\r\npartial");
    }

    #[test]
    fn reopen_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/odm.log");
        JobLogger::open(&path).unwrap().append(b"first\n");
        JobLogger::open(&path).unwrap().append(b"second\n");

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn archive_copies_log() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join(JOB_LOG_FILE);
        fs::write(&log, "line\n").unwrap();

        let dest = archive(&log, &dir.path().join("logs"), "site-a").unwrap();

        assert_eq!(dest, dir.path().join("logs/site-a.log"));
        assert_eq!(fs::read_to_string(dest).unwrap(), "line\n");
    }

    #[test]
    fn archive_of_missing_log_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(archive(&dir.path().join("missing.log"), dir.path(), "x").is_none());
    }
}
