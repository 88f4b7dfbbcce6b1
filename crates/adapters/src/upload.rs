// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from upload operations
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload source {path} is not a file")]
    NotAFile { path: PathBuf },

    #[error("upload of {path} failed: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("upload rejected: {0}")]
    Rejected(String),
}

/// Adapter that publishes a collected artifact to storage.
///
/// Failures are reported to the caller, never retried here.
#[async_trait]
pub trait Uploader: Clone + Send + Sync + 'static {
    async fn upload(&self, local_path: &Path) -> Result<(), UploadError>;
}

/// Uploader that copies artifacts into a local directory.
#[derive(Clone, Debug)]
pub struct DirectoryUploader {
    dest_dir: PathBuf,
}

impl DirectoryUploader {
    pub fn new(dest_dir: impl Into<PathBuf>) -> Self {
        Self { dest_dir: dest_dir.into() }
    }

    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }
}

#[async_trait]
impl Uploader for DirectoryUploader {
    async fn upload(&self, local_path: &Path) -> Result<(), UploadError> {
        let file_name = local_path
            .file_name()
            .ok_or_else(|| UploadError::NotAFile { path: local_path.to_path_buf() })?;
        let dest = self.dest_dir.join(file_name);

        let io_err = |source| UploadError::Io { path: local_path.to_path_buf(), source };
        tokio::fs::create_dir_all(&self.dest_dir).await.map_err(io_err)?;
        let bytes = tokio::fs::copy(local_path, &dest).await.map_err(io_err)?;

        tracing::info!(
            source = %local_path.display(),
            dest = %dest.display(),
            bytes,
            "uploaded artifact"
        );
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{UploadError, Uploader};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    /// Recorded upload
    #[derive(Debug, Clone)]
    pub struct UploadCall {
        pub path: PathBuf,
        /// Whether the file existed at upload time.
        pub existed: bool,
        /// File size at upload time (0 when missing).
        pub size: u64,
    }

    #[derive(Default)]
    struct FakeUploaderState {
        calls: Vec<UploadCall>,
        failing: HashSet<String>,
    }

    /// Fake uploader for testing
    #[derive(Clone, Default)]
    pub struct FakeUploader {
        inner: Arc<Mutex<FakeUploaderState>>,
    }

    impl FakeUploader {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make uploads of files with this name fail.
        pub fn fail_on(&self, file_name: &str) {
            self.inner.lock().failing.insert(file_name.to_string());
        }

        /// Get all recorded uploads
        pub fn calls(&self) -> Vec<UploadCall> {
            self.inner.lock().calls.clone()
        }

        /// File names of all recorded uploads, in call order.
        pub fn uploaded_names(&self) -> Vec<String> {
            self.inner
                .lock()
                .calls
                .iter()
                .filter_map(|c| c.path.file_name().map(|n| n.to_string_lossy().into_owned()))
                .collect()
        }
    }

    #[async_trait]
    impl Uploader for FakeUploader {
        async fn upload(&self, local_path: &Path) -> Result<(), UploadError> {
            let meta = std::fs::metadata(local_path).ok();
            let call = UploadCall {
                path: local_path.to_path_buf(),
                existed: meta.is_some(),
                size: meta.map(|m| m.len()).unwrap_or(0),
            };
            let name = local_path.file_name().map(|n| n.to_string_lossy().into_owned());

            let mut inner = self.inner.lock();
            inner.calls.push(call);
            if name.is_some_and(|n| inner.failing.contains(&n)) {
                return Err(UploadError::Rejected(format!("{}", local_path.display())));
            }
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeUploader, UploadCall};

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;
