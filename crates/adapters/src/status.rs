// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use stitch_core::Severity;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from status delivery
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("status channel closed")]
    Closed,
}

/// A job-status update surfaced to whoever submitted the job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub severity: Severity,
    pub message: String,
}

impl StatusUpdate {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self { severity, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }
}

/// Adapter for job-status updates.
///
/// Delivery is best-effort: callers log failures and carry on.
#[async_trait]
pub trait StatusSink: Clone + Send + Sync + 'static {
    async fn update(&self, update: StatusUpdate) -> Result<(), StatusError>;
}

/// Status sink that only writes to the tracing log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingStatusSink;

#[async_trait]
impl StatusSink for TracingStatusSink {
    async fn update(&self, update: StatusUpdate) -> Result<(), StatusError> {
        let message = update.message.as_str();
        match update.severity {
            Severity::Error => tracing::error!(target: "stitch::status", "{}", message),
            Severity::Warning => tracing::warn!(target: "stitch::status", "{}", message),
            Severity::Info => tracing::info!(target: "stitch::status", "{}", message),
            Severity::Debug => tracing::debug!(target: "stitch::status", "{}", message),
        }
        Ok(())
    }
}

/// Status sink that forwards updates over a channel, e.g. to a message-bus
/// connector running on its own task.
#[derive(Clone, Debug)]
pub struct ChannelStatusSink {
    tx: mpsc::Sender<StatusUpdate>,
}

impl ChannelStatusSink {
    pub fn new(tx: mpsc::Sender<StatusUpdate>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl StatusSink for ChannelStatusSink {
    async fn update(&self, update: StatusUpdate) -> Result<(), StatusError> {
        self.tx.send(update).await.map_err(|_| StatusError::Closed)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{StatusError, StatusSink, StatusUpdate};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use stitch_core::Severity;

    /// Fake status sink for testing
    #[derive(Clone, Default)]
    pub struct FakeStatusSink {
        inner: Arc<Mutex<Vec<StatusUpdate>>>,
    }

    impl FakeStatusSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Get all recorded updates
        pub fn updates(&self) -> Vec<StatusUpdate> {
            self.inner.lock().clone()
        }

        /// Messages of recorded updates with the given severity, in order.
        pub fn messages(&self, severity: Severity) -> Vec<String> {
            self.inner
                .lock()
                .iter()
                .filter(|u| u.severity == severity)
                .map(|u| u.message.clone())
                .collect()
        }
    }

    #[async_trait]
    impl StatusSink for FakeStatusSink {
        async fn update(&self, update: StatusUpdate) -> Result<(), StatusError> {
            self.inner.lock().push(update);
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeStatusSink;
