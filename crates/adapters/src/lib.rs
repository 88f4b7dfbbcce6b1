// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! stitch-adapters: collaborators the orchestrator talks to (storage upload
//! and job-status delivery), with fakes for tests.

pub mod status;
pub mod upload;

pub use status::{ChannelStatusSink, StatusError, StatusSink, StatusUpdate, TracingStatusSink};
pub use upload::{DirectoryUploader, UploadError, Uploader};

#[cfg(any(test, feature = "test-support"))]
pub use status::FakeStatusSink;
#[cfg(any(test, feature = "test-support"))]
pub use upload::{FakeUploader, UploadCall};
