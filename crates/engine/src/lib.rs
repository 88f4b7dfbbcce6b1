// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! stitch-engine: runs one reconstruction job end to end.
//!
//! [`JobOrchestrator`] prepares a [`JobWorkspace`], hands the merged
//! settings to the external job through [`ProcessSupervisor`], collects the
//! outputs with [`ArtifactCollector`] and always cleans up.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod collector;
pub mod env;
mod error;
pub mod job_logger;
pub mod message;
pub mod orchestrator;
pub mod settings_file;
pub mod supervisor;
pub mod workspace;

pub use collector::ArtifactCollector;
pub use error::{CollectError, JobError, SupervisorError, WorkspaceError};
pub use job_logger::JobLogger;
pub use message::{check_message, select_images, MessageAction, Resource, ResourceFile};
pub use orchestrator::{JobOrchestrator, JobRequest, JobResult, JobSummary, SharedConfig};
pub use supervisor::{JobCommand, ProcessSupervisor};
pub use workspace::{InputImage, JobWorkspace};
