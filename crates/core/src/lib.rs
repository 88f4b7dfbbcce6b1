// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! stitch-core: configuration, log classification, manifest and job types
//! for the reconstruction job orchestrator.

pub mod macros;

pub mod artifact;
pub mod config;
pub mod job;
pub mod log_line;
pub mod project;
pub mod time_fmt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use artifact::{
    default_manifest, is_plain_file_name, ArtifactPolicy, CollectionOutcome, OutputArtifact,
};
pub use config::{
    merge, ConfigError, ConfigStore, ConfigValue, Configuration, ProtectedKeys, NAME_KEY,
    PROJECT_PATH_KEY, RERUN_ALL_KEY,
};
pub use job::{ExitInfo, JobId, JobState};
pub use log_line::{classify, LogLine, Severity};
pub use project::{ProjectName, ProjectNameError};
pub use time_fmt::{format_elapsed, format_utc};
