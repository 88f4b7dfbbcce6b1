// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the engine crate.

use std::time::Duration;

use stitch_core::{is_plain_file_name, ArtifactPolicy};

use crate::supervisor::{JobCommand, DEFAULT_HEARTBEAT};

/// Command line of the external job when `STITCH_JOB_COMMAND` is unset.
pub const DEFAULT_JOB_COMMAND: &str = "python /code/worker.py";

const NAME_PREFIX: &str = "STITCH_NAME_";

/// Manifest policy from `STITCH_SKIP_TYPES`, `STITCH_NO_COMPRESS` and
/// `STITCH_NAME_<ARTIFACT_ID>`.
pub fn artifact_policy() -> ArtifactPolicy {
    policy_from_vars(std::env::vars())
}

fn policy_from_vars(vars: impl IntoIterator<Item = (String, String)>) -> ArtifactPolicy {
    let mut policy = ArtifactPolicy::default();
    for (key, value) in vars {
        match key.as_str() {
            "STITCH_SKIP_TYPES" => policy.skip_types = ArtifactPolicy::parse_types(&value),
            "STITCH_NO_COMPRESS" => policy.no_compress = ArtifactPolicy::parse_types(&value),
            _ => {
                if let Some(id) = key.strip_prefix(NAME_PREFIX) {
                    let name = value.trim();
                    if id.is_empty() || name.is_empty() {
                        continue;
                    }
                    if !is_plain_file_name(name) {
                        tracing::warn!(
                            var = %key,
                            name,
                            "ignoring artifact name override: not a plain file name"
                        );
                        continue;
                    }
                    policy.names.insert(id.to_ascii_lowercase(), name.to_string());
                }
            }
        }
    }
    policy
}

/// Wait-on-error heartbeat period (default 60s, `STITCH_HEARTBEAT_SECS`).
pub fn heartbeat() -> Duration {
    parse_secs(std::env::var("STITCH_HEARTBEAT_SECS").ok().as_deref()).unwrap_or(DEFAULT_HEARTBEAT)
}

fn parse_secs(raw: Option<&str>) -> Option<Duration> {
    raw?.trim().parse::<u64>().ok().filter(|s| *s > 0).map(Duration::from_secs)
}

/// Whether `STITCH_WAIT_ON_ERROR` enables the stall.
pub fn wait_on_error() -> bool {
    std::env::var("STITCH_WAIT_ON_ERROR").map(|v| parse_flag(&v)).unwrap_or(false)
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// External job command (`STITCH_JOB_COMMAND`, default `python /code/worker.py`).
pub fn job_command() -> JobCommand {
    std::env::var("STITCH_JOB_COMMAND")
        .ok()
        .and_then(|line| JobCommand::parse(&line))
        .or_else(|| JobCommand::parse(DEFAULT_JOB_COMMAND))
        .unwrap_or_else(|| JobCommand::new("python", ["/code/worker.py"]))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
