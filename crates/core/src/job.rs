// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier, orchestration state machine, and exit information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Unique identifier for one job invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub const PREFIX: &'static str = "job-";

    /// Generate a new random ID with the type prefix.
    pub fn new() -> Self {
        Self(format!("{}{}", Self::PREFIX, uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Orchestration state of a single job.
///
/// ```text
/// Idle → Preparing → Running → Collecting → Cleaning → Done
///            └──────────┴───────────┴──→ Cleaning (on error)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[default]
    Idle,
    Preparing,
    Running,
    Collecting,
    Cleaning,
    Done,
}

crate::simple_display! {
    JobState {
        Idle => "idle",
        Preparing => "preparing",
        Running => "running",
        Collecting => "collecting",
        Cleaning => "cleaning",
        Done => "done",
    }
}

impl JobState {
    /// Whether `self → next` is a legal transition.
    ///
    /// Every non-terminal state past `Idle` may short-circuit to `Cleaning`;
    /// `Done` is only reachable from `Cleaning`.
    pub fn can_transition_to(self, next: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Idle, Preparing)
                | (Preparing, Running)
                | (Running, Collecting)
                | (Collecting, Cleaning)
                | (Preparing, Cleaning)
                | (Running, Cleaning)
                | (Cleaning, Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == JobState::Done
    }
}

/// How the external process ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitInfo {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Wall-clock runtime of the process.
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    /// Number of output lines read from the process.
    pub lines: u64,
}

impl ExitInfo {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for ExitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code)?,
            None => write!(f, "terminated by signal")?,
        }
        write!(f, " after {}", crate::time_fmt::format_elapsed(self.duration))
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
