// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error carrying the process exit code.
//!
//! `stitch run` mirrors the external job's exit code, so commands return an
//! `ExitError` and leave termination to `main()`.

use std::fmt;

/// Exit code for a job aborted by a fatal error.
pub const FATAL_JOB_EXIT: i32 = 2;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    /// Printed to stderr by `main()` unless empty.
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// Exit with `code` without printing anything further.
    pub fn silent(code: i32) -> Self {
        Self::new(code, "")
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "exit code {}", self.code)
        } else {
            f.write_str(&self.message)
        }
    }
}

impl std::error::Error for ExitError {}
