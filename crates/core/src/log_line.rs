// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Severity classification of external job output lines.
//!
//! Rules are checked in order, first match wins:
//!
//! 1. `[ERROR]` marker or a loose `... ERROR: ` prefix
//! 2. `[WARNING]` marker or `... WARNING: `
//! 3. `[INFO]` marker or `... INFO: `
//! 4. anything else is `Debug`, message untouched

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Severity of a single output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Debug,
}

crate::simple_display! {
    Severity {
        Error => "ERROR",
        Warning => "WARNING",
        Info => "INFO",
        Debug => "DEBUG",
    }
}

/// A classified logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub severity: Severity,
    pub message: String,
}

struct Rule {
    severity: Severity,
    marker: &'static str,
    loose: &'static LazyLock<Regex>,
}

#[allow(clippy::expect_used)]
static LOOSE_ERROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bERROR: ").expect("constant regex pattern is valid"));
#[allow(clippy::expect_used)]
static LOOSE_WARNING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bWARNING: ").expect("constant regex pattern is valid"));
#[allow(clippy::expect_used)]
static LOOSE_INFO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bINFO: ").expect("constant regex pattern is valid"));

/// Terminal color sequences the reconstruction tooling wraps markers in.
#[allow(clippy::expect_used)]
static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("constant regex pattern is valid"));

static RULES: [Rule; 3] = [
    Rule { severity: Severity::Error, marker: "[ERROR]", loose: &LOOSE_ERROR },
    Rule { severity: Severity::Warning, marker: "[WARNING]", loose: &LOOSE_WARNING },
    Rule { severity: Severity::Info, marker: "[INFO]", loose: &LOOSE_INFO },
];

/// Classify one logical line (no embedded newline expected).
///
/// Total and pure: every input, including the empty string, yields exactly
/// one classification. Trailing `\r`/`\n` are ignored so a final partial
/// line and a newline-terminated one classify the same way.
pub fn classify(raw: &str) -> LogLine {
    let line = raw.trim_end_matches(['\r', '\n']);

    for rule in &RULES {
        if let Some(idx) = line.find(rule.marker) {
            let stripped = format!("{}{}", &line[..idx], &line[idx + rule.marker.len()..]);
            return LogLine { severity: rule.severity, message: clean(&stripped) };
        }
        if let Some(m) = rule.loose.find(line) {
            return LogLine { severity: rule.severity, message: clean(&line[m.end()..]) };
        }
    }

    LogLine { severity: Severity::Debug, message: line.to_string() }
}

fn clean(message: &str) -> String {
    ANSI_ESCAPE.replace_all(message, "").trim().to_string()
}

#[cfg(test)]
#[path = "log_line_tests.rs"]
mod tests;
