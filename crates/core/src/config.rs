// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job configuration: a flat key→scalar store and the protected-key merge.
//!
//! The external reconstruction job owns the key vocabulary, so key sets are
//! dynamic. Only a handful of keys are interpreted by the orchestrator
//! itself (see the `*_KEY` constants).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Root directory under which per-project workspaces are created.
pub const PROJECT_PATH_KEY: &str = "project_path";
/// Project name (workspace directory name).
pub const NAME_KEY: &str = "name";
/// Purge known intermediate outputs before re-running a project.
pub const RERUN_ALL_KEY: &str = "rerun_all";

const DEFAULT_PROJECT_PATH: &str = "/var/lib/stitch/projects";

/// Errors from parsing configuration sources.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid assignment `{0}`: expected key=value")]
    InvalidAssignment(String),

    #[error("setting `{0}` spans multiple lines")]
    MultiLine(String),
}

fn has_line_break(s: &str) -> bool {
    s.contains(['\n', '\r'])
}

/// Settings are written one `key : value` per line, so neither side may
/// carry a line break.
fn check_single_line(key: &str, value: &ConfigValue) -> Result<(), ConfigError> {
    if has_line_break(key) || value.as_str().is_some_and(has_line_break) {
        return Err(ConfigError::MultiLine(key.escape_debug().to_string()));
    }
    Ok(())
}

/// A single scalar configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ConfigValue {
    /// Parse a textual scalar the way a YAML document would type it.
    ///
    /// `"true"` becomes `Bool`, `"16"` becomes `Int`, anything that is not a
    /// scalar (or fails to parse) is kept as the literal string.
    pub fn parse_scalar(raw: &str) -> Self {
        if raw.is_empty() {
            return ConfigValue::Str(String::new());
        }
        match serde_yaml::from_str::<ConfigValue>(raw) {
            Ok(value) => value,
            Err(_) => ConfigValue::Str(raw.to_string()),
        }
    }

    /// True for `Null` and the empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            ConfigValue::Null => true,
            ConfigValue::Str(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness used for flag keys: booleans, non-zero numbers and the
    /// strings `true`/`yes`/`1` count as set.
    pub fn as_flag(&self) -> bool {
        match self {
            ConfigValue::Null => false,
            ConfigValue::Bool(b) => *b,
            ConfigValue::Int(i) => *i != 0,
            ConfigValue::Float(f) => *f != 0.0,
            ConfigValue::Str(s) => matches!(s.to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => Ok(()),
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Int(i) => write!(f, "{}", i),
            // Keep a decimal point so `1.0` is not read back as an integer.
            ConfigValue::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            ConfigValue::Float(x) => write!(f, "{}", x),
            ConfigValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Str(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::Str(s)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Int(i)
    }
}

impl From<f64> for ConfigValue {
    fn from(x: f64) -> Self {
        ConfigValue::Float(x)
    }
}

/// Flat, insertion-ordered key→value configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(IndexMap<String, ConfigValue>);

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in defaults used before any file, flag or environment layer.
    pub fn defaults() -> Self {
        let mut config = Self::new();
        config.insert(PROJECT_PATH_KEY, DEFAULT_PROJECT_PATH);
        config.insert(RERUN_ALL_KEY, false);
        config
    }

    /// Parse a flat YAML mapping. An empty (or all-comment) document is an
    /// empty configuration. Multi-line keys or values are rejected.
    pub fn from_yaml_str(doc: &str) -> Result<Self, ConfigError> {
        let blank = doc.lines().map(str::trim).all(|l| l.is_empty() || l.starts_with('#'));
        if blank {
            return Ok(Self::new());
        }
        let parsed: Option<IndexMap<String, ConfigValue>> = serde_yaml::from_str(doc)?;
        let parsed = parsed.unwrap_or_default();
        for (key, value) in &parsed {
            check_single_line(key, value)?;
        }
        Ok(Self(parsed))
    }

    /// Parse `key=value` assignments (values typed by [`ConfigValue::parse_scalar`]).
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::new();
        for raw in assignments {
            let raw = raw.as_ref();
            let (key, value) = raw
                .split_once('=')
                .filter(|(k, _)| !k.trim().is_empty())
                .ok_or_else(|| ConfigError::InvalidAssignment(raw.to_string()))?;
            let value = ConfigValue::parse_scalar(value.trim());
            check_single_line(key.trim(), &value)?;
            config.insert(key.trim(), value);
        }
        Ok(config)
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_str)
    }

    /// Flag lookup; absent keys are unset.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(ConfigValue::as_flag)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for Configuration {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Keys that no override source may change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedKeys(BTreeSet<String>);

impl ProtectedKeys {
    /// The minimal protected set: the workspace root.
    pub fn workspace_root() -> Self {
        Self::default().with(PROJECT_PATH_KEY)
    }

    pub fn with(mut self, key: impl Into<String>) -> Self {
        self.0.insert(key.into());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ProtectedKeys {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Merge `overrides` onto `base`, leaving protected keys untouched.
///
/// Protected keys keep the base value, or stay absent when the base has
/// none. Neither input is modified.
pub fn merge(
    base: &Configuration,
    overrides: &Configuration,
    protected: &ProtectedKeys,
) -> Configuration {
    let mut merged = base.clone();
    for (key, value) in overrides.iter() {
        if protected.contains(key) {
            continue;
        }
        merged.insert(key, value.clone());
    }
    merged
}

/// Base configuration plus the keys overrides may not touch.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    base: Configuration,
    protected: ProtectedKeys,
}

impl ConfigStore {
    /// The workspace root key is always added to `protected`.
    pub fn new(base: Configuration, protected: ProtectedKeys) -> Self {
        Self { base, protected: protected.with(PROJECT_PATH_KEY) }
    }

    pub fn base(&self) -> &Configuration {
        &self.base
    }

    pub fn protected(&self) -> &ProtectedKeys {
        &self.protected
    }

    pub fn merge(&self, overrides: &Configuration) -> Configuration {
        merge(&self.base, overrides, &self.protected)
    }

    /// Apply override layers in order; later layers win on unprotected keys.
    pub fn merge_layers<'a>(
        &self,
        layers: impl IntoIterator<Item = &'a Configuration>,
    ) -> Configuration {
        layers
            .into_iter()
            .fold(self.base.clone(), |acc, layer| merge(&acc, layer, &self.protected))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
