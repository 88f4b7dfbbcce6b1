// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project names.
//!
//! A project name becomes the workspace directory name, so it is limited to
//! ASCII alphanumerics, `_` and `-`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectNameError {
    #[error("project name is empty")]
    Empty,
    #[error("project name `{0}` may only contain letters, digits, `_` and `-`")]
    InvalidChars(String),
}

/// A validated project name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectName(String);

impl ProjectName {
    pub fn parse(raw: &str) -> Result<Self, ProjectNameError> {
        if raw.is_empty() {
            return Err(ProjectNameError::Empty);
        }
        if !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(ProjectNameError::InvalidChars(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProjectName {
    type Error = ProjectNameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ProjectName> for String {
    fn from(name: ProjectName) -> Self {
        name.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[yare::parameterized(
        simple     = { "field7" },
        dashed     = { "north-field_2024" },
        uppercase  = { "SITE" },
    )]
    fn accepts_valid_names(raw: &str) {
        assert_eq!(ProjectName::parse(raw).unwrap().as_str(), raw);
    }

    #[yare::parameterized(
        traversal = { "../etc" },
        slash     = { "a/b" },
        space     = { "my project" },
        dot       = { "." },
    )]
    fn rejects_path_like_names(raw: &str) {
        assert_eq!(ProjectName::parse(raw), Err(ProjectNameError::InvalidChars(raw.to_string())));
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(ProjectName::parse(""), Err(ProjectNameError::Empty));
    }

    #[test]
    fn deserialize_validates() {
        assert!(serde_json::from_str::<ProjectName>("\"ok-name\"").is_ok());
        assert!(serde_json::from_str::<ProjectName>("\"../x\"").is_err());
    }
}
