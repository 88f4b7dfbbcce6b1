// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Settings file handed to the external job, and job-supplied override files.

use std::borrow::Cow;
use std::path::Path;

use stitch_core::Configuration;

use crate::error::JobError;

/// Environment variable the external job reads its settings path from.
pub const SETTINGS_ENV: &str = "ODM_SETTINGS";

/// File name of the settings file inside the workspace.
pub const SETTINGS_FILE: &str = "settings.yaml";

/// Render `key : value` lines, skipping keys whose value is absent or empty.
///
/// Line breaks inside a key or value are written as `\n` / `\r` escapes so
/// every setting stays on its own line.
pub fn render(config: &Configuration) -> String {
    let mut out = String::new();
    for (key, value) in config.iter() {
        if value.is_empty() {
            continue;
        }
        let value = value.to_string();
        out.push_str(&format!("{} : {}\n", one_line(key), one_line(&value)));
    }
    out
}

fn one_line(s: &str) -> Cow<'_, str> {
    if s.contains(['\n', '\r']) {
        Cow::Owned(s.replace('\r', "\\r").replace('\n', "\\n"))
    } else {
        Cow::Borrowed(s)
    }
}

/// Write the rendered settings to `path`.
pub async fn write(path: &Path, config: &Configuration) -> std::io::Result<()> {
    tokio::fs::write(path, render(config)).await
}

/// Load a job-supplied override file.
///
/// A missing path or an empty document means "no overrides".
pub async fn load_overrides(path: Option<&Path>) -> Result<Configuration, JobError> {
    let Some(path) = path else {
        return Ok(Configuration::new());
    };
    let doc = match tokio::fs::read_to_string(path).await {
        Ok(doc) => doc,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "override file absent");
            return Ok(Configuration::new());
        }
        Err(source) => return Err(JobError::OverrideRead { path: path.to_path_buf(), source }),
    };
    Configuration::from_yaml_str(&doc)
        .map_err(|source| JobError::OverrideParse { path: path.to_path_buf(), source })
}
