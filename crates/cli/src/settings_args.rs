// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flags that build the base configuration and per-job overrides.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use stitch_core::{merge, Configuration, ProtectedKeys, NAME_KEY, PROJECT_PATH_KEY};

/// Base configuration: defaults, then `--config`, then flags.
#[derive(Args, Debug, Default)]
pub struct BaseArgs {
    /// Base settings file (flat YAML mapping)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory that holds job workspaces
    #[arg(long, value_name = "DIR")]
    pub project_path: Option<String>,

    /// Project name (names the workspace directory)
    #[arg(long)]
    pub name: Option<String>,

    /// Set a base setting (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

impl BaseArgs {
    pub fn load(&self) -> Result<Configuration> {
        let mut config = Configuration::defaults();
        if let Some(path) = &self.config {
            let doc = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let file = Configuration::from_yaml_str(&doc)
                .with_context(|| format!("invalid settings file {}", path.display()))?;
            config = layer(&config, &file);
        }

        let mut flags = Configuration::new();
        if let Some(root) = &self.project_path {
            flags.insert(PROJECT_PATH_KEY, root.as_str());
        }
        if let Some(name) = &self.name {
            flags.insert(NAME_KEY, name.as_str());
        }
        config = layer(&config, &flags);
        config = layer(&config, &Configuration::from_assignments(&self.set)?);
        Ok(config)
    }
}

/// Base layers may set any key, including protected ones.
fn layer(base: &Configuration, top: &Configuration) -> Configuration {
    merge(base, top, &ProtectedKeys::default())
}

/// Per-job overrides: `--override-file`, then `--param`.
#[derive(Args, Debug, Default)]
pub struct OverrideArgs {
    /// Job override file (flat YAML mapping), applied first
    #[arg(long, value_name = "FILE")]
    pub override_file: Option<PathBuf>,

    /// Job parameter, applied after the override file (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

impl OverrideArgs {
    pub fn params(&self) -> Result<Configuration> {
        Ok(Configuration::from_assignments(&self.params)?)
    }
}
