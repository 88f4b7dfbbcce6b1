// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stitch merge`: show the settings a job would receive.

use anyhow::Result;
use clap::Args;
use stitch_core::{ConfigStore, ProtectedKeys};
use stitch_engine::settings_file;

use crate::output::{print_json, OutputFormat};
use crate::settings_args::{BaseArgs, OverrideArgs};

#[derive(Args, Debug)]
pub struct MergeArgs {
    #[command(flatten)]
    pub base: BaseArgs,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// Extra protected key (repeatable; project_path is always protected)
    #[arg(long = "protect", value_name = "KEY")]
    pub protect: Vec<String>,
}

pub async fn handle(args: MergeArgs, format: OutputFormat) -> Result<()> {
    let base = args.base.load()?;
    let file = settings_file::load_overrides(args.overrides.override_file.as_deref()).await?;
    let params = args.overrides.params()?;

    let protected = args.protect.iter().fold(ProtectedKeys::workspace_root(), |p, k| p.with(k));
    let merged = ConfigStore::new(base, protected).merge_layers([&file, &params]);

    match format {
        OutputFormat::Text => print!("{}", settings_file::render(&merged)),
        OutputFormat::Json => print_json(&merged)?,
    }
    Ok(())
}
