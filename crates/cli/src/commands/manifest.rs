// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stitch manifest`: the artifacts a run would collect.

use anyhow::Result;
use stitch_core::default_manifest;

use crate::output::{format_artifact, print_json, OutputFormat};

pub fn handle(format: OutputFormat) -> Result<()> {
    let manifest = stitch_engine::env::artifact_policy().apply(&default_manifest());
    match format {
        OutputFormat::Text => {
            if manifest.is_empty() {
                println!("No artifacts (all types skipped)");
            }
            for artifact in &manifest {
                println!("{}", format_artifact(artifact));
            }
        }
        OutputFormat::Json => print_json(&manifest)?,
    }
    Ok(())
}
