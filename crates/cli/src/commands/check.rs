// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stitch check`: would a message start a job?

use anyhow::Result;
use clap::Args;
use stitch_engine::{check_message, Resource};

use crate::output::{print_json, OutputFormat};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// File whose upload triggered the message (omit for a manual submission)
    pub triggering_file: Option<String>,
}

pub fn handle(args: CheckArgs, format: OutputFormat) -> Result<()> {
    let resource = Resource { triggering_file: args.triggering_file, ..Resource::default() };
    let action = check_message(&resource);
    match format {
        OutputFormat::Text => println!("{}", action),
        OutputFormat::Json => print_json(&serde_json::json!({ "action": action }))?,
    }
    Ok(())
}
