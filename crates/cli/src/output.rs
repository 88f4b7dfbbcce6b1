// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;
use serde::Serialize;
use stitch_core::{format_elapsed, format_utc, CollectionOutcome, OutputArtifact};
use stitch_engine::JobResult;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One line per collection outcome.
pub fn format_outcome(outcome: &CollectionOutcome) -> String {
    match outcome {
        CollectionOutcome::Uploaded { id, name, .. } => format!("uploaded  {:<16} {}", id, name),
        CollectionOutcome::Skipped { id, source, reason } => {
            format!("skipped   {:<16} {} ({})", id, source, reason)
        }
        CollectionOutcome::Failed { id, name, error } => {
            format!("failed    {:<16} {}: {}", id, name, error)
        }
    }
}

/// Human-readable job report.
pub fn format_result(result: &JobResult) -> String {
    let mut lines = Vec::new();
    let project = result.project.as_deref().unwrap_or("-");
    lines.push(format!("Job {} ({})", result.job_id, project));

    let elapsed = (result.finished_at - result.started_at).to_std().unwrap_or_default();
    lines.push(format!(
        "  started {}, finished {} ({})",
        format_utc(result.started_at),
        format_utc(result.finished_at),
        format_elapsed(elapsed)
    ));

    match &result.exit {
        Some(exit) => lines.push(format!("  {}, {} output lines", exit, exit.lines)),
        None => lines.push("  job did not run".to_string()),
    }
    if let Some(error) = &result.error {
        lines.push(format!("  error: {}", error));
    }
    for outcome in &result.outcomes {
        lines.push(format!("  {}", format_outcome(outcome)));
    }
    if let Some(archive) = &result.log_archive {
        lines.push(format!("  log: {}", archive.display()));
    }
    lines.join("\n")
}

pub fn print_result(result: &JobResult, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => println!("{}", format_result(result)),
        OutputFormat::Json => print_json(&result.summary())?,
    }
    Ok(())
}

pub fn format_artifact(artifact: &OutputArtifact) -> String {
    let compress = if artifact.compress { " (zip)" } else { "" };
    format!("{:<16} {} -> {}{}", artifact.id, artifact.source, artifact.upload_name(), compress)
}
