// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stitch run`: run one reconstruction job.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use parking_lot::RwLock;
use stitch_adapters::{DirectoryUploader, TracingStatusSink};
use stitch_core::default_manifest;
use stitch_engine::{
    check_message, env, select_images, InputImage, JobCommand, JobOrchestrator, JobRequest,
    JobResult, MessageAction, ProcessSupervisor, Resource,
};

use crate::exit_error::{ExitError, FATAL_JOB_EXIT};
use crate::output::{print_result, OutputFormat};
use crate::settings_args::{BaseArgs, OverrideArgs};

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub base: BaseArgs,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// Input image (repeatable)
    #[arg(long = "image", value_name = "PATH")]
    pub images: Vec<PathBuf>,

    /// Message resource (JSON) whose images are used as inputs
    #[arg(long, value_name = "FILE")]
    pub resource: Option<PathBuf>,

    /// Directory collected artifacts are uploaded into
    #[arg(long, value_name = "DIR", default_value = "results")]
    pub upload_dir: PathBuf,

    /// Keep a copy of the job log as <DIR>/<project>.log
    #[arg(long, value_name = "DIR")]
    pub log_archive: Option<PathBuf>,

    /// On failure, hold the workspace and send heartbeats until killed
    #[arg(long)]
    pub wait_on_error: bool,

    /// External job command (default: $STITCH_JOB_COMMAND)
    #[arg(last = true, value_name = "CMD")]
    pub command: Vec<String>,
}

pub async fn handle(args: RunArgs, format: OutputFormat) -> Result<()> {
    let config = args.base.load()?;
    let params = args.overrides.params()?;

    let mut inputs = Vec::new();
    for path in &args.images {
        let image = InputImage::from_path(path)
            .with_context(|| format!("input {} has no file name", path.display()))?;
        inputs.push(image);
    }
    if let Some(path) = &args.resource {
        let resource = read_resource(path)?;
        if check_message(&resource) == MessageAction::Ignore {
            println!("ignored: not triggered by the stitch file");
            return Ok(());
        }
        inputs.extend(select_images(&resource));
    }

    let command = match args.command.split_first() {
        Some((program, rest)) => JobCommand::new(program.as_str(), rest.iter().map(String::as_str)),
        None => env::job_command(),
    };
    tracing::debug!(%command, inputs = inputs.len(), "starting job");
    let supervisor = ProcessSupervisor::new(command)
        .wait_on_error(args.wait_on_error || env::wait_on_error())
        .heartbeat(env::heartbeat());

    let mut orchestrator = JobOrchestrator::new(
        Arc::new(RwLock::new(config)),
        supervisor,
        DirectoryUploader::new(&args.upload_dir),
        TracingStatusSink,
    )
    .manifest(env::artifact_policy().apply(&default_manifest()));
    if let Some(dir) = &args.log_archive {
        orchestrator = orchestrator.log_archive_dir(dir);
    }

    let mut request = JobRequest::new().params(params).inputs(inputs);
    if let Some(file) = &args.overrides.override_file {
        request = request.override_file(file);
    }

    let result = orchestrator.run(request).await;
    print_result(&result, format)?;
    exit_status(&result)
}

fn read_resource(path: &std::path::Path) -> Result<Resource> {
    let doc = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read resource {}", path.display()))?;
    serde_json::from_str(&doc).with_context(|| format!("invalid resource {}", path.display()))
}

/// Fatal job error → 2; otherwise the job's own non-zero exit code.
fn exit_status(result: &JobResult) -> Result<()> {
    if let Some(error) = &result.error {
        return Err(ExitError::new(FATAL_JOB_EXIT, error.to_string()).into());
    }
    match result.exit.as_ref().map(|e| e.code) {
        Some(Some(0)) | None => Ok(()),
        Some(Some(code)) => Err(ExitError::silent(code).into()),
        Some(None) => Err(ExitError::new(1, "job terminated by signal").into()),
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
