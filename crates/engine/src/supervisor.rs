// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervision of the external reconstruction process.
//!
//! The child's stdout and stderr share one OS pipe, so the supervisor sees a
//! single stream in emission order. A blocking reader task splits it into
//! logical lines (a trailing partial line is delivered at EOF) and hands
//! them over a channel; the async side logs, classifies and forwards each
//! line, then waits for the exit status once the stream is exhausted.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use stitch_adapters::{StatusSink, StatusUpdate};
use stitch_core::{classify, Configuration, ExitInfo, Severity};
use tokio::sync::mpsc;

use crate::error::SupervisorError;
use crate::job_logger::JobLogger;
use crate::settings_file::{self, SETTINGS_ENV, SETTINGS_FILE};

/// Lines buffered between the reader task and the async consumer.
const LINE_CHANNEL_CAPACITY: usize = 256;

/// Longest line handled as one unit; longer output is split at this size.
pub const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;

/// Default period of wait-on-error heartbeats.
pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(60);

/// Program and arguments of the external job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl JobCommand {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { program: program.into(), args: args.into_iter().map(Into::into).collect() }
    }

    /// Split a whitespace-separated command line. `None` when blank.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program, parts))
    }
}

impl std::fmt::Display for JobCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Launches the external job and drains its output.
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    command: JobCommand,
    wait_on_error: bool,
    heartbeat: Duration,
    max_line_bytes: usize,
}

impl ProcessSupervisor {
    pub fn new(command: JobCommand) -> Self {
        Self {
            command,
            wait_on_error: false,
            heartbeat: DEFAULT_HEARTBEAT,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }

    stitch_core::setters! {
        set { wait_on_error: bool, heartbeat: Duration, max_line_bytes: usize }
    }

    pub fn command(&self) -> &JobCommand {
        &self.command
    }

    /// Run the job to completion inside `workspace`.
    ///
    /// The merged configuration is written to the workspace settings file and
    /// its path passed via `ODM_SETTINGS`. Every output line is appended to
    /// `log` verbatim and classified; ERROR lines (and INFO lines, as live
    /// progress) go to `status`.
    ///
    /// A non-zero exit is returned as `Ok`; the caller decides what it
    /// means. With wait-on-error enabled a failing run never returns: the
    /// supervisor sends a heartbeat every period until the process is
    /// killed from outside.
    pub async fn run<S: StatusSink>(
        &self,
        workspace: &Path,
        config: &Configuration,
        status: &S,
        log: &mut JobLogger,
    ) -> Result<ExitInfo, SupervisorError> {
        let settings_path = workspace.join(SETTINGS_FILE);
        settings_file::write(&settings_path, config)
            .await
            .map_err(|source| SupervisorError::Settings { path: settings_path.clone(), source })?;

        if self.command.program.is_empty() {
            return Err(SupervisorError::EmptyCommand);
        }

        let (reader, writer) = std::io::pipe().map_err(SupervisorError::Pipe)?;
        let stderr_writer = writer.try_clone().map_err(SupervisorError::Pipe)?;

        let mut cmd = tokio::process::Command::new(&self.command.program);
        cmd.args(&self.command.args)
            .current_dir(workspace)
            .env(SETTINGS_ENV, &settings_path)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr_writer)
            .kill_on_drop(true);

        let started = Instant::now();
        let spawned = cmd.spawn();
        // The command still owns the parent's copies of the pipe's write end;
        // EOF is only seen once they are closed.
        drop(cmd);
        let mut child = match spawned {
            Ok(child) => child,
            Err(source) => {
                let err =
                    SupervisorError::Launch { program: self.command.program.clone(), source };
                deliver(status, StatusUpdate::error(err.to_string())).await;
                return Err(err);
            }
        };
        tracing::info!(
            command = %self.command,
            pid = child.id().unwrap_or_default(),
            workspace = %workspace.display(),
            "launched job"
        );

        let (tx, mut rx) = mpsc::channel(LINE_CHANNEL_CAPACITY);
        let max_line = self.max_line_bytes.max(1) as u64;
        let reader_task = tokio::task::spawn_blocking(move || read_lines(reader, max_line, tx));

        let mut lines = 0u64;
        while let Some(raw) = rx.recv().await {
            lines += 1;
            handle_line(&raw, status, log).await;
        }
        log.flush();
        if let Err(e) = reader_task.await {
            tracing::warn!(error = %e, "output reader task failed");
        }

        let exit = child.wait().await.map_err(|source| SupervisorError::Wait {
            program: self.command.program.clone(),
            source,
        })?;
        let info = ExitInfo { code: exit.code(), duration: started.elapsed(), lines };
        tracing::info!(code = ?info.code, lines, "job exited: {}", info);

        if self.wait_on_error && !info.success() {
            self.stall(workspace, &info, status).await;
        }
        Ok(info)
    }

    /// Block forever after a failed run so the workspace can be inspected.
    async fn stall<S: StatusSink>(&self, workspace: &Path, info: &ExitInfo, status: &S) {
        tracing::warn!(
            workspace = %workspace.display(),
            "job failed ({}); waiting on error until terminated",
            info
        );
        loop {
            deliver(
                status,
                StatusUpdate::new(
                    Severity::Warning,
                    format!(
                        "job failed ({}); workspace {} held for inspection",
                        info,
                        workspace.display()
                    ),
                ),
            )
            .await;
            tokio::time::sleep(self.heartbeat).await;
        }
    }
}

/// Blocking loop: split the pipe into lines until EOF.
///
/// A line longer than `max_line` bytes is delivered in `max_line` sized
/// pieces, so memory stays bounded and the log still gets every byte.
fn read_lines(reader: std::io::PipeReader, max_line: u64, tx: mpsc::Sender<Vec<u8>>) {
    let mut reader = BufReader::new(reader);
    loop {
        let mut buf = Vec::new();
        match (&mut reader).take(max_line).read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                if tx.blocking_send(buf).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!(error = %e, "failed reading job output");
                break;
            }
        }
    }
}

async fn handle_line<S: StatusSink>(raw: &[u8], status: &S, log: &mut JobLogger) {
    log.append(raw);

    let text = String::from_utf8_lossy(raw);
    let line = classify(&text);
    let forward = match line.severity {
        Severity::Error => {
            tracing::error!(target: "stitch::job", "{}", line.message);
            true
        }
        Severity::Warning => {
            tracing::warn!(target: "stitch::job", "{}", line.message);
            false
        }
        Severity::Info => {
            tracing::info!(target: "stitch::job", "{}", line.message);
            !line.message.is_empty()
        }
        Severity::Debug => {
            tracing::debug!(target: "stitch::job", "{}", line.message);
            false
        }
    };
    if forward {
        deliver(status, StatusUpdate::new(line.severity, line.message)).await;
    }
}

/// Best-effort status delivery.
pub(crate) async fn deliver<S: StatusSink>(status: &S, update: StatusUpdate) {
    if let Err(e) = status.update(update).await {
        tracing::warn!(error = %e, "failed to deliver status update");
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
