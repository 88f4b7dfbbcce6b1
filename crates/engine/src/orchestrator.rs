// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level job coordinator.
//!
//! A job walks `Idle → Preparing → Running → Collecting → Cleaning → Done`.
//! Errors in the first three phases short-circuit to `Cleaning`, which is
//! the single exit path: it archives the durable log, restores the shared
//! configuration and deletes the workspace, whatever happened before.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use stitch_adapters::{StatusSink, StatusUpdate, Uploader};
use stitch_core::{
    default_manifest, CollectionOutcome, ConfigStore, Configuration, ExitInfo, JobId, JobState,
    OutputArtifact, ProjectName, ProtectedKeys, Severity, NAME_KEY, PROJECT_PATH_KEY,
    RERUN_ALL_KEY,
};
use tracing::Instrument;

use crate::collector::ArtifactCollector;
use crate::error::{JobError, SupervisorError};
use crate::job_logger::{self, JobLogger, JOB_LOG_FILE};
use crate::settings_file;
use crate::supervisor::{deliver, ProcessSupervisor};
use crate::workspace::{InputImage, JobWorkspace};

/// Configuration shared by sequential jobs of one worker process.
pub type SharedConfig = Arc<RwLock<Configuration>>;

/// What one job should do beyond the shared base configuration.
#[derive(Debug, Clone, Default)]
pub struct JobRequest {
    /// Job-supplied override file, applied first.
    pub override_file: Option<PathBuf>,
    /// Caller parameters, applied after the override file.
    pub params: Configuration,
    pub inputs: Vec<InputImage>,
}

impl JobRequest {
    pub fn new() -> Self {
        Self::default()
    }

    stitch_core::setters! {
        set { params: Configuration, inputs: Vec<InputImage> }
        option { override_file: PathBuf }
    }
}

/// Terminal outcome of one job.
#[derive(Debug)]
pub struct JobResult {
    pub job_id: JobId,
    pub project: Option<String>,
    /// Workspace the job ran in (already removed).
    pub workspace: Option<PathBuf>,
    /// `None` when the process never ran.
    pub exit: Option<ExitInfo>,
    pub outcomes: Vec<CollectionOutcome>,
    /// Fatal error that aborted the job, if any.
    pub error: Option<JobError>,
    /// States passed through, starting at `Idle` and ending at `Done`.
    pub states: Vec<JobState>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Copy of the durable log, when archiving is configured.
    pub log_archive: Option<PathBuf>,
}

impl JobResult {
    pub fn exit_code(&self) -> Option<i32> {
        self.exit.as_ref().and_then(|e| e.code)
    }

    /// Upload names of collected artifacts.
    pub fn uploaded(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                CollectionOutcome::Uploaded { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Ids of artifacts the job did not produce.
    pub fn skipped(&self) -> Vec<&str> {
        self.outcomes.iter().filter(|o| o.is_skipped()).map(|o| o.id()).collect()
    }

    pub fn failed(&self) -> Vec<&str> {
        self.outcomes.iter().filter(|o| o.is_failed()).map(|o| o.id()).collect()
    }

    /// No fatal error, clean exit and no failed uploads.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
            && self.exit.as_ref().is_some_and(ExitInfo::success)
            && self.failed().is_empty()
    }

    pub fn summary(&self) -> JobSummary {
        JobSummary {
            job_id: self.job_id.to_string(),
            project: self.project.clone(),
            exit_code: self.exit_code(),
            exit: self.exit.clone(),
            outcomes: self.outcomes.clone(),
            error: self.error.as_ref().map(ToString::to_string),
            states: self.states.clone(),
            started_at: self.started_at,
            finished_at: self.finished_at,
            log_archive: self.log_archive.clone(),
        }
    }
}

/// Serializable view of a [`JobResult`].
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub job_id: String,
    pub project: Option<String>,
    pub exit_code: Option<i32>,
    pub exit: Option<ExitInfo>,
    pub outcomes: Vec<CollectionOutcome>,
    pub error: Option<String>,
    pub states: Vec<JobState>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub log_archive: Option<PathBuf>,
}

/// Records the walk through [`JobState`].
struct StateTrail {
    current: JobState,
    trail: Vec<JobState>,
}

impl StateTrail {
    fn new() -> Self {
        Self { current: JobState::Idle, trail: vec![JobState::Idle] }
    }

    fn enter(&mut self, next: JobState) {
        if !self.current.can_transition_to(next) {
            tracing::warn!(from = %self.current, to = %next, "unexpected job state transition");
        }
        tracing::info!(from = %self.current, to = %next, "job state");
        self.current = next;
        self.trail.push(next);
    }
}

/// Puts the pre-job configuration back into the shared slot.
///
/// `restore()` is called on the normal cleanup path; `Drop` covers a job
/// future that is dropped mid-flight.
struct ConfigRestore {
    shared: SharedConfig,
    snapshot: Configuration,
    restored: bool,
}

impl ConfigRestore {
    fn take(shared: &SharedConfig) -> Self {
        let snapshot = shared.read().clone();
        Self { shared: Arc::clone(shared), snapshot, restored: false }
    }

    fn snapshot(&self) -> &Configuration {
        &self.snapshot
    }

    fn swap_in(&self, working: Configuration) {
        *self.shared.write() = working;
    }

    fn restore(mut self) {
        self.put_back();
    }

    fn put_back(&mut self) {
        if !self.restored {
            *self.shared.write() = self.snapshot.clone();
            self.restored = true;
            tracing::debug!("configuration restored");
        }
    }
}

impl Drop for ConfigRestore {
    fn drop(&mut self) {
        self.put_back();
    }
}

/// Output of a successful `Preparing` phase.
struct Prepared {
    working: Configuration,
    logger: JobLogger,
}

/// Coordinates one job at a time against a shared configuration.
pub struct JobOrchestrator<U, S> {
    config: SharedConfig,
    supervisor: ProcessSupervisor,
    collector: ArtifactCollector<U>,
    status: S,
    manifest: Vec<OutputArtifact>,
    protected: ProtectedKeys,
    log_archive_dir: Option<PathBuf>,
}

impl<U: Uploader, S: StatusSink> JobOrchestrator<U, S> {
    pub fn new(config: SharedConfig, supervisor: ProcessSupervisor, uploader: U, status: S) -> Self {
        Self {
            config,
            supervisor,
            collector: ArtifactCollector::new(uploader),
            status,
            manifest: default_manifest(),
            protected: ProtectedKeys::workspace_root(),
            log_archive_dir: None,
        }
    }

    stitch_core::setters! {
        set { manifest: Vec<OutputArtifact>, protected: ProtectedKeys }
        option { log_archive_dir: PathBuf }
    }

    pub fn shared_config(&self) -> &SharedConfig {
        &self.config
    }

    /// Run one job to `Done`.
    ///
    /// Never fails: fatal errors end up in [`JobResult::error`] after
    /// cleanup has run.
    pub async fn run(&self, request: JobRequest) -> JobResult {
        let job_id = JobId::new();
        let span = tracing::info_span!("job", job_id = %job_id, project = tracing::field::Empty);
        self.run_job(job_id, request).instrument(span).await
    }

    async fn run_job(&self, job_id: JobId, request: JobRequest) -> JobResult {
        let started_at = Utc::now();
        let mut states = StateTrail::new();
        let restore = ConfigRestore::take(&self.config);
        let mut workspace: Option<JobWorkspace> = None;
        let mut exit = None;
        let mut outcomes = Vec::new();
        let mut error = None;

        states.enter(JobState::Preparing);
        self.report(StatusUpdate::info("Preparing workspace.")).await;
        match self.prepare(&request, &restore, &mut workspace).await {
            Ok(Prepared { working, mut logger }) => {
                // `prepare` only succeeds once the workspace is set.
                let ws_path = workspace.as_ref().map(|w| w.path().to_path_buf()).unwrap_or_default();

                states.enter(JobState::Running);
                self.report(StatusUpdate::info("Running reconstruction.")).await;
                match self.supervisor.run(&ws_path, &working, &self.status, &mut logger).await {
                    Ok(info) => {
                        if !info.success() {
                            self.report(StatusUpdate::new(
                                Severity::Warning,
                                format!("reconstruction failed: {}", info),
                            ))
                            .await;
                        }
                        exit = Some(info);
                        drop(logger);

                        states.enter(JobState::Collecting);
                        self.report(StatusUpdate::info("Uploading results.")).await;
                        outcomes = self.collector.collect_all(&ws_path, &self.manifest).await;
                    }
                    Err(e) => {
                        // The supervisor reports launch failures itself.
                        if !matches!(e, SupervisorError::Launch { .. }) {
                            self.report(StatusUpdate::error(e.to_string())).await;
                        }
                        error = Some(JobError::from(e));
                    }
                }
            }
            Err(e) => {
                self.report(StatusUpdate::error(e.to_string())).await;
                error = Some(e);
            }
        }

        states.enter(JobState::Cleaning);
        let log_archive = match (&self.log_archive_dir, &workspace) {
            (Some(dir), Some(ws)) if ws.is_owned() => archive_log(ws.path(), dir, ws.name()),
            _ => None,
        };
        restore.restore();
        if let Some(ws) = workspace.as_mut() {
            ws.cleanup().await;
        }
        states.enter(JobState::Done);

        let result = JobResult {
            job_id,
            project: workspace.as_ref().map(|w| w.name().to_string()),
            workspace: workspace.as_ref().map(|w| w.path().to_path_buf()),
            exit,
            outcomes,
            error,
            states: states.trail,
            started_at,
            finished_at: Utc::now(),
            log_archive,
        };
        self.log_result(&result);
        result
    }

    /// `Preparing`: merge overrides, establish the workspace, link inputs.
    ///
    /// The workspace is stored in `slot` as soon as it is known so cleanup
    /// can remove whatever was created before a failure.
    async fn prepare(
        &self,
        request: &JobRequest,
        restore: &ConfigRestore,
        slot: &mut Option<JobWorkspace>,
    ) -> Result<Prepared, JobError> {
        let base = restore.snapshot();
        let file_overrides = settings_file::load_overrides(request.override_file.as_deref()).await?;
        let store = ConfigStore::new(base.clone(), self.protected.clone());
        let merged = store.merge_layers([&file_overrides, &request.params]);

        let root = merged
            .get_str(PROJECT_PATH_KEY)
            .filter(|r| !r.is_empty())
            .ok_or(JobError::MissingKey(PROJECT_PATH_KEY))?;
        let name = merged
            .get(NAME_KEY)
            .map(ToString::to_string)
            .filter(|n| !n.is_empty())
            .ok_or(JobError::MissingKey(NAME_KEY))?;
        let name = ProjectName::parse(&name)?;
        tracing::Span::current().record("project", name.as_str());

        let ws = slot.insert(JobWorkspace::new(root, name));
        let mut working = merged.clone();
        working.insert(PROJECT_PATH_KEY, ws.path().display().to_string());
        restore.swap_in(working.clone());

        ws.prepare(merged.flag(RERUN_ALL_KEY)).await?;
        ws.link_inputs(&request.inputs).await?;

        let log_path = ws.path().join(JOB_LOG_FILE);
        let logger = JobLogger::open(&log_path)
            .map_err(|source| SupervisorError::Log { path: log_path.clone(), source })?;
        tracing::info!(
            workspace = %ws.path().display(),
            inputs = request.inputs.len(),
            "workspace prepared"
        );
        Ok(Prepared { working, logger })
    }

    async fn report(&self, update: StatusUpdate) {
        deliver(&self.status, update).await;
    }

    fn log_result(&self, result: &JobResult) {
        let elapsed = (result.finished_at - result.started_at).to_std().unwrap_or_default();
        let exit = result.exit.as_ref().map(ToString::to_string);
        match &result.error {
            Some(e) => tracing::error!(
                started_at = %stitch_core::format_utc(result.started_at),
                finished_at = %stitch_core::format_utc(result.finished_at),
                elapsed = %stitch_core::format_elapsed(elapsed),
                error = %e,
                "job aborted"
            ),
            None => tracing::info!(
                started_at = %stitch_core::format_utc(result.started_at),
                finished_at = %stitch_core::format_utc(result.finished_at),
                elapsed = %stitch_core::format_elapsed(elapsed),
                exit = exit.as_deref().unwrap_or("none"),
                uploaded = result.uploaded().len(),
                skipped = result.skipped().len(),
                failed = result.failed().len(),
                "job finished"
            ),
        }
    }
}

fn archive_log(workspace: &Path, dir: &Path, project: &ProjectName) -> Option<PathBuf> {
    let log_path = workspace.join(JOB_LOG_FILE);
    if !log_path.exists() {
        return None;
    }
    job_logger::archive(&log_path, dir, project.as_str())
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
