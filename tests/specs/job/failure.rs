// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job failure specs
//!
//! A failing job is reported once, still collected and still cleaned up.
//! Fatal setup errors never start the child.

use crate::prelude::*;
use stitch_core::{ConfigValue, JobState, Severity, NAME_KEY};
use stitch_engine::JobRequest;

#[tokio::test]
async fn failing_job_reports_its_error_once() {
    let site = Site::new();

    let script = "echo '[INFO] Running opensfm'; echo '[ERROR] bad input'; exit 1";

    let result = site.run(script, JobRequest::new()).await;

    assert!(result.error.is_none());
    assert_eq!(result.exit_code(), Some(1));
    assert!(!result.is_success());
    assert_eq!(site.statuses(Severity::Error), vec!["bad input"]);
    assert_eq!(site.log(), "[INFO] Running opensfm\n[ERROR] bad input\n");
    assert!(!site.workspace().exists());
}

#[tokio::test]
async fn failing_job_still_has_outputs_collected() {
    let site = Site::new();
    let script = "mkdir -p odm_orthophoto && echo partial > odm_orthophoto/odm_orthophoto.tif; exit 2";

    let result = site.run(script, JobRequest::new()).await;

    assert_eq!(result.exit_code(), Some(2));
    assert!(result.states.contains(&JobState::Collecting));
    assert_eq!(site.uploaded("orthophoto.tif").as_deref(), Some("partial\n"));
}

#[tokio::test]
async fn exec_failure_inside_the_child_is_an_ordinary_exit() {
    let site = Site::new();

    let result = site.run("exec /nonexistent/odm", JobRequest::new()).await;

    assert!(result.error.is_none());
    assert_eq!(result.exit_code(), Some(127));
    assert!(!site.workspace().exists());
}

#[tokio::test]
async fn invalid_project_name_never_runs_the_job() {
    let site = Site::new();
    let request = JobRequest::new().params(params(&[(NAME_KEY, ConfigValue::from("../escape"))]));

    let result = site.run("touch ran", request).await;

    assert!(result.error.is_some());
    assert!(result.exit.is_none());
    assert!(!result.states.contains(&JobState::Running));
    assert!(!site.root().join("ran").exists());
    assert_eq!(site.statuses(Severity::Error).len(), 1);
}
