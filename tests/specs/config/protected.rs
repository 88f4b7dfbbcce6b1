// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protected settings specs
//!
//! Job overrides cannot move the workspace root, and nothing a job sets
//! outlives the job.

use crate::prelude::*;
use stitch_core::{ConfigValue, Severity, PROJECT_PATH_KEY};
use stitch_engine::JobRequest;

#[tokio::test]
async fn override_cannot_redirect_project_path() {
    let site = Site::new();
    let request =
        JobRequest::new().params(params(&[(PROJECT_PATH_KEY, ConfigValue::from("/evil"))]));

    let result = site.run("grep project_path \"$ODM_SETTINGS\"", request).await;

    assert!(result.error.is_none(), "unexpected error: {:?}", result.error);
    assert_eq!(result.workspace.as_deref(), Some(site.workspace().as_path()));
    assert!(!site.log().contains("/evil"));
    assert!(site.log().contains(&site.workspace().display().to_string()));
}

#[tokio::test]
async fn override_file_is_layered_under_params() {
    let site = Site::new();
    let file = site.file("override.yaml", "resize_to: 1024\nfast_orthophoto: true\n");
    let request = JobRequest::new()
        .override_file(file)
        .params(params(&[("resize_to", ConfigValue::Int(4096))]));

    site.run("grep -e resize_to -e fast_orthophoto \"$ODM_SETTINGS\"", request).await;

    assert_eq!(site.log(), "resize_to : 4096\nfast_orthophoto : true\n");
}

#[tokio::test]
async fn job_settings_do_not_leak() {
    let site = Site::new();
    let before = site.config.read().clone();
    let request = JobRequest::new().params(params(&[("dsm", ConfigValue::Bool(true))]));

    site.run("exit 4", request).await;

    assert_eq!(*site.config.read(), before);
    assert!(site.statuses(Severity::Error).is_empty());
}
