// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle specs
//!
//! A successful job runs in its own workspace, sees its inputs, has its
//! artifacts uploaded and leaves nothing behind.

use crate::prelude::*;
use stitch_core::{ConfigValue, JobState, Severity};
use stitch_engine::JobRequest;

const ORTHOPHOTO: &str = "mkdir -p odm_orthophoto && echo tif > odm_orthophoto/odm_orthophoto.tif";

#[tokio::test]
async fn successful_job_uploads_and_cleans_up() {
    let site = Site::new();

    let result = site.run(ORTHOPHOTO, JobRequest::new()).await;

    assert!(result.is_success(), "job failed: {}", result.summary().error.unwrap_or_default());
    assert_eq!(result.states.last(), Some(&JobState::Done));
    assert_eq!(site.uploaded("orthophoto.tif").as_deref(), Some("tif\n"));
    assert!(!site.workspace().exists());
    assert!(site.statuses(Severity::Error).is_empty());
}

#[tokio::test]
async fn inputs_are_linked_into_images() {
    let site = Site::new();
    let photo = site.file("incoming/DJI_0001.JPG", "jpeg");
    let request = JobRequest::new().inputs(vec![InputImage::new(photo, "DJI_0001.JPG")]);

    let result = site.run("cat images/DJI_0001.JPG; echo", request).await;

    assert_eq!(result.exit_code(), Some(0));
    assert_eq!(site.log(), "jpeg\n");
    assert!(site.root().join("incoming/DJI_0001.JPG").exists());
}

#[tokio::test]
async fn cleanup_leaves_room_for_the_next_job() {
    let site = Site::new();

    let first = site.run("echo first", JobRequest::new()).await;
    let second = site.run("echo second", JobRequest::new()).await;

    assert!(first.error.is_none());
    assert!(second.error.is_none(), "second job failed: {:?}", second.error);
    assert_eq!(site.log(), "second\n");
    assert!(!site.workspace().exists());
}

#[tokio::test]
async fn job_settings_file_is_rendered_into_the_workspace() {
    let site = Site::new();
    let request = JobRequest::new().params(params(&[("resize_to", ConfigValue::Int(2048))]));

    site.run("cat \"$ODM_SETTINGS\"", request).await;

    let log = site.log();
    assert!(log.contains("resize_to : 2048\n"), "settings were:\n{}", log);
    assert!(log.contains(&format!("name : {}\n", PROJECT)));
}
