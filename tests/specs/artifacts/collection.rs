// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact collection specs
//!
//! Every manifest entry is accounted for: uploaded, skipped when the job
//! did not produce it, or failed. One outcome never blocks another.

use crate::prelude::*;
use stitch_core::CollectionOutcome;
use stitch_engine::JobRequest;

#[tokio::test]
async fn present_and_absent_outputs_are_both_reported() {
    let site = Site::new();
    let script = "mkdir -p odm_orthophoto odm_meshing \
                  && echo tif > odm_orthophoto/odm_orthophoto.tif \
                  && echo ply > odm_meshing/odm_mesh.ply";

    let result = site.run(script, JobRequest::new()).await;

    assert!(result.is_success(), "job failed: {:?}", result.summary());
    assert_eq!(result.uploaded(), vec!["orthophoto.tif", "mesh.ply.zip"]);
    assert!(result.skipped().contains(&"pointcloud"));
    assert!(result.skipped().contains(&"textured_model"));
    assert!(result.failed().is_empty());

    assert_eq!(site.uploaded("orthophoto.tif").as_deref(), Some("tif\n"));
    assert!(site.upload_exists("mesh.ply.zip"));
    assert!(!site.upload_exists("mesh.ply"));
}

#[tokio::test]
async fn job_with_no_outputs_skips_everything() {
    let site = Site::new();

    let result = site.run("true", JobRequest::new()).await;

    assert!(!result.outcomes.is_empty());
    assert!(result
        .outcomes
        .iter()
        .all(|o| matches!(o, CollectionOutcome::Skipped { .. })));
    assert!(result.is_success());
}

#[tokio::test]
async fn summary_lists_outcomes_in_manifest_order() {
    let site = Site::new();
    let script = "mkdir -p odm_meshing && echo ply > odm_meshing/odm_mesh.ply";

    let result = site.run(script, JobRequest::new()).await;
    let summary = serde_json::to_value(result.summary()).unwrap();

    let ids: Vec<&str> =
        summary["outcomes"].as_array().unwrap().iter().filter_map(|o| o["id"].as_str()).collect();
    assert_eq!(ids.first(), Some(&"orthophoto"));
    assert_eq!(ids.last(), Some(&"mesh"));
    assert_eq!(summary["project"], PROJECT);
}
