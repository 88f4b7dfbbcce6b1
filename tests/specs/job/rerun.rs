// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rerun specs
//!
//! With `rerun_all` a leftover workspace is purged of stage outputs before
//! the job starts; without it the leftover is refused and left untouched.

use crate::prelude::*;
use stitch_core::{ConfigValue, RERUN_ALL_KEY};
use stitch_engine::JobRequest;

const REPORT: &str = "for d in odm_meshing opensfm notes; do \
                      if [ -e $d ]; then echo \"$d present\"; else echo \"$d gone\"; fi; done";

#[tokio::test]
async fn rerun_purges_stage_outputs() {
    let site = Site::new();
    site.file("site-a/odm_meshing/odm_mesh.ply", "stale");
    site.file("site-a/opensfm/reconstruction.json", "{}");
    site.file("site-a/notes/readme", "keep");
    let request = JobRequest::new().params(params(&[(RERUN_ALL_KEY, ConfigValue::Bool(true))]));

    let result = site.run(REPORT, request).await;

    assert!(result.error.is_none(), "unexpected error: {:?}", result.error);
    assert_eq!(site.log(), "odm_meshing gone\nopensfm gone\nnotes present\n");
}

#[tokio::test]
async fn leftover_workspace_without_rerun_is_refused() {
    let site = Site::new();
    site.file("site-a/odm_meshing/odm_mesh.ply", "stale");

    let result = site.run("touch ran", JobRequest::new()).await;

    assert!(result.error.is_some());
    assert!(result.exit.is_none());
    assert!(!site.workspace().join("ran").exists());
    let stale = site.workspace().join("odm_meshing/odm_mesh.ply");
    assert_eq!(std::fs::read_to_string(stale).unwrap(), "stale");
}
