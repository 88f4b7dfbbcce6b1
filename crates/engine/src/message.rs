// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job-triggering messages from the extraction framework.
//!
//! Only the parts of a message the orchestrator needs are modelled: which
//! file triggered it and where the downloaded inputs ended up.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::workspace::InputImage;

/// File whose upload triggers a reconstruction.
pub const TRIGGER_FILE: &str = "stitch.txt";

/// A file record attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFile {
    /// Name the file was uploaded under.
    pub filename: String,
    /// Where the framework placed it locally.
    pub filepath: String,
}

/// The resource a message refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub triggering_file: Option<String>,
    #[serde(default)]
    pub local_paths: Vec<String>,
    #[serde(default)]
    pub files: Vec<ResourceFile>,
}

/// Whether a message should start a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageAction {
    Download,
    Ignore,
}

stitch_core::simple_display! {
    MessageAction {
        Download => "download",
        Ignore => "ignore",
    }
}

/// Manual submissions (no triggering file) and the trigger file start a job.
pub fn check_message(resource: &Resource) -> MessageAction {
    match resource.triggering_file.as_deref() {
        None | Some(TRIGGER_FILE) => MessageAction::Download,
        Some(_) => MessageAction::Ignore,
    }
}

fn is_jpg(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".jpg")
}

fn base_name(name: &str) -> Option<&str> {
    Path::new(name).file_name().and_then(|n| n.to_str())
}

/// Pick the input images of a resource, in `local_paths` order.
pub fn select_images(resource: &Resource) -> Vec<InputImage> {
    let mut seen = HashSet::new();
    let mut images = Vec::new();
    for local in &resource.local_paths {
        let name = if is_jpg(local) {
            base_name(local)
        } else {
            resource
                .files
                .iter()
                .find(|f| &f.filepath == local && is_jpg(&f.filename))
                .and_then(|f| base_name(&f.filename))
        };
        let Some(name) = name else {
            tracing::debug!(path = %local, "not an input image");
            continue;
        };
        if !seen.insert(name.to_string()) {
            tracing::warn!(path = %local, name, "duplicate input image name, keeping the first");
            continue;
        }
        images.push(InputImage::new(local, name));
    }
    images
}
