// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! End-to-end specs: a real child process, real filesystem, fake status sink.

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/job"]
mod job {
    mod failure;
    mod lifecycle;
    mod rerun;
}

#[path = "specs/config"]
mod config {
    mod protected;
}

#[path = "specs/artifacts"]
mod artifacts {
    mod collection;
}
