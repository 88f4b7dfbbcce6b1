// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stitch`: run and inspect reconstruction jobs.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod exit_error;
mod output;
mod settings_args;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "stitch", version, about = "Reconstruction job orchestrator")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one job: prepare, launch, collect, clean up
    Run(Box<commands::run::RunArgs>),
    /// Print the settings a job would receive
    Merge(commands::merge::MergeArgs),
    /// Print the artifacts a run would collect
    Manifest,
    /// Decide whether a message would start a job
    Check(commands::check::CheckArgs),
}

/// Filter from `STITCH_LOG`, then `RUST_LOG`, then `info`. Logs go to
/// stderr so stdout stays machine readable.
fn init_tracing() {
    let filter = std::env::var("STITCH_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .and_then(|f| EnvFilter::try_new(f).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let format = cli.output;
    match cli.command {
        Command::Run(args) => commands::run::handle(*args, format).await,
        Command::Merge(args) => commands::merge::handle(args, format).await,
        Command::Manifest => commands::manifest::handle(format),
        Command::Check(args) => commands::check::handle(args, format),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = dispatch(cli).await {
        if let Some(exit) = e.downcast_ref::<ExitError>() {
            if !exit.message.is_empty() {
                eprintln!("error: {}", exit.message);
            }
            std::process::exit(exit.code);
        }
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
