// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `weft` - run-entry contract embedding example.
//!
//! Loads one or more layered YAML documents, validates and analyzes them,
//! and drives the resulting DAG to completion against a registry that only
//! knows the `noop` connector. Concrete connectors (HTTP, subprocess, env)
//! are an embedder's concern, not this crate's.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use weft_connectors::{ConnectorRegistry, NoopConnectorFactory};
use weft_core::StepStateKind;
use weft_runtime::Runner;

#[derive(Parser)]
#[command(name = "weft", version, about = "Declarative workflow runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load config layers and run the resulting flow to completion
    Run {
        /// YAML config documents, applied in order (later layers win)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Serve the read-only status view at this address while the run
        /// executes (e.g. 127.0.0.1:8080)
        #[arg(long = "status")]
        status_addr: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Run { files, status_addr } => run(files, status_addr),
    }
}

fn run(files: Vec<PathBuf>, status_addr: Option<String>) -> Result<()> {
    let documents = files
        .iter()
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config layer '{}'", path.display()))
        })
        .collect::<Result<Vec<String>>>()?;

    let analyzed = weft_config::load_and_analyze(&documents)
        .context("failed to load and validate configuration")?;

    let mut registry = ConnectorRegistry::new();
    registry.register("noop", Arc::new(NoopConnectorFactory));

    let runner = Runner::new(analyzed, registry);
    let (run_state_holder, join) = runner.spawn();

    let status_handle = status_addr
        .map(|addr| weft_status::serve(addr, Arc::clone(&run_state_holder)))
        .transpose()
        .context("failed to start status server")?;
    if let Some(handle) = &status_handle {
        info!(addr = handle.local_addr(), "serving status view for this run");
    }

    join.join()
        .map_err(|_| anyhow::anyhow!("run thread panicked"))?;
    if let Some(handle) = status_handle {
        handle.shutdown();
    }

    let run_state = run_state_holder.to_run_state();
    println!(
        "{}",
        serde_json::to_string_pretty(&run_state).context("failed to serialize run state")?
    );

    let any_failed = run_state
        .steps
        .values()
        .any(|s| s.state == StepStateKind::Failed);
    if any_failed {
        std::process::exit(1);
    }
    Ok(())
}
