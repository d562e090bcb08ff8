// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Config Loader and Dependency Analyzer.

pub mod dag;
pub mod loader;
pub mod merge;

pub use dag::{analyze, AnalyzedConfig, Dag};
pub use loader::{load_layers, NormalizedConfig, NormalizedStep, RunnerSettings, DEFAULT_MAX_WORKERS};
pub use merge::{deep_merge, merge_all};

/// Load and validate a run's configuration from layered YAML documents in
/// one call — the composition the CLI and `weft-specs` tests reach for.
pub fn load_and_analyze<S: AsRef<str>>(
    documents: &[S],
) -> Result<AnalyzedConfig, LoadError> {
    let normalized = load_layers(documents)?;
    let analyzed = analyze(normalized)?;
    Ok(analyzed)
}

/// Either stage of `load_and_analyze` can fail; this wraps both so callers
/// have one error type to match on at the top level.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] weft_core::ConfigError),
    #[error(transparent)]
    Validation(#[from] weft_core::ValidationError),
}
