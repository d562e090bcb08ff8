// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config Loader: parse layered YAML documents, deep-merge, normalize.

use crate::merge::merge_all;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::HashMap;
use weft_core::{ConfigError, OnError, SourceDecl, SourceRef, StepDecl};

/// `runner: {max_workers?, on_error?}` from the top-level document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub max_workers: Option<usize>,
    pub on_error: Option<OnError>,
}

/// Preserved default worker count. The source ecosystem derives this from
/// `min(4, active_threads + 3)`, which is an artifact of its own thread
/// pool sizing and not worth reproducing — see DESIGN.md Open Question 2.
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Resolved run-wide settings after defaults are applied.
#[derive(Debug, Clone, Copy)]
pub struct RunnerSettings {
    pub max_workers: usize,
    pub on_error: OnError,
}

impl From<RunnerConfig> for RunnerSettings {
    fn from(raw: RunnerConfig) -> Self {
        Self {
            max_workers: raw.max_workers.unwrap_or(DEFAULT_MAX_WORKERS).max(1),
            on_error: raw.on_error.unwrap_or(OnError::Fail),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    configuration: Json,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDocument {
    sources: HashMap<String, RawSource>,
    flow: Vec<StepDecl>,
    runner: RunnerConfig,
}

/// A step whose `source` has been materialized into a canonical
/// `{type, configuration}` pair, alongside the original declaration.
#[derive(Debug, Clone)]
pub struct NormalizedStep {
    pub decl: StepDecl,
    pub resolved_type: String,
    pub resolved_configuration: Json,
    /// The named source this step's connector configuration came from, if
    /// any (`Named` or `Override` forms). Used by the runner to decide
    /// whether to merge this step's outputs back into the sources store.
    pub source_name: Option<String>,
}

/// The fully loaded and normalized configuration, ready for the
/// Dependency Analyzer.
#[derive(Debug)]
pub struct NormalizedConfig {
    pub sources: HashMap<String, SourceDecl>,
    pub steps: Vec<NormalizedStep>,
    pub runner: RunnerSettings,
}

/// Parse a single YAML document into a JSON value (uniform representation
/// for merging and templating).
fn parse_yaml_document(content: &str) -> Result<Json, ConfigError> {
    serde_yaml::from_str(content).map_err(|e| {
        tracing::warn!(error = %e, "failed to parse config layer");
        ConfigError::Parse(e.to_string())
    })
}

/// Load and normalize configuration from one or more layered YAML
/// documents. Later documents override earlier ones per the deep-merge
/// rule.
pub fn load_layers<S: AsRef<str>>(documents: &[S]) -> Result<NormalizedConfig, ConfigError> {
    let parsed: Result<Vec<Json>, ConfigError> = documents
        .iter()
        .map(|doc| parse_yaml_document(doc.as_ref()))
        .collect();
    let merged = merge_all(parsed?);
    normalize(merged)
}

fn normalize(merged: Json) -> Result<NormalizedConfig, ConfigError> {
    let raw: RawDocument =
        serde_json::from_value(merged).map_err(|e| ConfigError::Parse(e.to_string()))?;

    let mut sources = HashMap::with_capacity(raw.sources.len());
    for (name, raw_source) in raw.sources {
        sources.insert(
            name.clone(),
            SourceDecl {
                name,
                type_name: raw_source.type_name,
                configuration: raw_source.configuration,
            },
        );
    }

    let mut steps = Vec::with_capacity(raw.flow.len());
    for decl in raw.flow {
        let (resolved_type, resolved_configuration, source_name) =
            resolve_source(&decl.name, &decl.source, &sources)?;
        steps.push(NormalizedStep {
            decl,
            resolved_type,
            resolved_configuration,
            source_name,
        });
    }

    Ok(NormalizedConfig {
        sources,
        steps,
        runner: raw.runner.into(),
    })
}

fn resolve_source(
    step_name: &str,
    source: &SourceRef,
    sources: &HashMap<String, SourceDecl>,
) -> Result<(String, Json, Option<String>), ConfigError> {
    match source {
        SourceRef::Inline {
            type_name,
            configuration,
        } => Ok((type_name.clone(), configuration.clone(), None)),
        SourceRef::Named(name) => {
            let base = sources
                .get(name)
                .ok_or_else(|| ConfigError::UnknownSourceBase {
                    step: step_name.to_string(),
                    base: name.clone(),
                })?;
            Ok((
                base.type_name.clone(),
                base.configuration.clone(),
                Some(name.clone()),
            ))
        }
        SourceRef::Override { base, override_ } => {
            let base_decl = sources
                .get(base)
                .ok_or_else(|| ConfigError::UnknownSourceBase {
                    step: step_name.to_string(),
                    base: base.clone(),
                })?;
            let merged = crate::merge::deep_merge(base_decl.configuration.clone(), override_.clone());
            Ok((base_decl.type_name.clone(), merged, Some(base.clone())))
        }
    }
}
