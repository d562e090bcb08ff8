// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative config types: sources, steps, and output specs.
//!
//! These are immutable once the Config Loader has normalized them; the
//! Dependency Analyzer and Scheduler only ever read them.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeSet;

/// A named, reusable connector declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub configuration: Json,
}

/// The three ways a step may reference a connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceRef {
    /// `source: "name"` — a reference to a declared `SourceDecl`.
    Named(String),
    /// `source: { type, configuration }` — an inline declaration.
    Inline {
        #[serde(rename = "type")]
        type_name: String,
        #[serde(default)]
        configuration: Json,
    },
    /// `source: { base, override }` — a named base with a deep-merged
    /// override applied on top.
    Override {
        base: String,
        #[serde(rename = "override", default)]
        override_: Json,
    },
}

/// A step's fully-resolved connector reference: `{type, configuration}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSource {
    pub type_name: String,
    pub configuration: Json,
    /// Name of the originating named source, if `SourceRef::Named` or
    /// `SourceRef::Override` was used. `None` for pure inline sources.
    /// Used by the scheduler to decide whether to merge step outputs back
    /// into the `sources` store after a successful run.
    pub source_name: Option<String>,
}

/// Per-step error policy: what happens to descendants when this step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnError {
    /// Abort the whole run; skip all transitive descendants.
    Fail,
    /// Skip all transitive descendants; continue the rest of the graph.
    Skip,
    /// Treat descendants as unblocked; they fail at render time if they
    /// reference this step's (absent) outputs without `default(...)`.
    Continue,
}

impl Default for OnError {
    fn default() -> Self {
        OnError::Fail
    }
}

/// `{name, kind, value?}` — how to derive a named output from a
/// connector's structured result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub name: String,
    pub kind: OutputKind,
    /// JSON-path expression; required when `kind == Path`, ignored for `Raw`.
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Raw,
    Path,
}

/// A node in the DAG, as declared in the config's `flow` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDecl {
    pub name: String,
    pub source: SourceRef,
    #[serde(default)]
    pub input: Json,
    #[serde(default)]
    pub output: Vec<OutputSpec>,
    #[serde(default)]
    pub depends_on: BTreeSet<String>,
    #[serde(default)]
    pub on_error: Option<OnError>,
}

impl StepDecl {
    /// The effective error policy: the step's own, or the run-wide default.
    pub fn on_error(&self, run_default: OnError) -> OnError {
        self.on_error.unwrap_or(run_default)
    }
}
