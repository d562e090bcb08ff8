// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy. Crate-specific errors (`TemplateError`,
//! `OutputError`, `ConnectorCallError`, `RuntimeError`) live in their own
//! crates and wrap these via `#[from]` where they cross a boundary.

use thiserror::Error;

/// Malformed document, missing required field, unknown connector type, or
/// an unresolvable base reference.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config document: {0}")]
    Parse(String),

    #[error("step '{step}' references unknown source base '{base}'")]
    UnknownSourceBase { step: String, base: String },

    #[error("connector type '{type_name}' is not registered")]
    UnknownConnectorType { type_name: String },

    #[error("invalid connector configuration for type '{type_name}': {message}")]
    InvalidConnectorConfig { type_name: String, message: String },
}

/// A single dependency/validation problem, aggregated into a
/// `ValidationError` rather than raised individually.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingDependsOn { step: String, missing: String },
    MissingTemplateRef { step: String, missing: String },
    DuplicateStepName { name: String },
    Cycle { members: Vec<String> },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::MissingDependsOn { step, missing } => write!(
                f,
                "step '{}' depends_on unknown step '{}'",
                step, missing
            ),
            ValidationIssue::MissingTemplateRef { step, missing } => write!(
                f,
                "step '{}' references 'flows.{}' but no such step is declared",
                step, missing
            ),
            ValidationIssue::DuplicateStepName { name } => {
                write!(f, "duplicate step name '{}'", name)
            }
            ValidationIssue::Cycle { members } => {
                write!(f, "dependency cycle among steps: [{}]", members.join(", "))
            }
        }
    }
}

/// Aggregates every dependency/validation problem found in one pass, so
/// callers see all issues at once rather than fixing them one at a time.
#[derive(Debug, Error)]
#[error("{}", format_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }
}
