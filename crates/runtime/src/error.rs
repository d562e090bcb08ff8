// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced while a run is executing.

#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    #[error("step `{step}` failed to render its input/configuration: {source}")]
    Render {
        step: String,
        #[source]
        source: weft_template::TemplateError,
    },

    #[error("step `{step}` failed to build connector `{type_name}`: {source}")]
    ConnectorBuild {
        step: String,
        type_name: String,
        #[source]
        source: weft_core::ConfigError,
    },

    #[error("step `{step}` connector call reported failure: {}", join_notes(notes))]
    ConnectorCall { step: String, notes: Vec<String> },

    #[error("step `{step}` failed to extract outputs: {source}")]
    Output {
        step: String,
        #[source]
        source: weft_template::OutputError,
    },
}

fn join_notes(notes: &[String]) -> String {
    if notes.is_empty() {
        "connector reported failure without notes".to_string()
    } else {
        notes.join("; ")
    }
}

impl RuntimeError {
    /// Human-readable notes to surface on `StepState.notes`. Connector
    /// failures carry the connector's own notes; every other failure kind
    /// has no connector-supplied detail, so the formatted error stands in.
    pub fn notes(&self) -> Vec<String> {
        match self {
            RuntimeError::ConnectorCall { notes, .. } => notes.clone(),
            other => vec![other.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_call_notes_are_returned_verbatim() {
        let err = RuntimeError::ConnectorCall {
            step: "a".to_string(),
            notes: vec!["timed out".to_string()],
        };
        assert_eq!(err.notes(), vec!["timed out".to_string()]);
    }

    #[test]
    fn empty_connector_notes_fall_back_in_display() {
        let err = RuntimeError::ConnectorCall {
            step: "a".to_string(),
            notes: vec![],
        };
        assert!(err.to_string().contains("without notes"));
    }

    #[test]
    fn non_connector_errors_use_their_display_as_notes() {
        let err = RuntimeError::Output {
            step: "a".to_string(),
            source: weft_template::OutputError::MissingPathValue {
                name: "x".to_string(),
                path: "$.x".to_string(),
            },
        };
        assert_eq!(err.notes(), vec![err.to_string()]);
    }
}
