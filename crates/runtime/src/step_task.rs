// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-step execution pipeline: render → call connector → extract
//! outputs. Runs entirely without the run lock held; callers pass in a
//! [`RunSnapshot`] taken beforehand.

use crate::error::RuntimeError;
use crate::state::RunSnapshot;
use indexmap::IndexMap;
use weft_config::NormalizedStep;
use weft_connectors::ConnectorRegistry;
use weft_core::Value;
use weft_template::Context;

/// A step's extracted outputs plus the connector's human-readable notes,
/// carried through to `StepState.notes` regardless of outcome.
pub struct StepOutcome {
    pub outputs: IndexMap<String, Value>,
    pub notes: Vec<String>,
}

/// Render the step's configuration and input against `snapshot`, invoke its
/// connector, and extract the declared outputs. Any failure along the way
/// is reported as the step's `RuntimeError`; the caller decides what that
/// means for the step's terminal state and for its descendants.
pub async fn run_step(
    step: &NormalizedStep,
    registry: &ConnectorRegistry,
    snapshot: &RunSnapshot,
) -> Result<StepOutcome, RuntimeError> {
    let name = &step.decl.name;
    let ctx = Context::new(&snapshot.flows, &snapshot.sources);

    let rendered_configuration = weft_template::render(&step.resolved_configuration, &ctx)
        .map_err(|source| RuntimeError::Render {
            step: name.clone(),
            source,
        })?;
    let rendered_input =
        weft_template::render(&step.decl.input, &ctx).map_err(|source| RuntimeError::Render {
            step: name.clone(),
            source,
        })?;

    let connector = registry
        .build(&step.resolved_type, &rendered_configuration)
        .map_err(|source| RuntimeError::ConnectorBuild {
            step: name.clone(),
            type_name: step.resolved_type.clone(),
            source,
        })?;

    let result = connector.call(rendered_input).await;
    if !result.status.success {
        return Err(RuntimeError::ConnectorCall {
            step: name.clone(),
            notes: result.status.notes.clone(),
        });
    }

    let outputs =
        weft_template::extract(&result, &step.decl.output).map_err(|source| RuntimeError::Output {
            step: name.clone(),
            source,
        })?;
    Ok(StepOutcome {
        outputs,
        notes: result.status.notes.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use weft_connectors::{FakeConnector, FakeConnectorFactory};
    use weft_core::{ConnectorResult, OutputKind, OutputSpec, SourceRef, StepDecl};

    fn step_with(input: serde_json::Value, output: Vec<OutputSpec>) -> NormalizedStep {
        NormalizedStep {
            decl: StepDecl {
                name: "a".to_string(),
                source: SourceRef::Named("fake".to_string()),
                input,
                output,
                depends_on: Default::default(),
                on_error: None,
            },
            resolved_type: "fake".to_string(),
            resolved_configuration: serde_json::json!({}),
            source_name: Some("fake".to_string()),
        }
    }

    fn empty_snapshot() -> RunSnapshot {
        RunSnapshot {
            flows: Value::Map(indexmap::IndexMap::new()),
            sources: Value::Map(indexmap::IndexMap::new()),
        }
    }

    #[tokio::test]
    async fn happy_path_extracts_declared_outputs() {
        let fake = FakeConnector::new();
        fake.push_result(ConnectorResult::ok(serde_json::json!({"code": 200})));
        let mut registry = ConnectorRegistry::new();
        registry.register("fake", Arc::new(FakeConnectorFactory::new(fake)));

        let step = step_with(
            serde_json::json!({}),
            vec![OutputSpec {
                name: "code".to_string(),
                kind: OutputKind::Path,
                value: Some("$.code".to_string()),
            }],
        );

        let outcome = run_step(&step, &registry, &empty_snapshot()).await.unwrap();
        assert_eq!(outcome.outputs["code"], Value::Int(200));
    }

    #[tokio::test]
    async fn connector_failure_surfaces_as_runtime_error() {
        let fake = FakeConnector::new();
        fake.push_result(ConnectorResult::failed("unreachable"));
        let mut registry = ConnectorRegistry::new();
        registry.register("fake", Arc::new(FakeConnectorFactory::new(fake)));

        let step = step_with(serde_json::json!({}), vec![]);
        let err = run_step(&step, &registry, &empty_snapshot()).await.unwrap_err();
        assert!(matches!(err, RuntimeError::ConnectorCall { .. }));
    }

    #[tokio::test]
    async fn undefined_template_reference_surfaces_as_render_error() {
        let fake = FakeConnector::new();
        let mut registry = ConnectorRegistry::new();
        registry.register("fake", Arc::new(FakeConnectorFactory::new(fake)));

        let step = step_with(serde_json::json!("{{ flows.missing.v }}"), vec![]);
        let err = run_step(&step, &registry, &empty_snapshot()).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Render { .. }));
    }
}
