// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Behavioral specifications for the workflow runner, exercised end to end
//! through `load_and_analyze` and `Runner`/`run_async` against real
//! connectors (`noop`, `fake`, and a local `slow` test double).

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use weft_config::load_and_analyze;
use weft_connectors::{Connector, ConnectorFactory, ConnectorRegistry, FakeConnector, FakeConnectorFactory, NoopConnectorFactory};
use weft_core::{ConfigError, ConnectorResult, StepStateKind};
use weft_runtime::{run_async, Runner};

/// A connector that sleeps for `delay_ms` (from its input) before
/// succeeding, so tests can observe overlap between concurrently running
/// steps.
struct SlowConnector;

#[async_trait]
impl Connector for SlowConnector {
    async fn call(&self, input: serde_json::Value) -> ConnectorResult {
        let delay_ms = input.get("delay_ms").and_then(|v| v.as_u64()).unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        ConnectorResult::ok(input)
    }
}

struct SlowConnectorFactory;

impl ConnectorFactory for SlowConnectorFactory {
    fn build(&self, _configuration: &serde_json::Value) -> Result<Box<dyn Connector>, ConfigError> {
        Ok(Box::new(SlowConnector))
    }
}

fn base_registry() -> ConnectorRegistry {
    let mut registry = ConnectorRegistry::new();
    registry.register("noop", Arc::new(NoopConnectorFactory));
    registry.register("slow", Arc::new(SlowConnectorFactory));
    registry
}

fn registry_with_fake(fake: FakeConnector) -> ConnectorRegistry {
    let mut registry = base_registry();
    registry.register("fake", Arc::new(FakeConnectorFactory::new(fake)));
    registry
}

#[tokio::test]
async fn s1_sequential_via_template_reference() {
    let doc = r#"
flow:
  - name: a
    source: {type: noop, configuration: {}}
    output: [{name: v, kind: path, value: "$.input.n"}]
    input: {n: 1}
  - name: b
    source: {type: noop, configuration: {}}
    input: "{{ flows.a.v }}"
"#;
    let config = load_and_analyze(&[doc]).expect("config loads");
    let state = run_async(config, base_registry()).await;
    let run = state.to_run_state();
    assert_eq!(run.steps["a"].state, StepStateKind::Succeeded);
    assert_eq!(run.steps["b"].state, StepStateKind::Succeeded);
    assert!(run.steps["b"].started_at >= run.steps["a"].ended_at);
    let snap = state.snapshot();
    assert_eq!(
        snap.flows.get_member("a").and_then(|v| v.get_member("v")),
        Some(&weft_core::Value::Int(1))
    );
}

#[tokio::test]
async fn s2_parallel_independents_overlap() {
    let doc = r#"
flow:
  - name: a
    source: {type: slow, configuration: {}}
    input: {delay_ms: 80}
  - name: b
    source: {type: slow, configuration: {}}
    input: {delay_ms: 80}
runner:
  max_workers: 2
"#;
    let config = load_and_analyze(&[doc]).expect("config loads");
    let (state, join) = Runner::new(config, base_registry()).spawn();

    let mut saw_both_running = false;
    for _ in 0..50 {
        let run = state.to_run_state();
        if run.running_steps().len() == 2 {
            saw_both_running = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    join.join().expect("run thread does not panic");

    assert!(saw_both_running, "expected both steps to be observed running at once");
    let run = state.to_run_state();
    assert_eq!(run.steps["a"].state, StepStateKind::Succeeded);
    assert_eq!(run.steps["b"].state, StepStateKind::Succeeded);
}

#[tokio::test]
async fn s3_explicit_depends_on_without_template_ref() {
    let doc = r#"
flow:
  - name: a
    source: {type: noop, configuration: {}}
  - name: b
    source: {type: noop, configuration: {}}
    depends_on: [a]
"#;
    let config = load_and_analyze(&[doc]).expect("config loads");
    let state = run_async(config, base_registry()).await;
    let run = state.to_run_state();
    assert!(run.steps["b"].started_at >= run.steps["a"].ended_at);
}

#[tokio::test]
async fn s4_error_policy_skip_cascades_through_a_chain() {
    let doc = r#"
flow:
  - name: a
    source: {type: fake, configuration: {}}
    on_error: skip
  - name: b
    source: {type: noop, configuration: {}}
    input: "{{ flows.a }}"
  - name: c
    source: {type: noop, configuration: {}}
    depends_on: [b]
"#;
    let config = load_and_analyze(&[doc]).expect("config loads");
    let fake = FakeConnector::new();
    fake.push_result(ConnectorResult::failed("boom"));
    let state = run_async(config, registry_with_fake(fake)).await;
    let run = state.to_run_state();
    assert_eq!(run.steps["a"].state, StepStateKind::Failed);
    assert_eq!(run.steps["b"].state, StepStateKind::Skipped);
    assert_eq!(run.steps["c"].state, StepStateKind::Skipped);
    assert!(run.steps["a"].ended_at.is_some());
    assert!(run.steps["b"].ended_at.is_some());
    assert!(run.steps["c"].ended_at.is_some());
}

#[tokio::test]
async fn s5_error_policy_continue_runs_independent_children() {
    let doc = r#"
flow:
  - name: a
    source: {type: fake, configuration: {}}
    on_error: continue
  - name: b
    source: {type: noop, configuration: {}}
    input: "ok"
"#;
    let config = load_and_analyze(&[doc]).expect("config loads");
    let fake = FakeConnector::new();
    fake.push_result(ConnectorResult::failed("boom"));
    let state = run_async(config, registry_with_fake(fake)).await;
    let run = state.to_run_state();
    assert_eq!(run.steps["b"].state, StepStateKind::Succeeded);
    let snap = state.snapshot();
    assert!(snap.flows.get_member("a").is_none());
    assert!(snap.flows.get_member("b").is_some());
}

#[test]
fn s6_cycle_is_rejected_before_the_run_starts() {
    let doc = r#"
flow:
  - name: a
    source: {type: noop, configuration: {}}
    depends_on: [b]
  - name: b
    source: {type: noop, configuration: {}}
    depends_on: [a]
"#;
    let err = load_and_analyze(&[doc]).expect_err("cyclic config must not load");
    let msg = err.to_string();
    assert!(msg.contains("cycle"));
    assert!(msg.contains('a'));
    assert!(msg.contains('b'));
}

#[tokio::test]
async fn s7_strict_templating_fails_on_undeclared_output() {
    let doc = r#"
flow:
  - name: x
    source: {type: noop, configuration: {}}
    output: [{name: declared, kind: path, value: "$.input"}]
    input: 1
  - name: y
    source: {type: noop, configuration: {}}
    input: "{{ flows.x.missing }}"
"#;
    let config = load_and_analyze(&[doc]).expect("config loads");
    let state = run_async(config, base_registry()).await;
    let run = state.to_run_state();
    assert_eq!(run.steps["x"].state, StepStateKind::Succeeded);
    assert_eq!(run.steps["y"].state, StepStateKind::Failed);
    let error = run.steps["y"].error.as_ref().expect("failed step has an error");
    assert!(error.contains("flows.x.missing"));
}

#[tokio::test]
async fn layered_config_overrides_merge_before_the_run() {
    let base = r#"
sources:
  api:
    type: noop
    configuration: {base: true}
flow:
  - name: a
    source: api
    input: 1
runner:
  max_workers: 1
"#;
    let overlay = r#"
runner:
  max_workers: 4
"#;
    let config = load_and_analyze(&[base, overlay]).expect("layered config loads");
    assert_eq!(config.runner.max_workers, 4);
    let state = run_async(config, base_registry()).await;
    assert_eq!(
        state.to_run_state().steps["a"].state,
        StepStateKind::Succeeded
    );
}

#[tokio::test]
async fn wide_fan_out_completes_under_a_bounded_worker_pool() {
    let mut doc = String::from("flow:\n");
    for i in 0..40 {
        doc.push_str(&format!(
            "  - name: leaf{i}\n    source: {{type: noop, configuration: {{}}}}\n    input: {i}\n"
        ));
    }
    doc.push_str("runner:\n  max_workers: 4\n");

    let config = load_and_analyze(&[doc.as_str()]).expect("config loads");
    let state = run_async(config, base_registry()).await;
    let run = state.to_run_state();
    assert_eq!(run.steps.len(), 40);
    assert!(run
        .steps
        .values()
        .all(|s| s.state == StepStateKind::Succeeded));
}
