// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single locked run state the scheduler and status view share.
//!
//! Per the run's Design Notes, there is exactly one non-reentrant lock per
//! run: callers take it, copy out what they need (a snapshot or a mutation),
//! and drop it before doing any rendering or I/O.

use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::time::SystemTime;
use weft_core::{RunId, StepState, StepStateKind, Value};

use crate::store::{FlowsStore, SourcesStore};

/// A point-in-time copy of everything a template render or a status
/// response needs, taken under the lock and used lock-free afterward.
#[derive(Debug, Clone)]
pub struct RunSnapshot {
    pub flows: Value,
    pub sources: Value,
}

struct Inner {
    run_id: RunId,
    started_at: SystemTime,
    ended_at: Option<SystemTime>,
    steps: BTreeMap<String, StepState>,
    flows: FlowsStore,
    sources: SourcesStore,
    aborted: bool,
}

/// Shared, lockable run state. Cheap to clone — wraps an `Arc` internally
/// via the caller holding it behind an `Arc<LiveRunState>`.
pub struct LiveRunState {
    inner: Mutex<Inner>,
}

impl LiveRunState {
    pub fn new(
        run_id: RunId,
        started_at: SystemTime,
        step_names: impl IntoIterator<Item = String>,
        initial_sources: IndexMap<String, Value>,
    ) -> Self {
        let steps = step_names
            .into_iter()
            .map(|name| (name, StepState::pending()))
            .collect();
        Self {
            inner: Mutex::new(Inner {
                run_id,
                started_at,
                ended_at: None,
                steps,
                flows: FlowsStore::new(),
                sources: SourcesStore::new(initial_sources),
                aborted: false,
            }),
        }
    }

    pub fn snapshot(&self) -> RunSnapshot {
        let inner = self.inner.lock();
        RunSnapshot {
            flows: inner.flows.as_value(),
            sources: inner.sources.as_value(),
        }
    }

    pub fn mark_running(&self, step: &str) {
        let mut inner = self.inner.lock();
        if let Some(state) = inner.steps.get_mut(step) {
            state.state = StepStateKind::Running;
            state.started_at = Some(std::time::SystemTime::now());
        }
    }

    pub fn mark_succeeded(
        &self,
        step: &str,
        outputs: IndexMap<String, Value>,
        source_name: Option<&str>,
        notes: Vec<String>,
    ) {
        let mut inner = self.inner.lock();
        let output_names: Vec<String> = outputs.keys().cloned().collect();
        if let Some(source_name) = source_name {
            inner.sources.merge_outputs(source_name, &outputs);
        }
        inner.flows.record(step, outputs);
        if let Some(state) = inner.steps.get_mut(step) {
            state.state = StepStateKind::Succeeded;
            state.ended_at = Some(std::time::SystemTime::now());
            state.output_names = output_names;
            state.notes = notes;
        }
    }

    pub fn mark_failed(&self, step: &str, error: impl Into<String>, notes: Vec<String>) {
        let mut inner = self.inner.lock();
        if let Some(state) = inner.steps.get_mut(step) {
            state.state = StepStateKind::Failed;
            state.ended_at = Some(std::time::SystemTime::now());
            state.error = Some(error.into());
            state.notes = notes;
        }
    }

    pub fn mark_skipped(&self, step: &str) {
        let mut inner = self.inner.lock();
        if let Some(state) = inner.steps.get_mut(step) {
            if !state.state.is_terminal() {
                state.state = StepStateKind::Skipped;
                state.ended_at = Some(std::time::SystemTime::now());
            }
        }
    }

    pub fn is_terminal(&self, step: &str) -> bool {
        let inner = self.inner.lock();
        inner
            .steps
            .get(step)
            .map(|s| s.state.is_terminal())
            .unwrap_or(true)
    }

    pub fn set_aborted(&self) {
        self.inner.lock().aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.inner.lock().aborted
    }

    pub fn finish(&self) {
        self.inner.lock().ended_at = Some(std::time::SystemTime::now());
    }

    /// Render the plain `RunState` DTO used by the status view.
    pub fn to_run_state(&self) -> weft_core::RunState {
        let inner = self.inner.lock();
        weft_core::RunState {
            run_id: inner.run_id.clone(),
            started_at: inner.started_at,
            ended_at: inner.ended_at,
            steps: inner.steps.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> LiveRunState {
        LiveRunState::new(
            RunId::new("r1"),
            SystemTime::now(),
            vec!["a".to_string(), "b".to_string()],
            IndexMap::new(),
        )
    }

    #[test]
    fn new_steps_start_pending() {
        let s = state();
        let rs = s.to_run_state();
        assert_eq!(rs.steps["a"].state, StepStateKind::Pending);
    }

    #[test]
    fn succeeded_step_appears_in_flows_snapshot() {
        let s = state();
        let mut outputs = IndexMap::new();
        outputs.insert("x".to_string(), Value::Int(1));
        s.mark_succeeded("a", outputs, None, vec!["ok".to_string()]);
        let snap = s.snapshot();
        assert_eq!(
            snap.flows.get_member("a").and_then(|v| v.get_member("x")),
            Some(&Value::Int(1))
        );
        assert_eq!(s.to_run_state().steps["a"].state, StepStateKind::Succeeded);
        assert_eq!(s.to_run_state().steps["a"].notes, vec!["ok".to_string()]);
    }

    #[test]
    fn skip_does_not_override_terminal_state() {
        let s = state();
        s.mark_failed("a", "boom", vec![]);
        s.mark_skipped("a");
        assert_eq!(s.to_run_state().steps["a"].state, StepStateKind::Failed);
    }

    #[test]
    fn successful_step_against_named_source_merges_into_sources() {
        let s = state();
        let mut outputs = IndexMap::new();
        outputs.insert("token".to_string(), Value::String("abc".to_string()));
        s.mark_succeeded("a", outputs, Some("api"), vec![]);
        let snap = s.snapshot();
        assert_eq!(
            snap.sources.get_member("api").and_then(|v| v.get_member("token")),
            Some(&Value::String("abc".to_string()))
        );
    }
}
