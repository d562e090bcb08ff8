// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-step and per-run state snapshots.
//!
//! These are plain serializable DTOs. The live, lock-guarded, mutable
//! version used during a run (with in-degree tracking, the ready queue,
//! and the `error_occurred` flag) lives in `weft-runtime`, which builds
//! these snapshots on demand for the status view.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::SystemTime;

/// The five states a step can be in. Terminal states
/// (`Succeeded`/`Failed`/`Skipped`) are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStateKind {
    Pending,
    Running,
    Succeeded,
    Failed,
    Skipped,
}

impl StepStateKind {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            StepStateKind::Succeeded | StepStateKind::Failed | StepStateKind::Skipped
        )
    }
}

/// Per-step runtime record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepState {
    pub state: StepStateKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<SystemTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<SystemTime>,
    /// Set iff `state == Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Output keys declared by this step, populated once it succeeds.
    #[serde(default)]
    pub output_names: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl StepState {
    pub fn pending() -> Self {
        Self {
            state: StepStateKind::Pending,
            started_at: None,
            ended_at: None,
            error: None,
            output_names: Vec::new(),
            notes: Vec::new(),
        }
    }
}

/// Run-level record: metadata plus every step's current state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub run_id: String,
    pub started_at: SystemTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<SystemTime>,
    pub steps: BTreeMap<String, StepState>,
}

impl RunState {
    pub fn completed_count(&self) -> usize {
        self.steps
            .values()
            .filter(|s| s.state.is_terminal())
            .count()
    }

    pub fn running_steps(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|(_, s)| s.state == StepStateKind::Running)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_are_absorbing_by_classification() {
        assert!(StepStateKind::Succeeded.is_terminal());
        assert!(StepStateKind::Failed.is_terminal());
        assert!(StepStateKind::Skipped.is_terminal());
        assert!(!StepStateKind::Running.is_terminal());
        assert!(!StepStateKind::Pending.is_terminal());
    }

    #[test]
    fn completed_count_only_counts_terminal_steps() {
        let mut steps = BTreeMap::new();
        steps.insert("a".to_string(), {
            let mut s = StepState::pending();
            s.state = StepStateKind::Succeeded;
            s
        });
        steps.insert("b".to_string(), StepState::pending());
        let run = RunState {
            run_id: "r1".into(),
            started_at: SystemTime::now(),
            ended_at: None,
            steps,
        };
        assert_eq!(run.completed_count(), 1);
    }
}
