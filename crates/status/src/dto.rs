// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire types for the two read-only status endpoints.

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::SystemTime;
use weft_core::{RunState, StepStateKind};

/// `steps[name]` in the `/status` response.
#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub state: StepStateKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<SystemTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<SystemTime>,
    pub notes: Vec<String>,
    pub outputs: Vec<String>,
}

/// Body of `GET /status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub run_id: String,
    pub started_at: SystemTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<SystemTime>,
    pub total_steps: usize,
    pub completed_steps: usize,
    /// First entry of `running_steps`, kept for compatibility with older
    /// clients that only understood a single "current" step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
    pub running_steps: Vec<String>,
    pub running_count: usize,
    pub steps: BTreeMap<String, StepView>,
}

impl From<&RunState> for StatusResponse {
    fn from(run: &RunState) -> Self {
        let running_steps: Vec<String> =
            run.running_steps().into_iter().map(str::to_string).collect();
        let steps = run
            .steps
            .iter()
            .map(|(name, s)| {
                (
                    name.clone(),
                    StepView {
                        state: s.state,
                        started_at: s.started_at,
                        ended_at: s.ended_at,
                        notes: s.notes.clone(),
                        outputs: s.output_names.clone(),
                    },
                )
            })
            .collect();

        Self {
            run_id: run.run_id.clone(),
            started_at: run.started_at,
            ended_at: run.ended_at,
            total_steps: run.steps.len(),
            completed_steps: run.completed_count(),
            current_step: running_steps.first().cloned(),
            running_count: running_steps.len(),
            running_steps,
            steps,
        }
    }
}
