// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kahn-style dynamic scheduler: steps become ready as
//! their parents complete, and run on a bounded pool of worker tasks.

use crate::state::LiveRunState;
use crate::step_task::{run_step, StepOutcome};
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::{mpsc, Semaphore};
use weft_config::AnalyzedConfig;
use weft_connectors::ConnectorRegistry;
use weft_core::{IdGen, OnError, RunId, UuidIdGen, Value};

/// How long the scheduler's main loop waits for the next completion before
/// looping again to re-check for newly-ready work. Bounded so the loop
/// never blocks indefinitely even if a completion is somehow dropped.
const COMPLETION_WAIT: Duration = Duration::from_millis(100);

struct Outcome {
    step: String,
    result: Result<StepOutcome, crate::error::RuntimeError>,
}

/// Executes one run of an [`AnalyzedConfig`] to completion and returns the
/// final state. Async; embedders without their own runtime should use
/// [`Runner::run`] instead.
pub async fn run_async(
    config: AnalyzedConfig,
    registry: ConnectorRegistry,
) -> Arc<LiveRunState> {
    run_async_with_id_gen(config, registry, &UuidIdGen).await
}

pub async fn run_async_with_id_gen(
    config: AnalyzedConfig,
    registry: ConnectorRegistry,
    id_gen: &dyn IdGen,
) -> Arc<LiveRunState> {
    run_inner(config, registry, id_gen, None).await
}

/// Shared implementation behind [`run_async_with_id_gen`] and
/// [`Runner::spawn`]. `ready` is notified with the live state as soon as
/// it exists, before the scheduling loop starts — callers that need to
/// observe a run in flight (e.g. the status view) have no other way to
/// get a handle before completion.
async fn run_inner(
    config: AnalyzedConfig,
    registry: ConnectorRegistry,
    id_gen: &dyn IdGen,
    ready_tx: Option<std::sync::mpsc::Sender<Arc<LiveRunState>>>,
) -> Arc<LiveRunState> {
    let AnalyzedConfig {
        dag,
        steps,
        sources,
        runner,
        ..
    } = config;

    let initial_sources: IndexMap<String, Value> = sources
        .into_iter()
        .map(|(name, decl)| (name, Value::from(&decl.configuration)))
        .collect();

    let run_id = RunId::new(id_gen.next());
    let state = Arc::new(LiveRunState::new(
        run_id,
        SystemTime::now(),
        steps.keys().cloned(),
        initial_sources,
    ));
    if let Some(tx) = ready_tx {
        let _ = tx.send(Arc::clone(&state));
    }

    let steps = Arc::new(steps);
    let registry = Arc::new(registry);
    let semaphore = Arc::new(Semaphore::new(runner.max_workers));
    let (tx, mut rx) = mpsc::channel::<Outcome>(steps.len().max(1));

    let mut in_degree: HashMap<String, usize> = dag.in_degree.clone();
    let mut ready: VecDeque<String> = in_degree
        .iter()
        .filter(|(_, d)| **d == 0)
        .map(|(name, _)| name.clone())
        .collect();
    let mut remaining = steps.len();
    let mut in_flight = 0usize;
    // Accumulates every step name already counted as skipped, across all
    // failing ancestors — two failing steps can share a descendant, and
    // `remaining`/`mark_skipped` must only account for it once.
    let mut already_skipped: BTreeSet<String> = BTreeSet::new();

    while remaining > 0 {
        while !state.is_aborted() {
            let Some(name) = ready.pop_front() else {
                break;
            };
            in_flight += 1;
            spawn_step(
                name,
                steps.clone(),
                registry.clone(),
                state.clone(),
                semaphore.clone(),
                tx.clone(),
            );
        }

        if in_flight == 0 {
            // Nothing running: either the run was aborted, or every
            // remaining step has already been resolved (e.g. skipped).
            break;
        }

        let outcome = match tokio::time::timeout(COMPLETION_WAIT, rx.recv()).await {
            Ok(Some(outcome)) => outcome,
            Ok(None) => break,
            Err(_elapsed) => continue,
        };
        in_flight -= 1;
        remaining -= 1;

        let NormalizedStepLookup { source_name, .. } = lookup(&steps, &outcome.step);
        let on_error = effective_on_error(&steps, &outcome.step, runner.on_error);

        match outcome.result {
            Ok(outcome_value) => {
                state.mark_succeeded(
                    &outcome.step,
                    outcome_value.outputs,
                    source_name.as_deref(),
                    outcome_value.notes,
                );
                for child in dag.dependents.get(&outcome.step).into_iter().flatten() {
                    if let Some(d) = in_degree.get_mut(child) {
                        *d -= 1;
                        if *d == 0 {
                            ready.push_back(child.clone());
                        }
                    }
                }
            }
            Err(err) => {
                let notes = err.notes();
                state.mark_failed(&outcome.step, err.to_string(), notes);
                match on_error {
                    OnError::Fail => {
                        state.set_aborted();
                    }
                    OnError::Skip => {
                        let skipped = skip_descendants(&dag.dependents, &outcome.step);
                        let new_skipped: BTreeSet<String> = skipped
                            .difference(&already_skipped)
                            .cloned()
                            .collect();
                        remaining = remaining.saturating_sub(new_skipped.len());
                        for name in &new_skipped {
                            state.mark_skipped(name);
                            in_degree.remove(name);
                        }
                        already_skipped.extend(new_skipped.iter().cloned());
                        for child in dag.dependents.get(&outcome.step).into_iter().flatten() {
                            if let Some(d) = in_degree.get_mut(child) {
                                *d -= 1;
                                if *d == 0 && !skipped.contains(child) {
                                    ready.push_back(child.clone());
                                }
                            }
                        }
                    }
                    OnError::Continue => {
                        for child in dag.dependents.get(&outcome.step).into_iter().flatten() {
                            if let Some(d) = in_degree.get_mut(child) {
                                *d -= 1;
                                if *d == 0 {
                                    ready.push_back(child.clone());
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    if state.is_aborted() {
        for name in steps.keys() {
            state.mark_skipped(name);
        }
    }
    state.finish();
    state
}

struct NormalizedStepLookup {
    source_name: Option<String>,
}

fn lookup(
    steps: &HashMap<String, weft_config::NormalizedStep>,
    name: &str,
) -> NormalizedStepLookup {
    NormalizedStepLookup {
        source_name: steps.get(name).and_then(|s| s.source_name.clone()),
    }
}

fn effective_on_error(
    steps: &HashMap<String, weft_config::NormalizedStep>,
    name: &str,
    run_default: OnError,
) -> OnError {
    steps
        .get(name)
        .map(|s| s.decl.on_error(run_default))
        .unwrap_or(run_default)
}

/// All transitive dependents of `root`, not including `root` itself.
fn skip_descendants(
    dependents: &HashMap<String, BTreeSet<String>>,
    root: &str,
) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let mut stack = vec![root.to_string()];
    while let Some(node) = stack.pop() {
        for child in dependents.get(&node).into_iter().flatten() {
            if out.insert(child.clone()) {
                stack.push(child.clone());
            }
        }
    }
    out
}

fn spawn_step(
    name: String,
    steps: Arc<HashMap<String, weft_config::NormalizedStep>>,
    registry: Arc<ConnectorRegistry>,
    state: Arc<LiveRunState>,
    semaphore: Arc<Semaphore>,
    tx: mpsc::Sender<Outcome>,
) {
    tokio::spawn(async move {
        let permit = semaphore
            .acquire_owned()
            .await
            .expect("semaphore is never closed while workers are running");
        state.mark_running(&name);
        let snapshot = state.snapshot();
        let step = steps
            .get(&name)
            .expect("scheduler only spawns steps present in the analyzed config");
        let result = run_step(step, &registry, &snapshot).await;
        drop(permit);
        let _ = tx
            .send(Outcome {
                step: name,
                result,
            })
            .await;
    });
}

/// The synchronous facade embedders call: builds its own Tokio runtime so
/// callers don't need one of their own, then drives a run to completion.
pub struct Runner {
    config: AnalyzedConfig,
    registry: ConnectorRegistry,
}

impl Runner {
    pub fn new(config: AnalyzedConfig, registry: ConnectorRegistry) -> Self {
        Self { config, registry }
    }

    pub fn run(self) -> Arc<LiveRunState> {
        let runtime = tokio::runtime::Runtime::new()
            .expect("failed to start the embedded Tokio runtime for this run");
        runtime.block_on(run_async(self.config, self.registry))
    }

    /// Start the run on a background OS thread and return its live state
    /// handle as soon as it exists, without waiting for the run to finish.
    /// A courtesy wrapper, not the core entry point — most embedders should
    /// call [`Runner::run`] and block.
    pub fn spawn(self) -> (Arc<LiveRunState>, std::thread::JoinHandle<()>) {
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let join = std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new()
                .expect("failed to start the embedded Tokio runtime for this run");
            runtime.block_on(run_inner(
                self.config,
                self.registry,
                &UuidIdGen,
                Some(ready_tx),
            ));
        });
        let state = ready_rx
            .recv()
            .expect("run thread reports its state handle before completing");
        (state, join)
    }
}
