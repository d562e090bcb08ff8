// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dependency Analyzer: derive the DAG from explicit and implicit
//! (template-derived) step dependencies, validate it, detect cycles.

use crate::loader::{NormalizedConfig, NormalizedStep, RunnerSettings};
use serde_json::Value as Json;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;
use weft_core::{SourceDecl, ValidationError, ValidationIssue};

/// Matches the literal token `flows.` followed by an identifier — used to
/// scrape implicit dependencies out of template strings without needing a
/// full template parse at this stage.
#[allow(clippy::expect_used)]
static FLOWS_REF: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"flows\.([A-Za-z_][A-Za-z0-9_]*)").expect("constant regex pattern is valid")
});

fn scan_flows_refs(value: &Json, out: &mut BTreeSet<String>) {
    match value {
        Json::String(s) => {
            for cap in FLOWS_REF.captures_iter(s) {
                out.insert(cap[1].to_string());
            }
        }
        Json::Array(items) => items.iter().for_each(|v| scan_flows_refs(v, out)),
        Json::Object(map) => map.values().for_each(|v| scan_flows_refs(v, out)),
        _ => {}
    }
}

/// The derived dependency graph: parent sets, child sets, and initial
/// in-degree, keyed by step name.
#[derive(Debug, Clone, Default)]
pub struct Dag {
    pub deps: HashMap<String, BTreeSet<String>>,
    pub dependents: HashMap<String, BTreeSet<String>>,
    pub in_degree: HashMap<String, usize>,
}

/// Validated config plus its derived DAG, ready for the Scheduler.
#[derive(Debug)]
pub struct AnalyzedConfig {
    pub dag: Dag,
    pub steps: HashMap<String, NormalizedStep>,
    pub sources: HashMap<String, SourceDecl>,
    pub runner: RunnerSettings,
    /// Step names in declared order — used for deterministic display only,
    /// never to imply an execution ordering guarantee.
    pub order: Vec<String>,
}

/// Derive the DAG from a normalized config and validate it, aggregating
/// every issue found rather than stopping at the first.
pub fn analyze(config: NormalizedConfig) -> Result<AnalyzedConfig, ValidationError> {
    let mut issues = Vec::new();
    let mut order = Vec::with_capacity(config.steps.len());
    let mut steps: HashMap<String, NormalizedStep> = HashMap::new();
    let mut seen_names: BTreeSet<String> = BTreeSet::new();

    for step in config.steps {
        let name = step.decl.name.clone();
        if !seen_names.insert(name.clone()) {
            issues.push(ValidationIssue::DuplicateStepName { name: name.clone() });
            continue;
        }
        order.push(name.clone());
        steps.insert(name, step);
    }

    let mut deps: HashMap<String, BTreeSet<String>> = HashMap::new();
    for (name, step) in &steps {
        let mut parents: BTreeSet<String> = step.decl.depends_on.clone();

        for missing in parents.iter().filter(|p| !steps.contains_key(*p)) {
            issues.push(ValidationIssue::MissingDependsOn {
                step: name.clone(),
                missing: missing.clone(),
            });
        }

        let mut implicit = BTreeSet::new();
        scan_flows_refs(&step.resolved_configuration, &mut implicit);
        scan_flows_refs(&step.decl.input, &mut implicit);
        for referenced in &implicit {
            if !steps.contains_key(referenced) {
                issues.push(ValidationIssue::MissingTemplateRef {
                    step: name.clone(),
                    missing: referenced.clone(),
                });
            }
        }
        parents.extend(implicit);
        // Drop dangling refs from the graph itself; they're already
        // reported above and would otherwise corrupt in-degree counts.
        parents.retain(|p| steps.contains_key(p));
        deps.insert(name.clone(), parents);
    }

    if !issues.is_empty() {
        tracing::warn!(count = issues.len(), "dependency validation found issues");
        return Err(ValidationError::new(issues));
    }

    let mut dependents: HashMap<String, BTreeSet<String>> =
        steps.keys().map(|k| (k.clone(), BTreeSet::new())).collect();
    for (child, parents) in &deps {
        for parent in parents {
            dependents
                .entry(parent.clone())
                .or_default()
                .insert(child.clone());
        }
    }

    let in_degree: HashMap<String, usize> =
        deps.iter().map(|(k, v)| (k.clone(), v.len())).collect();

    let cycles = find_cycles(&deps);
    if !cycles.is_empty() {
        tracing::warn!(count = cycles.len(), "dependency cycle detected");
        let issues = cycles
            .into_iter()
            .map(|members| ValidationIssue::Cycle { members })
            .collect();
        return Err(ValidationError::new(issues));
    }

    Ok(AnalyzedConfig {
        dag: Dag {
            deps,
            dependents,
            in_degree,
        },
        steps,
        sources: config.sources,
        runner: config.runner,
        order,
    })
}

/// Iterative Tarjan SCC, reporting every component of size > 1 and every
/// self-loop (a size-1 component whose sole member depends on itself).
#[allow(clippy::expect_used)]
fn find_cycles(deps: &HashMap<String, BTreeSet<String>>) -> Vec<Vec<String>> {
    struct TarjanState {
        index: HashMap<String, usize>,
        low_link: HashMap<String, usize>,
        on_stack: HashMap<String, bool>,
        stack: Vec<String>,
        next_index: usize,
        sccs: Vec<Vec<String>>,
    }

    let mut state = TarjanState {
        index: HashMap::new(),
        low_link: HashMap::new(),
        on_stack: HashMap::new(),
        stack: Vec::new(),
        next_index: 0,
        sccs: Vec::new(),
    };

    // Edges point child -> parent in `deps`; cycles are direction-agnostic
    // for detection purposes, so we walk `deps` directly.
    enum Frame {
        Enter(String),
        Exit(String),
    }

    for start in deps.keys() {
        if state.index.contains_key(start) {
            continue;
        }
        let mut work = vec![Frame::Enter(start.clone())];
        while let Some(frame) = work.pop() {
            match frame {
                Frame::Enter(node) => {
                    if state.index.contains_key(&node) {
                        continue;
                    }
                    state.index.insert(node.clone(), state.next_index);
                    state.low_link.insert(node.clone(), state.next_index);
                    state.next_index += 1;
                    state.stack.push(node.clone());
                    state.on_stack.insert(node.clone(), true);

                    work.push(Frame::Exit(node.clone()));
                    if let Some(neighbors) = deps.get(&node) {
                        for neighbor in neighbors {
                            if !state.index.contains_key(neighbor) {
                                work.push(Frame::Enter(neighbor.clone()));
                            } else if *state.on_stack.get(neighbor).unwrap_or(&false) {
                                let node_low = state.low_link[&node];
                                let neighbor_idx = state.index[neighbor];
                                state
                                    .low_link
                                    .insert(node.clone(), node_low.min(neighbor_idx));
                            }
                        }
                    }
                }
                Frame::Exit(node) => {
                    if let Some(neighbors) = deps.get(&node) {
                        for neighbor in neighbors {
                            if *state.on_stack.get(neighbor).unwrap_or(&false) {
                                let node_low = state.low_link[&node];
                                let neighbor_low = state.low_link[neighbor];
                                state
                                    .low_link
                                    .insert(node.clone(), node_low.min(neighbor_low));
                            }
                        }
                    }
                    if state.low_link[&node] == state.index[&node] {
                        let mut component = Vec::new();
                        loop {
                            let member = state
                                .stack
                                .pop()
                                .expect("stack non-empty while popping SCC");
                            state.on_stack.insert(member.clone(), false);
                            let is_root = member == node;
                            component.push(member);
                            if is_root {
                                break;
                            }
                        }
                        let is_cycle = component.len() > 1
                            || deps
                                .get(&component[0])
                                .is_some_and(|p| p.contains(&component[0]));
                        if is_cycle {
                            component.sort();
                            state.sccs.push(component);
                        }
                    }
                }
            }
        }
    }

    state.sccs
}
