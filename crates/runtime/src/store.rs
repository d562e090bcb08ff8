// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `flows` and `sources` — the two namespaces a running template can see.
//!
//! Both are plain maps guarded by the run's single lock (see
//! [`crate::state::LiveRunState`]); there is no per-entry locking.

use indexmap::IndexMap;
use weft_core::Value;

/// Per-step output maps, keyed by step name — `flows.<step>.<output>`.
#[derive(Debug, Clone, Default)]
pub struct FlowsStore {
    steps: IndexMap<String, Value>,
}

impl FlowsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: &str, outputs: IndexMap<String, Value>) {
        self.steps.insert(step.to_string(), Value::Map(outputs));
    }

    pub fn as_value(&self) -> Value {
        Value::Map(self.steps.clone())
    }
}

/// Named-source configuration, updated in place when a step run against a
/// named source succeeds. Merge semantics: a successful step's outputs are
/// shallow-overwritten onto the source's stored configuration, keyed by
/// output name — later runs of other steps against the same source see the
/// update, matching a single mutable "connection" per named source.
#[derive(Debug, Clone, Default)]
pub struct SourcesStore {
    sources: IndexMap<String, Value>,
}

impl SourcesStore {
    pub fn new(initial: IndexMap<String, Value>) -> Self {
        Self { sources: initial }
    }

    pub fn merge_outputs(&mut self, source_name: &str, outputs: &IndexMap<String, Value>) {
        let entry = self
            .sources
            .entry(source_name.to_string())
            .or_insert_with(|| Value::Map(IndexMap::new()));
        let Value::Map(map) = entry else {
            *entry = Value::Map(IndexMap::new());
            return self.merge_outputs(source_name, outputs);
        };
        for (k, v) in outputs {
            map.insert(k.clone(), v.clone());
        }
    }

    pub fn as_value(&self) -> Value {
        Value::Map(self.sources.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flows_store_records_step_outputs_under_step_name() {
        let mut flows = FlowsStore::new();
        let mut outputs = IndexMap::new();
        outputs.insert("status".to_string(), Value::Int(200));
        flows.record("fetch", outputs);

        let value = flows.as_value();
        assert_eq!(
            value.get_member("fetch").and_then(|v| v.get_member("status")),
            Some(&Value::Int(200))
        );
    }

    #[test]
    fn sources_store_shallow_overwrites_existing_keys() {
        let mut initial = IndexMap::new();
        let mut base = IndexMap::new();
        base.insert("token".to_string(), Value::String("old".to_string()));
        base.insert("url".to_string(), Value::String("kept".to_string()));
        initial.insert("api".to_string(), Value::Map(base));
        let mut sources = SourcesStore::new(initial);

        let mut outputs = IndexMap::new();
        outputs.insert("token".to_string(), Value::String("new".to_string()));
        sources.merge_outputs("api", &outputs);

        let value = sources.as_value();
        let api = value.get_member("api").unwrap();
        assert_eq!(api.get_member("token"), Some(&Value::String("new".to_string())));
        assert_eq!(api.get_member("url"), Some(&Value::String("kept".to_string())));
    }

    #[test]
    fn sources_store_creates_entry_for_unseen_source() {
        let mut sources = SourcesStore::new(IndexMap::new());
        let mut outputs = IndexMap::new();
        outputs.insert("a".to_string(), Value::Int(1));
        sources.merge_outputs("new_source", &outputs);
        assert!(sources.as_value().get_member("new_source").is_some());
    }
}
