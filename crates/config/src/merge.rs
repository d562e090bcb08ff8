// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deep-merge for layered config documents.
//!
//! Mappings recurse key by key; sequences and scalars are replaced wholesale
//! by the later document. This lets a base config, a per-environment
//! overlay, and a secret overlay compose additively for nested settings
//! while still letting an overlay fully swap out a list.

use serde_json::Value;

/// Merge `override_` onto `base`, returning the combined document.
///
/// `base` is consumed; this is the hot path for folding N layered
/// documents with `fold`.
pub fn deep_merge(base: Value, override_: Value) -> Value {
    match (base, override_) {
        (Value::Object(mut base_map), Value::Object(override_map)) => {
            for (key, override_value) in override_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, override_value),
                    None => override_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        // Sequences replace wholesale — no element-wise merge.
        // Scalars (and any other mismatched shape) also replace wholesale.
        (_, override_) => override_,
    }
}

/// Fold an ordered list of documents into one, later documents winning.
pub fn merge_all(docs: impl IntoIterator<Item = Value>) -> Value {
    docs.into_iter()
        .fold(Value::Object(Default::default()), deep_merge)
}
