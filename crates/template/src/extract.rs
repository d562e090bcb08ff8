// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output Extractor: turns a connector result into the named
//! outputs a step declares, via either a raw passthrough or a JSONPath pull.

use crate::error::OutputError;
use indexmap::IndexMap;
use weft_core::{ConnectorResult, OutputKind, OutputSpec, Value};

/// Extract every declared output from `result`. Specs are processed in
/// declaration order; a duplicate `name` silently overwrites the earlier
/// value, matching declaration-order-wins semantics elsewhere in the config.
pub fn extract(
    result: &ConnectorResult,
    specs: &[OutputSpec],
) -> Result<IndexMap<String, Value>, OutputError> {
    let mut out = IndexMap::with_capacity(specs.len());
    for spec in specs {
        let value = match spec.kind {
            OutputKind::Raw => Value::from(&result.data),
            OutputKind::Path => extract_path(result, spec)?,
        };
        out.insert(spec.name.clone(), value);
    }
    Ok(out)
}

fn extract_path(result: &ConnectorResult, spec: &OutputSpec) -> Result<Value, OutputError> {
    let path = spec.value.as_deref().unwrap_or("$");
    let matches = jsonpath_lib::select(&result.data, path).map_err(|e| OutputError::InvalidPath {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    match matches.into_iter().next() {
        Some(found) => Ok(Value::from(found)),
        None => Err(OutputError::MissingPathValue {
            name: spec.name.clone(),
            path: path.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use weft_core::Status;

    fn result_with(data: serde_json::Value) -> ConnectorResult {
        ConnectorResult {
            status: Status {
                success: true,
                code: 0,
                notes: Vec::new(),
            },
            data,
            meta: Default::default(),
        }
    }

    #[test]
    fn raw_output_copies_entire_data() {
        let result = result_with(json!({"a": 1, "b": "x"}));
        let specs = vec![OutputSpec {
            name: "out".to_string(),
            kind: OutputKind::Raw,
            value: None,
        }];
        let outputs = extract(&result, &specs).unwrap();
        assert_eq!(outputs["out"], Value::from(&json!({"a": 1, "b": "x"})));
    }

    #[test]
    fn path_output_pulls_nested_value() {
        let result = result_with(json!({"a": {"b": 42}}));
        let specs = vec![OutputSpec {
            name: "b".to_string(),
            kind: OutputKind::Path,
            value: Some("$.a.b".to_string()),
        }];
        let outputs = extract(&result, &specs).unwrap();
        assert_eq!(outputs["b"], Value::Int(42));
    }

    #[test]
    fn missing_path_is_an_error() {
        let result = result_with(json!({"a": 1}));
        let specs = vec![OutputSpec {
            name: "missing".to_string(),
            kind: OutputKind::Path,
            value: Some("$.nope".to_string()),
        }];
        assert!(matches!(
            extract(&result, &specs),
            Err(OutputError::MissingPathValue { .. })
        ));
    }

    #[test]
    fn duplicate_names_silently_overwrite_in_declaration_order() {
        let result = result_with(json!({"a": 1, "b": 2}));
        let specs = vec![
            OutputSpec {
                name: "out".to_string(),
                kind: OutputKind::Path,
                value: Some("$.a".to_string()),
            },
            OutputSpec {
                name: "out".to_string(),
                kind: OutputKind::Path,
                value: Some("$.b".to_string()),
            },
        ];
        let outputs = extract(&result, &specs).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs["out"], Value::Int(2));
    }
}
