// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fixed filter set available after a `|` in a template expression.
//! `default` is handled specially in [`crate::eval`] since it must observe
//! an `Undefined` error rather than a value; every other filter lives here.

use crate::error::TemplateError;
use weft_core::Value;

pub fn apply(name: &str, base: Value, args: &[Value]) -> Result<Value, TemplateError> {
    match name {
        "tojson" => Ok(Value::String(base.to_json_string())),
        "upper" => string_filter(name, &base, str::to_uppercase),
        "lower" => string_filter(name, &base, str::to_lowercase),
        "trim" => string_filter(name, &base, |s| s.trim().to_string()),
        "length" => length(name, &base),
        "join" => join(name, &base, args),
        "replace" => replace(name, &base, args),
        other => Err(TemplateError::UnknownFilter {
            name: other.to_string(),
        }),
    }
}

fn string_filter(
    name: &str,
    base: &Value,
    f: impl FnOnce(&str) -> String,
) -> Result<Value, TemplateError> {
    match base {
        Value::String(s) => Ok(Value::String(f(s))),
        other => Err(TemplateError::FilterTypeMismatch {
            name: name.to_string(),
            value: other.display_string(),
        }),
    }
}

fn length(name: &str, base: &Value) -> Result<Value, TemplateError> {
    let n = match base {
        Value::String(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Map(map) => map.len(),
        other => {
            return Err(TemplateError::FilterTypeMismatch {
                name: name.to_string(),
                value: other.display_string(),
            })
        }
    };
    Ok(Value::Int(n as i64))
}

fn join(name: &str, base: &Value, args: &[Value]) -> Result<Value, TemplateError> {
    let items = match base {
        Value::List(items) => items,
        other => {
            return Err(TemplateError::FilterTypeMismatch {
                name: name.to_string(),
                value: other.display_string(),
            })
        }
    };
    let sep = match args.first() {
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            return Err(TemplateError::FilterTypeMismatch {
                name: name.to_string(),
                value: other.display_string(),
            })
        }
        None => {
            return Err(TemplateError::FilterArity {
                name: name.to_string(),
                expected: 1,
                got: 0,
            })
        }
    };
    let joined = items
        .iter()
        .map(Value::display_string)
        .collect::<Vec<_>>()
        .join(sep);
    Ok(Value::String(joined))
}

fn replace(name: &str, base: &Value, args: &[Value]) -> Result<Value, TemplateError> {
    let s = match base {
        Value::String(s) => s,
        other => {
            return Err(TemplateError::FilterTypeMismatch {
                name: name.to_string(),
                value: other.display_string(),
            })
        }
    };
    if args.len() != 2 {
        return Err(TemplateError::FilterArity {
            name: name.to_string(),
            expected: 2,
            got: args.len(),
        });
    }
    let (from, to) = (&args[0], &args[1]);
    match (from, to) {
        (Value::String(from), Value::String(to)) => Ok(Value::String(s.replace(from, to))),
        _ => Err(TemplateError::FilterTypeMismatch {
            name: name.to_string(),
            value: base.display_string(),
        }),
    }
}
