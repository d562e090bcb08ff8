// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Walks a JSON value tree, rewriting string leaves that contain `{{ }}`
//! markers while leaving every other leaf untouched.

use crate::error::TemplateError;
use crate::eval::{eval, Context};
use crate::parser::parse;
use serde_json::Value as Json;
use weft_core::Value;

struct Marker {
    start: usize,
    end: usize,
    inner: String,
}

/// Locate every `{{ ... }}` span in `s`, tracking quote state inside the
/// expression so a `}}` inside a string literal doesn't close the marker
/// early.
fn find_markers(s: &str) -> Vec<Marker> {
    let chars: Vec<char> = s.chars().collect();
    let mut markers = Vec::new();
    let mut i = 0usize;

    while i + 1 < chars.len() {
        if chars[i] == '{' && chars[i + 1] == '{' {
            let start = i;
            let mut j = i + 2;
            let mut quote: Option<char> = None;
            let mut end = None;
            while j < chars.len() {
                match quote {
                    Some(q) => {
                        if chars[j] == '\\' && j + 1 < chars.len() {
                            j += 2;
                            continue;
                        }
                        if chars[j] == q {
                            quote = None;
                        }
                    }
                    None => {
                        if chars[j] == '\'' || chars[j] == '"' {
                            quote = Some(chars[j]);
                        } else if chars[j] == '}' && chars.get(j + 1) == Some(&'}') {
                            end = Some(j);
                            break;
                        }
                    }
                }
                j += 1;
            }
            if let Some(end) = end {
                let inner: String = chars[(start + 2)..end].iter().collect();
                markers.push(Marker {
                    start,
                    end: end + 2,
                    inner: inner.trim().to_string(),
                });
                i = end + 2;
                continue;
            }
        }
        i += 1;
    }

    markers
}

fn render_string(s: &str, ctx: &Context<'_>) -> Result<Json, TemplateError> {
    let chars: Vec<char> = s.chars().collect();
    let markers = find_markers(s);
    if markers.is_empty() {
        return Ok(Json::String(s.to_string()));
    }

    if markers.len() == 1 {
        let m = &markers[0];
        let before: String = chars[..m.start].iter().collect();
        let after: String = chars[m.end..].iter().collect();
        if before.trim().is_empty() && after.trim().is_empty() {
            let expr = parse(&m.inner)?;
            let value = eval(&expr, ctx)?;
            return Ok(Json::from(value));
        }
    }

    let mut out = String::new();
    let mut cursor = 0usize;
    for m in &markers {
        out.extend(&chars[cursor..m.start]);
        let expr = parse(&m.inner)?;
        let value = eval(&expr, ctx)?;
        out.push_str(&value.display_string());
        cursor = m.end;
    }
    out.extend(&chars[cursor..]);
    Ok(Json::String(out))
}

/// Recursively render every string leaf of `value`, leaving structure and
/// non-string scalars untouched.
pub fn render(value: &Json, ctx: &Context<'_>) -> Result<Json, TemplateError> {
    match value {
        Json::String(s) => render_string(s, ctx),
        Json::Array(items) => {
            let rendered: Result<Vec<_>, _> = items.iter().map(|v| render(v, ctx)).collect();
            Ok(Json::Array(rendered?))
        }
        Json::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), render(v, ctx)?);
            }
            Ok(Json::Object(out))
        }
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn ctx_with(flows: Value) -> (Value, Value) {
        (flows, Value::Map(IndexMap::new()))
    }

    #[test]
    fn no_markers_returns_identical_string() {
        let (flows, sources) = ctx_with(Value::Map(IndexMap::new()));
        let ctx = Context::new(&flows, &sources);
        let input = Json::String("plain text".to_string());
        assert_eq!(render(&input, &ctx).unwrap(), input);
    }

    #[test]
    fn whole_string_marker_yields_native_type() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), Value::Int(7));
        let (flows, sources) = ctx_with(Value::Map(map));
        let ctx = Context::new(&flows, &sources);
        let input = Json::String("  {{ flows.a }}  ".to_string());
        assert_eq!(render(&input, &ctx).unwrap(), Json::from(7));
    }

    #[test]
    fn embedded_marker_stringifies_into_surrounding_text() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), Value::Int(7));
        let (flows, sources) = ctx_with(Value::Map(map));
        let ctx = Context::new(&flows, &sources);
        let input = Json::String("value={{ flows.a }}!".to_string());
        assert_eq!(
            render(&input, &ctx).unwrap(),
            Json::String("value=7!".to_string())
        );
    }

    #[test]
    fn renders_nested_structures() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), Value::String("x".to_string()));
        let (flows, sources) = ctx_with(Value::Map(map));
        let ctx = Context::new(&flows, &sources);
        let input = serde_json::json!({"k": ["{{ flows.a }}", "literal"]});
        let rendered = render(&input, &ctx).unwrap();
        assert_eq!(rendered, serde_json::json!({"k": ["x", "literal"]}));
    }

    #[test]
    fn brace_inside_string_literal_does_not_close_marker_early() {
        let (flows, sources) = ctx_with(Value::Map(IndexMap::new()));
        let ctx = Context::new(&flows, &sources);
        let input = Json::String("{{ 'a}}b' }}".to_string());
        assert_eq!(render(&input, &ctx).unwrap(), Json::String("a}}b".to_string()));
    }
}
