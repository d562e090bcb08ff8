// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Template Engine and Output Extractor.
//!
//! A `{{ expr }}` marker is parsed into an [`ast::Expr`] and evaluated
//! strictly against `{flows, sources}` — any undefined reference is a
//! [`error::TemplateError::Undefined`], never a silent empty string.

pub mod ast;
pub mod error;
pub mod eval;
pub mod extract;
pub mod filters;
pub mod lexer;
pub mod parser;
pub mod render;

pub use error::{OutputError, TemplateError};
pub use eval::Context;
pub use extract::extract;
pub use render::render;

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;
    use weft_core::Value;

    #[test]
    fn render_and_eval_compose_end_to_end() {
        let mut flows_map = IndexMap::new();
        flows_map.insert(
            "fetch".to_string(),
            Value::Map(IndexMap::from_iter([(
                "status".to_string(),
                Value::Int(200),
            )])),
        );
        let flows = Value::Map(flows_map);
        let sources = Value::Map(IndexMap::new());
        let ctx = Context::new(&flows, &sources);

        let input = json!({
            "ok": "{{ 'pass' if flows.fetch.status == 200 else 'fail' }}",
        });
        let rendered = render(&input, &ctx).unwrap();
        assert_eq!(rendered, json!({"ok": "pass"}));
    }
}
