// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors the Template Engine and Output Extractor can raise.

#[derive(Debug, Clone, thiserror::Error)]
pub enum TemplateError {
    #[error("unexpected token {found:?} at position {position} in expression `{expr}`")]
    Syntax {
        expr: String,
        found: String,
        position: usize,
    },

    #[error("unterminated `{{{{` expression in `{snippet}`")]
    UnterminatedMarker { snippet: String },

    #[error("strict-mode reference `{path}` is undefined")]
    Undefined { path: String },

    #[error("unknown filter `{name}`")]
    UnknownFilter { name: String },

    #[error("filter `{name}` received a value it cannot operate on: {value}")]
    FilterTypeMismatch { name: String, value: String },

    #[error("filter `{name}` expects {expected} argument(s), got {got}")]
    FilterArity {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("comparison between incompatible values: {left} {op} {right}")]
    Incomparable {
        left: String,
        op: String,
        right: String,
    },
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum OutputError {
    #[error("jsonpath expression `{path}` is invalid: {message}")]
    InvalidPath { path: String, message: String },

    #[error("output `{name}` uses kind `path` but produced no value for `{path}`")]
    MissingPathValue { name: String, path: String },
}
