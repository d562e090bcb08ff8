// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The uniform return contract every connector produces.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::HashMap;

/// `{success, code, notes}` — whether the connector's work succeeded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// `{status, data, meta}` returned by every connector invocation.
///
/// Invariant: `status.success == false` means the step failed regardless
/// of what `data` contains; `notes` carries human-readable detail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectorResult {
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub data: Json,
    #[serde(default)]
    pub meta: HashMap<String, Json>,
}

impl ConnectorResult {
    pub fn ok(data: Json) -> Self {
        Self {
            status: Status {
                success: true,
                code: 0,
                notes: Vec::new(),
            },
            data,
            meta: HashMap::new(),
        }
    }

    pub fn failed(note: impl Into<String>) -> Self {
        Self {
            status: Status {
                success: false,
                code: 1,
                notes: vec![note.into()],
            },
            data: Json::Null,
            meta: HashMap::new(),
        }
    }

    /// Human-readable summary of why a result failed, falling back to a
    /// generic message when the connector left `notes` empty.
    pub fn error_message(&self) -> String {
        if self.status.notes.is_empty() {
            "connector reported failure without notes".to_string()
        } else {
            self.status.notes.join("; ")
        }
    }
}
