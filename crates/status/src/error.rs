// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failures the status view can hit while binding or serving.

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("failed to bind status server to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}
