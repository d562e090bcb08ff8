// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The connector boundary every step calls through.

use async_trait::async_trait;
use serde_json::Value as Json;
use weft_core::ConnectorResult;

/// An external side effect a step invokes. Implementations wrap whatever
/// I/O the connector type represents (HTTP call, subprocess, filesystem
/// read, ...); the scheduler only ever sees `ConnectorResult`.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn call(&self, input: Json) -> ConnectorResult;
}

/// Builds a [`Connector`] from a source's resolved `configuration`. One
/// factory per connector type, registered once at startup in a
/// [`crate::ConnectorRegistry`] — no runtime plugin discovery.
pub trait ConnectorFactory: Send + Sync + 'static {
    fn build(&self, configuration: &Json) -> Result<Box<dyn Connector>, weft_core::ConfigError>;
}
