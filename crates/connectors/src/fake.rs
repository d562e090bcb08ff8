// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake connector for testing. Only compiled for tests or when explicitly
//! requested via the `test-support` feature.
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::connector::{Connector, ConnectorFactory};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value as Json;
use std::collections::VecDeque;
use std::sync::Arc;
use weft_core::{ConfigError, ConnectorResult};

struct FakeConnectorState {
    calls: Vec<Json>,
    queued: VecDeque<ConnectorResult>,
    default_result: ConnectorResult,
}

/// A connector whose results are scripted ahead of time and whose calls
/// are recorded for later assertion.
#[derive(Clone)]
pub struct FakeConnector {
    inner: Arc<Mutex<FakeConnectorState>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeConnectorState {
                calls: Vec::new(),
                queued: VecDeque::new(),
                default_result: ConnectorResult::ok(Json::Null),
            })),
        }
    }

    /// Queue a result to be returned by the next `call`, in FIFO order.
    /// Once the queue is drained, `call` falls back to the default result.
    pub fn push_result(&self, result: ConnectorResult) {
        self.inner.lock().queued.push_back(result);
    }

    pub fn set_default_result(&self, result: ConnectorResult) {
        self.inner.lock().default_result = result;
    }

    pub fn calls(&self) -> Vec<Json> {
        self.inner.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().calls.len()
    }
}

impl Default for FakeConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn call(&self, input: Json) -> ConnectorResult {
        let mut state = self.inner.lock();
        state.calls.push(input);
        state
            .queued
            .pop_front()
            .unwrap_or_else(|| state.default_result.clone())
    }
}

/// Hands out clones of one shared [`FakeConnector`] — lets a test configure
/// results before the scheduler builds connectors from the registry, and
/// inspect recorded calls afterward.
pub struct FakeConnectorFactory {
    connector: FakeConnector,
}

impl FakeConnectorFactory {
    pub fn new(connector: FakeConnector) -> Self {
        Self { connector }
    }
}

impl ConnectorFactory for FakeConnectorFactory {
    fn build(&self, _configuration: &Json) -> Result<Box<dyn Connector>, ConfigError> {
        Ok(Box::new(self.connector.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_and_replays_queued_results() {
        let fake = FakeConnector::new();
        fake.push_result(ConnectorResult::failed("boom"));
        fake.push_result(ConnectorResult::ok(serde_json::json!({"n": 1})));

        let first = fake.call(serde_json::json!({"a": 1})).await;
        let second = fake.call(serde_json::json!({"a": 2})).await;

        assert!(!first.status.success);
        assert!(second.status.success);
        assert_eq!(fake.call_count(), 2);
        assert_eq!(fake.calls()[1]["a"], 2);
    }

    #[tokio::test]
    async fn falls_back_to_default_result_once_queue_drains() {
        let fake = FakeConnector::new();
        fake.set_default_result(ConnectorResult::ok(serde_json::json!({"d": true})));
        let result = fake.call(Json::Null).await;
        assert_eq!(result.data["d"], true);
    }
}
