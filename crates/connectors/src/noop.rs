// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A connector that performs no I/O and echoes its configuration back as
//! data — useful for dry runs and as a default in examples.

use crate::connector::{Connector, ConnectorFactory};
use async_trait::async_trait;
use serde_json::Value as Json;
use weft_core::{ConfigError, ConnectorResult};

pub struct NoopConnector {
    configuration: Json,
}

#[async_trait]
impl Connector for NoopConnector {
    async fn call(&self, input: Json) -> ConnectorResult {
        ConnectorResult::ok(serde_json::json!({
            "configuration": self.configuration,
            "input": input,
        }))
    }
}

pub struct NoopConnectorFactory;

impl ConnectorFactory for NoopConnectorFactory {
    fn build(&self, configuration: &Json) -> Result<Box<dyn Connector>, ConfigError> {
        Ok(Box::new(NoopConnector {
            configuration: configuration.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echoes_configuration_and_input() {
        let factory = NoopConnectorFactory;
        let connector = factory.build(&serde_json::json!({"k": "v"})).unwrap();
        let result = connector.call(serde_json::json!({"x": 1})).await;
        assert!(result.status.success);
        assert_eq!(result.data["configuration"]["k"], "v");
        assert_eq!(result.data["input"]["x"], 1);
    }
}
