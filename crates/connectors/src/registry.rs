// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Explicit connector-type registration — no plugin discovery. A binary
//! assembles a [`ConnectorRegistry`] at startup from whichever factories it
//! was built with.

use crate::connector::{Connector, ConnectorFactory};
use std::collections::HashMap;
use std::sync::Arc;
use weft_core::ConfigError;

#[derive(Clone, Default)]
pub struct ConnectorRegistry {
    factories: HashMap<String, Arc<dyn ConnectorFactory>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, type_name: impl Into<String>, factory: Arc<dyn ConnectorFactory>) {
        self.factories.insert(type_name.into(), factory);
    }

    pub fn build(
        &self,
        type_name: &str,
        configuration: &serde_json::Value,
    ) -> Result<Box<dyn Connector>, ConfigError> {
        let factory = self.factories.get(type_name).ok_or_else(|| {
            tracing::warn!(%type_name, "connector type is not registered");
            ConfigError::UnknownConnectorType {
                type_name: type_name.to_string(),
            }
        })?;
        factory.build(configuration)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }
}
