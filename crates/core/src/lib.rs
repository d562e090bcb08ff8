// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Data model shared by every crate in the workflow runner.
//!
//! `weft-core` owns the types that cross subsystem boundaries: the
//! declarative config model (`SourceDecl`, `StepDecl`, `OutputSpec`), the
//! uniform connector return contract (`ConnectorResult`), the tagged value
//! type used by the template engine, and the per-step/per-run state
//! snapshots served by the status view. It has no knowledge of how any of
//! these are produced or consumed.

pub mod connector_result;
pub mod decl;
pub mod error;
pub mod id;
pub mod state;
pub mod value;

pub use connector_result::{ConnectorResult, Status};
pub use decl::{OnError, OutputKind, OutputSpec, SourceDecl, SourceRef, StepDecl};
pub use error::{ConfigError, ValidationError, ValidationIssue};
pub use id::{IdGen, UuidIdGen};
#[cfg(any(test, feature = "test-support"))]
pub use id::SequentialIdGen;
pub use state::{RunState, StepState, StepStateKind};
pub use value::Value;
