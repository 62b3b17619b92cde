// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Bridges structured log events into Azure Event Hubs: per-event property
//! selection and typing, ordered JSON encoding, and a non-blocking
//! time-and-size-bounded batching pipeline with best-effort delivery.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod bridge;
pub mod coerce;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod flusher;
pub mod payload;
pub mod select;

pub use bridge::EventHubBridge;
pub use coerce::PropertyValue;
pub use config::{BridgeConfig, SelectionConfig};
pub use dispatcher::{Batch, DispatcherHandle, DispatcherService};
pub use error::{BridgeError, ClefError, ConfigError};
pub use event::LogEvent;
pub use flusher::Flusher;
pub use payload::OutboundPayload;
