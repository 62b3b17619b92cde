// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::config::BridgeConfig;
use crate::dispatcher::DispatcherHandle;
use crate::error::BridgeError;
use crate::event::LogEvent;
use crate::select::select;
use eventhub_client::EventData;
use std::sync::Arc;
use tracing::info;

/// Per-event entry point wiring selection, encoding and the dispatcher
/// together. Safe to call from any task; it never waits on the network.
pub struct EventHubBridge {
    config: Arc<BridgeConfig>,
    dispatcher: DispatcherHandle,
}

impl EventHubBridge {
    pub fn new(config: Arc<BridgeConfig>, dispatcher: DispatcherHandle) -> Self {
        Self { config, dispatcher }
    }

    /// Projects one event and queues it for delivery. Events the selection
    /// rules reject are silently skipped; an `Err` here means the event
    /// itself could not be processed, never that delivery failed.
    pub fn handle_event(&self, event: &LogEvent) -> Result<(), BridgeError> {
        let Some(payload) = select(event, &self.config.selection) else {
            return Ok(());
        };
        let message = payload.encode()?;
        if self.config.log_messages {
            info!(
                "sending {} to {}",
                message,
                self.config.connection.entity_path()
            );
        }
        self.dispatcher.enqueue(EventData::new(message.into_bytes()))
    }
}
