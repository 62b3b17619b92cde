// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::config::BridgeConfig;
use crate::dispatcher::Batch;
use eventhub_client::EventHubClient;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::OnceCell;
use tracing::{debug, error};

/// Owns the only network I/O. Builds the hub client lazily on first flush;
/// a client that cannot be built is reported once and every later flush
/// drops its batch until the process is restarted with a working config.
pub struct Flusher {
    config: Arc<BridgeConfig>,
    client: OnceCell<Option<EventHubClient>>,
}

impl Flusher {
    pub fn new(config: Arc<BridgeConfig>) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    /// Drains staged batches until the dispatcher drops its side, then
    /// returns. One delivery attempt per batch, never a retry.
    pub async fn run(self, mut batch_rx: UnboundedReceiver<Batch>) {
        while let Some(batch) = batch_rx.recv().await {
            self.flush(batch).await;
        }
        debug!("batch channel closed, delivery task exiting");
    }

    async fn client(&self) -> &Option<EventHubClient> {
        self.client
            .get_or_init(|| async {
                match EventHubClient::new(
                    self.config.connection.clone(),
                    self.config.flush_timeout,
                ) {
                    Ok(client) => Some(client),
                    Err(e) => {
                        error!("failed to connect to event hub: {e}");
                        None
                    }
                }
            })
            .await
    }

    /// Attempts delivery of one batch. Failures are logged and absorbed
    /// here so the ingestion path never sees transport health.
    pub async fn flush(&self, batch: Batch) {
        if batch.is_empty() {
            return;
        }
        let Some(client) = self.client().await else {
            error!("no event hub client available, dropping {} events", batch.len());
            return;
        };
        debug!("flushing {} events to {}", batch.len(), client.path());
        if let Err(e) = client.send_batch(&batch).await {
            error!("failed to send batch to event hub: {e}");
        }
    }
}
