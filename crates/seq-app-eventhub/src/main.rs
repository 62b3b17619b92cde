// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::{env, sync::Arc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use eventhub_bridge::{
    BridgeConfig, BridgeError, DispatcherService, EventHubBridge, Flusher, LogEvent,
};

#[tokio::main]
pub async fn main() {
    let log_level = env::var("EVENTHUB_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let config = match BridgeConfig::from_env() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!("Error loading event hub bridge configuration: {e}");
            return;
        }
    };

    if config.selection.forwards_everything() {
        warn!("No event property or event type allow-list configured, this will send everything");
    }

    let (service, handle, batch_rx) =
        DispatcherService::new(config.max_batch_size, config.max_batch_age);
    let dispatcher_task = tokio::spawn(service.run());
    let flusher_task = tokio::spawn(Flusher::new(Arc::clone(&config)).run(batch_rx));
    let bridge = EventHubBridge::new(Arc::clone(&config), handle.clone());

    info!(
        "Forwarding events to event hub {}",
        config.connection.entity_path()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                let event = match LogEvent::from_clef(&line) {
                    Ok(event) => event,
                    Err(e) => {
                        warn!("Skipping malformed event: {e}");
                        continue;
                    }
                };
                match bridge.handle_event(&event) {
                    Ok(()) => {}
                    Err(BridgeError::DispatcherClosed) => {
                        error!("Dispatcher stopped unexpectedly, shutting down");
                        break;
                    }
                    Err(e) => warn!("Skipping event: {e}"),
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!("Error reading from stdin: {e}");
                break;
            }
        }
    }

    debug!("Input stream closed, draining buffered events");
    if handle.shutdown().is_ok() {
        let _ = dispatcher_task.await;
        let _ = flusher_task.await;
    }
}
