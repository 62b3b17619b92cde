// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Time-and-size-bounded batching between the ingestion path and the
//! delivery task.
//!
//! The service owns the accumulation buffer. Enqueue never blocks and never
//! waits on the network; ready batches are staged onto a channel that the
//! delivery task drains, so accumulation of the next batch continues while
//! the previous one is in flight.

use crate::error::BridgeError;
use eventhub_client::EventData;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error};

/// One flushable unit, in admission order.
pub type Batch = Vec<EventData>;

#[derive(Debug)]
enum DispatcherCommand {
    Enqueue(EventData),
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Cloneable handle used by the ingestion path.
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    tx: mpsc::UnboundedSender<DispatcherCommand>,
}

impl DispatcherHandle {
    /// Admits one encoded event. Returns immediately; delivery happens on
    /// the service's own timeline.
    pub fn enqueue(&self, item: EventData) -> Result<(), BridgeError> {
        self.tx
            .send(DispatcherCommand::Enqueue(item))
            .map_err(|_| BridgeError::DispatcherClosed)
    }

    /// Stages whatever is buffered right now, size and age notwithstanding.
    /// Resolves once the batch has been handed to the delivery task, not
    /// once it has been delivered.
    pub async fn flush(&self) -> Result<(), BridgeError> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(DispatcherCommand::Flush(tx))
            .map_err(|_| BridgeError::DispatcherClosed)?;
        rx.await.map_err(|_| BridgeError::DispatcherClosed)
    }

    /// Asks the service to stage its remaining buffer and stop.
    pub fn shutdown(&self) -> Result<(), BridgeError> {
        self.tx
            .send(DispatcherCommand::Shutdown)
            .map_err(|_| BridgeError::DispatcherClosed)
    }
}

/// The batching state machine. Run it with [`DispatcherService::run`] on its
/// own task.
pub struct DispatcherService {
    rx: mpsc::UnboundedReceiver<DispatcherCommand>,
    batch_tx: mpsc::UnboundedSender<Batch>,
    max_batch_size: usize,
    max_batch_age: Duration,
    buffer: Batch,
    /// Age deadline for the buffered batch; set when the first item lands
    /// in an empty buffer, cleared on every stage.
    deadline: Option<Instant>,
}

impl DispatcherService {
    /// Creates the service plus the handle for producers and the receiver
    /// the delivery task drains.
    pub fn new(
        max_batch_size: usize,
        max_batch_age: Duration,
    ) -> (Self, DispatcherHandle, mpsc::UnboundedReceiver<Batch>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (batch_tx, batch_rx) = mpsc::unbounded_channel();
        (
            Self {
                rx,
                batch_tx,
                max_batch_size,
                max_batch_age,
                buffer: Vec::new(),
                deadline: None,
            },
            DispatcherHandle { tx },
            batch_rx,
        )
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.rx.recv() => match command {
                    Some(DispatcherCommand::Enqueue(item)) => {
                        if self.buffer.is_empty() {
                            self.deadline = Some(Instant::now() + self.max_batch_age);
                        }
                        self.buffer.push(item);
                        if self.buffer.len() >= self.max_batch_size {
                            self.stage_batch();
                        }
                    }
                    Some(DispatcherCommand::Flush(ack)) => {
                        self.stage_batch();
                        let _ = ack.send(());
                    }
                    Some(DispatcherCommand::Shutdown) | None => {
                        self.stage_batch();
                        break;
                    }
                },
                _ = sleep_until(self.deadline.unwrap_or_else(Instant::now)),
                    if self.deadline.is_some() =>
                {
                    self.stage_batch();
                }
            }
        }
        // Dropping batch_tx lets the delivery task drain what was staged
        // and exit.
    }

    fn stage_batch(&mut self) {
        self.deadline = None;
        if self.buffer.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut self.buffer);
        debug!("staging a batch of {} events", batch.len());
        if self.batch_tx.send(batch).is_err() {
            error!("delivery task has stopped, dropping the staged batch");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(index: usize) -> EventData {
        EventData::new(index.to_string().into_bytes())
    }

    fn bodies(batch: &Batch) -> Vec<String> {
        batch
            .iter()
            .map(|event| String::from_utf8(event.body().to_vec()).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn size_trigger_stages_exactly_max_batch_size() {
        let (service, handle, mut batch_rx) =
            DispatcherService::new(100, Duration::from_secs(60));
        tokio::spawn(service.run());

        for index in 0..150 {
            handle.enqueue(item(index)).unwrap();
        }
        let first = batch_rx.recv().await.unwrap();
        assert_eq!(first.len(), 100);
        assert_eq!(bodies(&first)[0], "0");
        assert_eq!(bodies(&first)[99], "99");

        handle.flush().await.unwrap();
        let second = batch_rx.recv().await.unwrap();
        assert_eq!(second.len(), 50);
        assert_eq!(bodies(&second)[0], "100");
        assert_eq!(bodies(&second)[49], "149");
    }

    #[tokio::test(start_paused = true)]
    async fn age_trigger_stages_a_partial_batch() {
        let (service, handle, mut batch_rx) = DispatcherService::new(100, Duration::from_secs(5));
        tokio::spawn(service.run());

        handle.enqueue(item(0)).unwrap();
        handle.enqueue(item(1)).unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;

        let batch = batch_rx.recv().await.unwrap();
        assert_eq!(bodies(&batch), vec!["0", "1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn age_timer_restarts_with_each_new_batch() {
        let (service, handle, mut batch_rx) = DispatcherService::new(100, Duration::from_secs(5));
        tokio::spawn(service.run());

        handle.enqueue(item(0)).unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(batch_rx.recv().await.unwrap().len(), 1);

        handle.enqueue(item(1)).unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(batch_rx.recv().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn flush_with_an_empty_buffer_stages_nothing() {
        let (service, handle, mut batch_rx) = DispatcherService::new(100, Duration::from_secs(60));
        tokio::spawn(service.run());

        handle.flush().await.unwrap();
        assert!(matches!(
            batch_rx.try_recv(),
            Err(mpsc::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn shutdown_stages_the_remainder_and_closes_the_batch_channel() {
        let (service, handle, mut batch_rx) = DispatcherService::new(100, Duration::from_secs(60));
        let service_task = tokio::spawn(service.run());

        for index in 0..3 {
            handle.enqueue(item(index)).unwrap();
        }
        handle.shutdown().unwrap();
        service_task.await.unwrap();

        assert_eq!(bodies(&batch_rx.recv().await.unwrap()), vec!["0", "1", "2"]);
        assert!(batch_rx.recv().await.is_none());
        assert!(matches!(
            handle.enqueue(item(9)),
            Err(BridgeError::DispatcherClosed)
        ));
    }
}
