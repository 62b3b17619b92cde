// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::connection::ConnectionString;
use crate::sas;
use crate::ClientError;

// Tokens are minted per request, so a short lifetime is plenty.
const SAS_TTL: Duration = Duration::from_secs(300);
const API_VERSION: &str = "2014-01";

/// One encoded payload, as accepted by the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventData {
    body: Vec<u8>,
}

impl EventData {
    #[must_use]
    pub fn new(body: Vec<u8>) -> Self {
        Self { body }
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[derive(Serialize)]
struct BatchEntry<'a> {
    #[serde(rename = "Body")]
    body: &'a str,
}

/// Sends batches of events to a single hub over the REST API.
#[derive(Debug, Clone)]
pub struct EventHubClient {
    http: reqwest::Client,
    connection: ConnectionString,
    send_url: String,
}

impl EventHubClient {
    /// Builds a client for the hub named by the connection's `EntityPath`.
    /// `timeout` bounds every send attempt end to end.
    pub fn new(connection: ConnectionString, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let send_url = format!(
            "{}/messages?timeout=60&api-version={API_VERSION}",
            connection.resource_uri()
        );
        Ok(Self {
            http,
            connection,
            send_url,
        })
    }

    /// Name of the hub this client sends to.
    #[must_use]
    pub fn path(&self) -> &str {
        self.connection.entity_path()
    }

    /// Sends `events` as one REST batch, preserving order. Any non-2xx
    /// response is a transport error; nothing is retried here.
    pub async fn send_batch(&self, events: &[EventData]) -> Result<(), ClientError> {
        let entries = events
            .iter()
            .map(|event| {
                std::str::from_utf8(event.body())
                    .map(|body| BatchEntry { body })
                    .map_err(|invalid| ClientError::Payload(invalid.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let body =
            serde_json::to_vec(&entries).map_err(|error| ClientError::Payload(error.to_string()))?;

        let token = sas::sas_token(
            &self.connection.resource_uri(),
            self.connection.key_name(),
            self.connection.key(),
            SAS_TTL,
        )?;

        let response = self
            .http
            .post(&self.send_url)
            .header("Authorization", token)
            .header("Content-Type", "application/vnd.microsoft.servicebus.json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!("sent {} events to {}", events.len(), self.path());
            Ok(())
        } else {
            let detail = response.text().await.unwrap_or_default();
            Err(ClientError::Rejected { status, detail })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_data_round_trips_its_body() {
        let data = EventData::new(b"{\"a\":1}".to_vec());
        assert_eq!(data.body(), b"{\"a\":1}");
    }

    #[test]
    fn send_url_targets_the_hub_messages_endpoint() {
        let conn = ConnectionString::parse(
            "Endpoint=sb://ns.example.net/;SharedAccessKeyName=k;SharedAccessKey=s;EntityPath=logs",
        )
        .unwrap();
        let client = EventHubClient::new(conn, Duration::from_secs(5)).unwrap();
        assert_eq!(client.path(), "logs");
        assert_eq!(
            client.send_url,
            "https://ns.example.net/logs/messages?timeout=60&api-version=2014-01"
        );
    }
}
