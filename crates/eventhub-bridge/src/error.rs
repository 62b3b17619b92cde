// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors raised while loading the bridge configuration. All of these are
/// fatal at startup; none is silently defaulted.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("EVENTHUB_CONNECTION_STRING is not set")]
    MissingConnectionString,

    #[error(transparent)]
    ConnectionString(#[from] eventhub_client::ClientError),

    #[error("invalid static property (expected name=value): {0}")]
    StaticProperty(String),

    #[error("invalid property type override (expected name:type): {0}")]
    TypeOverride(String),

    #[error("invalid event type (expected hex, e.g. $A1B2C3D4): {0}")]
    EventType(String),

    #[error("invalid {name}: {value}")]
    Setting { name: &'static str, value: String },
}

/// Errors surfaced to the `handle_event` caller. Transport health is never
/// reported here; delivery failures are absorbed at the flush boundary.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("dispatcher is shut down")]
    DispatcherClosed,
}

/// Errors parsing a newline-delimited CLEF event. The intake loop logs and
/// skips the offending line; one bad event never stops the stream.
#[derive(Debug, thiserror::Error)]
pub enum ClefError {
    #[error("event is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("event must be a JSON object")]
    NotAnObject,

    #[error("invalid @t timestamp: {0}")]
    Timestamp(String),

    #[error("invalid @i event type: {0}")]
    EventType(String),
}
