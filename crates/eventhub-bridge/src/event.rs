// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Inbound log events and their newline-delimited CLEF form.

use crate::error::ClefError;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// A structured log event as received from the host.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    /// When the event occurred (not when it arrived here).
    pub timestamp: DateTime<Utc>,
    /// Stable identifier for the shape of the event's message template.
    pub event_type: u32,
    /// The event's property bag, in source order.
    pub properties: Map<String, Value>,
}

impl LogEvent {
    pub fn new(timestamp: DateTime<Utc>, event_type: u32) -> Self {
        Self {
            timestamp,
            event_type,
            properties: Map::new(),
        }
    }

    #[must_use]
    pub fn with_property(mut self, name: &str, value: Value) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    /// Parses one CLEF line. `@t` is the RFC 3339 timestamp (arrival time
    /// when absent), `@i` the hex event type (`0` when absent, an optional
    /// leading `$` is tolerated). Every other `@`-prefixed key is reified
    /// into the property bag by stripping one `@`, so `@m` lands as `m` and
    /// the escaped `@@rate` lands as `@rate`.
    pub fn from_clef(line: &str) -> Result<Self, ClefError> {
        let document: Value = serde_json::from_str(line)?;
        let Value::Object(fields) = document else {
            return Err(ClefError::NotAnObject);
        };

        let mut event = LogEvent::new(Utc::now(), 0);
        for (key, value) in fields {
            match key.as_str() {
                "@t" => {
                    let text = value
                        .as_str()
                        .ok_or_else(|| ClefError::Timestamp(value.to_string()))?;
                    event.timestamp = DateTime::parse_from_rfc3339(text)
                        .map_err(|_| ClefError::Timestamp(text.to_string()))?
                        .with_timezone(&Utc);
                }
                "@i" => {
                    let text = value
                        .as_str()
                        .ok_or_else(|| ClefError::EventType(value.to_string()))?;
                    let digits = text.strip_prefix('$').unwrap_or(text);
                    event.event_type = u32::from_str_radix(digits, 16)
                        .map_err(|_| ClefError::EventType(text.to_string()))?;
                }
                _ => {
                    let name = key.strip_prefix('@').map(str::to_string).unwrap_or(key);
                    event.properties.insert(name, value);
                }
            }
        }
        Ok(event)
    }
}
