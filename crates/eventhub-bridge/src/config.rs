// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::coerce::{coerce, PropertyValue};
use crate::error::ConfigError;
use eventhub_client::ConnectionString;
use hashbrown::{HashMap, HashSet};
use serde_json::Value;
use std::env;
use std::time::Duration;

const DEFAULT_MAX_BATCH_SIZE: usize = 100;
const DEFAULT_MAX_BATCH_AGE_SECS: u64 = 5;
const DEFAULT_FLUSH_TIMEOUT_SECS: u64 = 30;

/// Which properties of an event are forwarded, and under what keys. Parsed
/// once at load; never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct SelectionConfig {
    /// Property names always copied verbatim. Empty means no explicit
    /// allow-list.
    pub event_properties: HashSet<String>,
    /// Property names whose presence forces inclusion of every property on
    /// that event.
    pub trigger_properties: HashSet<String>,
    /// Property names forwarded under a tag-decorated key. Tags never
    /// satisfy the has-any-property gate on their own.
    pub tag_properties: HashSet<String>,
    /// Fixed pairs injected into every outgoing payload as tags, in
    /// configured order, values already coerced.
    pub static_properties: Vec<(String, PropertyValue)>,
    /// Forced type names by property, or the `exclude`/`ignore` sentinel.
    pub property_type_overrides: HashMap<String, String>,
    /// Event types whose match forces inclusion of every property.
    pub event_type_allow_list: HashSet<u32>,
}

impl SelectionConfig {
    /// True when no allow-list of any kind is configured, so every event
    /// that carries properties will be forwarded in full.
    pub fn forwards_everything(&self) -> bool {
        self.event_properties.is_empty() && self.event_type_allow_list.is_empty()
    }
}

/// Full bridge configuration, read from `EVENTHUB_*` environment variables.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub connection: ConnectionString,
    pub selection: SelectionConfig,
    /// Log every outgoing message body before it is queued.
    pub log_messages: bool,
    pub max_batch_size: usize,
    pub max_batch_age: Duration,
    pub flush_timeout: Duration,
}

impl BridgeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_connection = env::var("EVENTHUB_CONNECTION_STRING")
            .map_err(|_| ConfigError::MissingConnectionString)?;
        let connection = ConnectionString::parse(&raw_connection)?;

        let selection = SelectionConfig {
            event_properties: name_set(&read_var("EVENTHUB_EVENT_PROPERTIES")),
            trigger_properties: name_set(&read_var("EVENTHUB_TRIGGER_PROPERTIES")),
            tag_properties: name_set(&read_var("EVENTHUB_TAG_PROPERTIES")),
            static_properties: parse_static_properties(&read_var("EVENTHUB_STATIC_PROPERTIES"))?,
            property_type_overrides: parse_type_overrides(&read_var("EVENTHUB_PROPERTY_TYPES"))?,
            event_type_allow_list: parse_event_types(&read_var("EVENTHUB_EVENT_TYPES"))?,
        };

        Ok(BridgeConfig {
            connection,
            selection,
            log_messages: env::var("EVENTHUB_LOG_MESSAGES")
                .map(|val| val.to_lowercase() == "true")
                .unwrap_or(false),
            max_batch_size: read_positive("EVENTHUB_MAX_BATCH_SIZE", DEFAULT_MAX_BATCH_SIZE as u64)?
                as usize,
            max_batch_age: Duration::from_secs(read_positive(
                "EVENTHUB_MAX_BATCH_AGE_SECS",
                DEFAULT_MAX_BATCH_AGE_SECS,
            )?),
            flush_timeout: Duration::from_secs(read_positive(
                "EVENTHUB_FLUSH_TIMEOUT_SECS",
                DEFAULT_FLUSH_TIMEOUT_SECS,
            )?),
        })
    }
}

fn read_var(name: &str) -> String {
    env::var(name).unwrap_or_default()
}

fn comma_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn name_set(raw: &str) -> HashSet<String> {
    comma_list(raw).map(str::to_string).collect()
}

/// `name=value` pairs, comma separated. Values are coerced once here so the
/// hot path injects them without re-parsing.
fn parse_static_properties(raw: &str) -> Result<Vec<(String, PropertyValue)>, ConfigError> {
    comma_list(raw)
        .map(|item| {
            let (name, value) = item
                .split_once('=')
                .ok_or_else(|| ConfigError::StaticProperty(item.to_string()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(ConfigError::StaticProperty(item.to_string()));
            }
            Ok((
                name.to_string(),
                coerce(&Value::String(value.trim().to_string())),
            ))
        })
        .collect()
}

/// `name:type` pairs, comma separated. The type name is kept as written;
/// the `exclude`/`ignore` sentinel is matched case-insensitively later.
fn parse_type_overrides(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    comma_list(raw)
        .map(|item| {
            let (name, type_name) = item
                .split_once(':')
                .ok_or_else(|| ConfigError::TypeOverride(item.to_string()))?;
            let (name, type_name) = (name.trim(), type_name.trim());
            if name.is_empty() || type_name.is_empty() {
                return Err(ConfigError::TypeOverride(item.to_string()));
            }
            Ok((name.to_string(), type_name.to_string()))
        })
        .collect()
}

/// Comma separated hex event types, with or without the `$` prefix Seq
/// displays them with.
fn parse_event_types(raw: &str) -> Result<HashSet<u32>, ConfigError> {
    comma_list(raw)
        .map(|item| {
            let digits = item.strip_prefix('$').unwrap_or(item);
            u32::from_str_radix(digits, 16).map_err(|_| ConfigError::EventType(item.to_string()))
        })
        .collect()
}

fn read_positive(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(raw) => {
            let parsed = raw.trim().parse::<u64>().map_err(|_| ConfigError::Setting {
                name,
                value: raw.clone(),
            })?;
            if parsed == 0 {
                return Err(ConfigError::Setting { name, value: raw });
            }
            Ok(parsed)
        }
        Err(_) => Ok(default),
    }
}
