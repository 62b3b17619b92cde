// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Decides which properties of an event go out, and under what keys.

use crate::coerce::{coerce, PropertyValue};
use crate::config::SelectionConfig;
use crate::event::LogEvent;
use crate::payload::{is_decorated, tag_key, type_key, OutboundPayload};
use hashbrown::HashMap;

/// Builds the outbound property map for one event, or `None` when the event
/// does not qualify for a send.
///
/// The rules run in a fixed order. Include-all starts false and is forced
/// true by: an empty allow-list of both kinds (legacy send-everything
/// default), then a matching trigger property, then a matching event type,
/// each unconditionally overwriting. The base map is gated before tag and
/// static injection, so tags and statics alone never cause a send. Type
/// overrides run last and never touch keys that are already decorated.
pub fn select(event: &LogEvent, config: &SelectionConfig) -> Option<OutboundPayload> {
    let mut include_all = false;
    if config.event_properties.is_empty() && config.event_type_allow_list.is_empty() {
        include_all = true;
    }
    if event
        .properties
        .keys()
        .any(|name| config.trigger_properties.contains(name.as_str()))
    {
        include_all = true;
    }
    if config.event_type_allow_list.contains(&event.event_type) {
        include_all = true;
    }

    let mut payload = OutboundPayload::new();
    for (name, value) in &event.properties {
        if include_all || config.event_properties.contains(name.as_str()) {
            payload.push(name.clone(), coerce(value));
        }
    }
    if payload.is_empty() {
        return None;
    }

    // Tag properties ride along even when the allow-list excluded them,
    // replacing any plain entry of the same name.
    for (name, value) in &event.properties {
        if config.tag_properties.contains(name.as_str()) {
            payload.remove(name);
            payload.set(tag_key(name), coerce(value));
        }
    }

    for (name, value) in &config.static_properties {
        payload.remove(name);
        payload.set(tag_key(name), value.clone());
    }

    payload.set(
        "Timestamp".to_string(),
        PropertyValue::Timestamp(event.timestamp),
    );

    if !config.property_type_overrides.is_empty() {
        payload = apply_overrides(payload, &config.property_type_overrides);
    }
    Some(payload)
}

fn apply_overrides(
    payload: OutboundPayload,
    overrides: &HashMap<String, String>,
) -> OutboundPayload {
    payload
        .into_iter()
        .filter_map(|(key, value)| {
            if is_decorated(&key) {
                return Some((key, value));
            }
            match overrides.get(&key) {
                None => Some((key, value)),
                Some(sentinel)
                    if sentinel.eq_ignore_ascii_case("exclude")
                        || sentinel.eq_ignore_ascii_case("ignore") =>
                {
                    None
                }
                Some(type_name) => Some((type_key(&key, type_name), value)),
            }
        })
        .collect()
}
