// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Ordered outbound property bag and the key decoration scheme.
//!
//! Downstream consumers read metadata out of the key itself: a `$:` suffix
//! marks the entry as decorated, with the text after the delimiter naming
//! either `tag` or an explicit type. Undecorated keys are plain properties.

use crate::coerce::PropertyValue;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Delimiter between a property name and its decoration suffix.
pub const DECORATION_DELIMITER: &str = "$:";

/// Decorates a property name as a tag, e.g. `env` becomes `env$:tag`.
pub fn tag_key(name: &str) -> String {
    format!("{name}{DECORATION_DELIMITER}tag")
}

/// Decorates a property name with an explicit type, e.g. `Latency$:float`.
pub fn type_key(name: &str, type_name: &str) -> String {
    format!("{name}{DECORATION_DELIMITER}{type_name}")
}

/// True when the key already carries a decoration suffix.
pub fn is_decorated(key: &str) -> bool {
    key.contains(DECORATION_DELIMITER)
}

/// Insertion-ordered key/value pairs bound for the hub. Keys are kept in
/// the order they were admitted so the encoded document is reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutboundPayload {
    entries: Vec<(String, PropertyValue)>,
}

impl OutboundPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. Callers that need replace-in-place semantics use
    /// [`OutboundPayload::set`] instead.
    pub fn push(&mut self, key: String, value: PropertyValue) {
        self.entries.push((key, value));
    }

    /// Replaces the value under `key` in place, preserving its position,
    /// or appends when the key is absent.
    pub fn set(&mut self, key: String, value: PropertyValue) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Removes the entry under `key`, shifting later entries up.
    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        let index = self.entries.iter().position(|(existing, _)| existing == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Encodes the payload as a UTF-8 JSON document with keys in admission
    /// order.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for OutboundPayload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl IntoIterator for OutboundPayload {
    type Item = (String, PropertyValue);
    type IntoIter = std::vec::IntoIter<(String, PropertyValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, PropertyValue)> for OutboundPayload {
    fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
