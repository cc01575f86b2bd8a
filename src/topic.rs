// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Static tables mapping (protocol, message type) to MQTT subscribe
//! patterns, and protocol to command topic base.
//!
//! Populated once at pipeline construction time via
//! [`TopicRegistry::with_defaults`] / [`CommandTopicRegistry::with_defaults`]
//! — not a global singleton, so independent pipelines (tests, mainly) never
//! share registration state.

use crate::device::Protocol;
use crate::error::ConfigError;
use crate::message::MessageType;

/// One row of the topic registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicEntry {
    /// The topic prefix telemetry/state payloads for this row are rooted
    /// at, e.g. `"tele"` or `"zigbee2mqtt"`.
    pub info_base: String,
    /// The MQTT subscribe pattern (with `+`/`#` wildcards) used to receive
    /// this row's traffic.
    pub subscribe_pattern: String,
    /// Index into a matched topic string, in bytes, where the device's
    /// friendly name begins. Always `info_base.len() + 1` (the `+1` skips
    /// the separating `/`).
    pub device_name_offset: usize,
}

impl TopicEntry {
    fn new(info_base: &str, subscribe_pattern: &str) -> Self {
        Self {
            info_base: info_base.to_string(),
            subscribe_pattern: subscribe_pattern.to_string(),
            device_name_offset: info_base.len() + 1,
        }
    }

    /// Extracts the device's friendly name from a concrete topic string
    /// that matched this entry's `subscribe_pattern`.
    ///
    /// Returns `None` if `topic` is shorter than `device_name_offset`.
    #[must_use]
    pub fn device_name_from_topic<'a>(&self, topic: &'a str) -> Option<&'a str> {
        let rest = topic.get(self.device_name_offset..)?;
        Some(rest.split('/').next().unwrap_or(rest))
    }
}

/// Maps `(Protocol, MessageType)` to the topic layout used for that kind
/// of inbound traffic.
#[derive(Debug, Clone, Default)]
pub struct TopicRegistry {
    entries: Vec<(Protocol, MessageType, TopicEntry)>,
}

impl TopicRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry populated with the bridge's standard Z2M and
    /// Tasmota topic layouts.
    ///
    /// # Panics
    ///
    /// Panics if the built-in table contains a duplicate entry, which
    /// would be a defect in this crate rather than a caller error.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register(
                Protocol::Z2M,
                MessageType::Disco,
                TopicEntry::new("zigbee2mqtt/bridge", "zigbee2mqtt/bridge/devices"),
            )
            .expect("built-in topic table must not contain duplicates");
        registry
            .register(
                Protocol::Z2M,
                MessageType::Availability,
                TopicEntry::new("zigbee2mqtt", "zigbee2mqtt/+/availability"),
            )
            .expect("built-in topic table must not contain duplicates");
        registry
            .register(
                Protocol::Z2M,
                MessageType::State,
                TopicEntry::new("zigbee2mqtt", "zigbee2mqtt/+"),
            )
            .expect("built-in topic table must not contain duplicates");
        registry
            .register(
                Protocol::Tasmota,
                MessageType::Disco,
                TopicEntry::new("tasmota/discovery", "tasmota/discovery/+/config"),
            )
            .expect("built-in topic table must not contain duplicates");
        registry
            .register(
                Protocol::Tasmota,
                MessageType::Availability,
                TopicEntry::new("tele", "tele/+/LWT"),
            )
            .expect("built-in topic table must not contain duplicates");
        registry
            .register(
                Protocol::Tasmota,
                MessageType::State,
                TopicEntry::new("tele", "tele/+/+"),
            )
            .expect("built-in topic table must not contain duplicates");
        registry
    }

    /// Registers one `(protocol, message_type)` row.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateTopic`] if this pair was already
    /// registered.
    pub fn register(
        &mut self,
        protocol: Protocol,
        message_type: MessageType,
        entry: TopicEntry,
    ) -> Result<(), ConfigError> {
        if self
            .entries
            .iter()
            .any(|(p, t, _)| *p == protocol && *t == message_type)
        {
            return Err(ConfigError::DuplicateTopic(protocol, message_type));
        }
        self.entries.push((protocol, message_type, entry));
        Ok(())
    }

    /// Looks up the entry for `(protocol, message_type)`.
    #[must_use]
    pub fn lookup(&self, protocol: Protocol, message_type: MessageType) -> Option<&TopicEntry> {
        self.entries
            .iter()
            .find(|(p, t, _)| *p == protocol && *t == message_type)
            .map(|(.., entry)| entry)
    }

    /// Every subscribe pattern in the registry, used to set up the broker
    /// subscriptions at start-up.
    pub fn subscribe_patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(.., entry)| entry.subscribe_pattern.as_str())
    }

    /// Resolves which `(protocol, message_type)` a concrete topic belongs
    /// to, by testing each registered subscribe pattern.
    #[must_use]
    pub fn resolve(&self, topic: &str) -> Option<(Protocol, MessageType, &TopicEntry)> {
        self.entries
            .iter()
            .find(|(.., entry)| topic_matches(&entry.subscribe_pattern, topic))
            .map(|(p, t, entry)| (*p, *t, entry))
    }
}

/// Maps a protocol to the base topic used to address outbound commands.
#[derive(Debug, Clone, Default)]
pub struct CommandTopicRegistry {
    bases: Vec<(Protocol, String)>,
}

impl CommandTopicRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the bridge's standard command bases.
    ///
    /// # Panics
    ///
    /// Panics if the built-in table contains a duplicate entry.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register(Protocol::Z2M, "zigbee2mqtt")
            .expect("built-in command topic table must not contain duplicates");
        registry
            .register(Protocol::Tasmota, "cmnd")
            .expect("built-in command topic table must not contain duplicates");
        registry
    }

    /// Registers the command base for `protocol`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateCommandTopic`] if `protocol` was
    /// already registered.
    pub fn register(&mut self, protocol: Protocol, base: impl Into<String>) -> Result<(), ConfigError> {
        if self.bases.iter().any(|(p, _)| *p == protocol) {
            return Err(ConfigError::DuplicateCommandTopic(protocol));
        }
        self.bases.push((protocol, base.into()));
        Ok(())
    }

    /// The command base for `protocol`, if registered.
    #[must_use]
    pub fn lookup(&self, protocol: Protocol) -> Option<&str> {
        self.bases
            .iter()
            .find(|(p, _)| *p == protocol)
            .map(|(_, base)| base.as_str())
    }
}

/// Matches `topic` against an MQTT-style `pattern` containing `+`
/// (single-level) and `#` (multi-level, must be the last segment)
/// wildcards.
#[must_use]
pub fn topic_matches(pattern: &str, topic: &str) -> bool {
    let pattern_segments: Vec<&str> = pattern.split('/').collect();
    let topic_segments: Vec<&str> = topic.split('/').collect();

    let mut p = 0;
    let mut t = 0;
    while p < pattern_segments.len() {
        if pattern_segments[p] == "#" {
            return true;
        }
        if t >= topic_segments.len() {
            return false;
        }
        if pattern_segments[p] != "+" && pattern_segments[p] != topic_segments[t] {
            return false;
        }
        p += 1;
        t += 1;
    }
    t == topic_segments.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_has_six_rows() {
        let registry = TopicRegistry::with_defaults();
        assert_eq!(registry.entries.len(), 6);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = TopicRegistry::new();
        let entry = TopicEntry::new("tele", "tele/+/LWT");
        registry
            .register(Protocol::Tasmota, MessageType::Availability, entry.clone())
            .unwrap();
        let err = registry
            .register(Protocol::Tasmota, MessageType::Availability, entry)
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateTopic(..)));
    }

    #[test]
    fn device_name_extraction() {
        let entry = TopicEntry::new("tele", "tele/+/STATE");
        assert_eq!(entry.device_name_from_topic("tele/plug_1/STATE"), Some("plug_1"));
    }

    #[test]
    fn wildcard_matching() {
        assert!(topic_matches("tele/+/LWT", "tele/plug_1/LWT"));
        assert!(!topic_matches("tele/+/LWT", "tele/plug_1/STATE"));
        assert!(topic_matches("zigbee2mqtt/#", "zigbee2mqtt/bridge/devices"));
    }

    #[test]
    fn resolve_finds_matching_row() {
        let registry = TopicRegistry::with_defaults();
        let (protocol, message_type, _) = registry.resolve("tele/plug_1/LWT").unwrap();
        assert_eq!(protocol, Protocol::Tasmota);
        assert_eq!(message_type, MessageType::Availability);
    }

    #[test]
    fn command_topic_defaults() {
        let registry = CommandTopicRegistry::with_defaults();
        assert_eq!(registry.lookup(Protocol::Z2M), Some("zigbee2mqtt"));
        assert_eq!(registry.lookup(Protocol::Tasmota), Some("cmnd"));
    }
}
