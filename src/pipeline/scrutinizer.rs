// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Turns raw `(topic, payload)` pairs received from the broker into typed
//! [`Message`]s, the entry point of the pipeline.

use serde_json::Value;

use crate::device::Protocol;
use crate::message::{Item, Message};
use crate::topic::TopicRegistry;

/// Converts raw MQTT traffic into [`Message`]s using a [`TopicRegistry`].
pub struct Scrutinizer {
    topics: TopicRegistry,
}

impl Scrutinizer {
    /// Creates a scrutinizer using `topics` to resolve incoming traffic.
    #[must_use]
    pub fn new(topics: TopicRegistry) -> Self {
        Self { topics }
    }

    /// Converts one raw MQTT publish into a [`Message`], or `None` if the
    /// topic does not match any registered row or the payload should be
    /// silently dropped.
    ///
    /// Tasmota's `tele/<device>/STATE` topic occasionally carries a
    /// non-JSON payload (firmware boot banners, mostly); those are
    /// dropped without logging, since they are expected noise rather than
    /// a decoding failure. Every other non-JSON payload is wrapped as a
    /// JSON string so downstream stages still see a valid payload value.
    #[must_use]
    pub fn to_message(&self, topic: &str, payload: &[u8]) -> Option<Message> {
        let (protocol, message_type, entry) = self.topics.resolve(topic)?;
        let device_name = entry.device_name_from_topic(topic).unwrap_or_default();
        let tag = tag_for(protocol, message_type, topic);
        let payload_str = String::from_utf8_lossy(payload);

        let value = match serde_json::from_str::<Value>(&payload_str) {
            Ok(value) => value,
            Err(_) if protocol == Protocol::Tasmota && tag == "STATE" => {
                tracing::debug!(%topic, "dropping non-JSON Tasmota STATE payload");
                return None;
            }
            Err(_) => Value::String(payload_str.into_owned()),
        };

        let item = Item::new(device_name, protocol, message_type, value);
        Some(Message::new(tag, item))
    }
}

fn tag_for(protocol: Protocol, message_type: crate::message::MessageType, topic: &str) -> String {
    use crate::message::MessageType;
    match message_type {
        MessageType::Disco => "DISCO".to_string(),
        MessageType::Availability => "AVAILABILITY".to_string(),
        MessageType::State if protocol == Protocol::Tasmota => topic
            .rsplit('/')
            .next()
            .unwrap_or("STATE")
            .to_ascii_uppercase(),
        MessageType::State => "STATE".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_z2m_state() {
        let scrutinizer = Scrutinizer::new(TopicRegistry::with_defaults());
        let msg = scrutinizer
            .to_message("zigbee2mqtt/switch_1", br#"{"state": "ON"}"#)
            .unwrap();
        assert_eq!(msg.tag, "STATE");
        assert_eq!(msg.item.device_name, "switch_1");
        assert_eq!(msg.item.protocol, Protocol::Z2M);
    }

    #[test]
    fn tasmota_sensor_tag_is_segment() {
        let scrutinizer = Scrutinizer::new(TopicRegistry::with_defaults());
        let msg = scrutinizer
            .to_message("tele/plug_1/SENSOR", br#"{"ANALOG": {"Range": 512}}"#)
            .unwrap();
        assert_eq!(msg.tag, "SENSOR");
    }

    #[test]
    fn tasmota_non_json_state_is_dropped() {
        let scrutinizer = Scrutinizer::new(TopicRegistry::with_defaults());
        assert!(scrutinizer.to_message("tele/plug_1/STATE", b"garbled-boot-banner").is_none());
    }

    #[test]
    fn non_json_non_state_payload_is_wrapped() {
        let scrutinizer = Scrutinizer::new(TopicRegistry::with_defaults());
        let msg = scrutinizer
            .to_message("tele/plug_1/LWT", b"Online")
            .unwrap();
        assert_eq!(msg.item.payload, Value::String("Online".to_string()));
    }

    #[test]
    fn unresolved_topic_is_none() {
        let scrutinizer = Scrutinizer::new(TopicRegistry::with_defaults());
        assert!(scrutinizer.to_message("unrelated/topic", b"{}").is_none());
    }
}
