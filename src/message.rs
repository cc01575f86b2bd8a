// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The envelope every pipeline stage passes along: [`Message`] wraps one
//! [`Item`] plus the bookkeeping (id, tag) stages use to route it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::device::Protocol;
use crate::model::Model;

/// What kind of MQTT traffic a message represents.
///
/// Corresponds one-to-one with the rows of the
/// [topic registry](crate::topic::TopicRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// Discovery/bridge-device-list traffic.
    Disco,
    /// Device online/offline traffic.
    Availability,
    /// Device telemetry/attribute-report traffic.
    State,
}

/// One piece of routable content: a device name, a protocol, a message
/// type, and the decoded JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Friendly name the payload concerns, or an empty string for
    /// bridge-wide discovery payloads that name many devices at once.
    pub device_name: String,
    /// Protocol the payload arrived over.
    pub protocol: Protocol,
    /// What kind of traffic this is.
    pub message_type: MessageType,
    /// The decoded JSON body (or a string-wrapped raw payload if the body
    /// was not valid JSON and the [`Scrutinizer`](crate::pipeline::scrutinizer::Scrutinizer)
    /// chose to pass it through anyway).
    pub payload: Value,
}

impl Item {
    /// Creates a new item.
    #[must_use]
    pub fn new(
        device_name: impl Into<String>,
        protocol: Protocol,
        message_type: MessageType,
        payload: Value,
    ) -> Self {
        Self {
            device_name: device_name.into(),
            protocol,
            message_type,
            payload,
        }
    }
}

/// The unit of work flowing through the pipeline's channels.
///
/// `tag` starts out as the raw MQTT subtopic the message arrived on (e.g.
/// `"DISCO"`, `"STATE"`, `"SENSOR"`) and stages downstream of the
/// scrutinizer match on it (see
/// [`StateNormalizer`](crate::pipeline::state_normalizer::StateNormalizer)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique id, generated once when the message is created and kept
    /// unchanged as it moves through every stage.
    pub id: Uuid,
    /// The subtopic or logical tag used by downstream stages to dispatch.
    pub tag: String,
    /// The device's model. [`Model::none`] for `DISCO` messages,
    /// [`Model::unknown`] until the model resolver stage has run for
    /// everything else, per [`TopicRegistry`](crate::topic::TopicRegistry)'s
    /// message types.
    pub model: Model,
    /// The routable content.
    pub item: Item,
}

impl Message {
    /// Creates a new message with a freshly generated id and an unresolved
    /// model.
    #[must_use]
    pub fn new(tag: impl Into<String>, item: Item) -> Self {
        Self {
            id: Uuid::new_v4(),
            tag: tag.into(),
            model: Model::unknown(),
            item,
        }
    }
}

/// A snapshot of which friendly names are currently known to a bridge or
/// coordinator, as produced by the [`Discoverer`](crate::pipeline::discoverer::Discoverer)
/// stage for downstream consumers that only care about device presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    /// Protocol the registry snapshot concerns.
    pub protocol: Protocol,
    /// Friendly names currently present.
    pub device_names: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_ids_are_unique() {
        let item = Item::new("switch_1", Protocol::Z2M, MessageType::State, Value::Null);
        let a = Message::new("STATE", item.clone());
        let b = Message::new("STATE", item);
        assert_ne!(a.id, b.id);
    }
}
