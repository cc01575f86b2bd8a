// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stage 1: turns `DISCO` traffic into device directory updates.
//!
//! Both the Z2M and Tasmota discovery shapes are folded into one code
//! path: a single pass over the discovered entries builds the directory
//! update and the friendly-name list together.

use serde_json::Value;

use crate::device::{Device, Protocol};
use crate::directory::DeviceDirectory;
use crate::message::{Item, Message, MessageType, Registry};
use crate::model::ModelRegistry;

/// Converts `DISCO` payloads into directory updates.
pub struct Discoverer {
    directory: DeviceDirectory,
    models: ModelRegistry,
}

impl Discoverer {
    /// Creates a discoverer that updates `directory` as it processes
    /// `DISCO` messages, interning resolved model tags through `models`.
    #[must_use]
    pub fn new(directory: DeviceDirectory, models: ModelRegistry) -> Self {
        Self { directory, models }
    }

    /// Processes one `DISCO` message: updates the directory and returns a
    /// `DISCO` message downstream stages can use to react to newly
    /// discovered devices, carrying a [`Registry`] snapshot as its payload.
    ///
    /// Sets the outgoing message's model to [`Model::none`](crate::model::Model::none):
    /// discovery traffic describes many devices at once and is not itself
    /// tied to one device's model.
    #[must_use]
    pub fn process(&self, message: Message) -> Option<Message> {
        let protocol = message.item.protocol;
        let devices = match protocol {
            Protocol::Z2M => discover_z2m(&message.item.payload, &self.models),
            Protocol::Tasmota => discover_tasmota(&message.item.payload, &message.item.device_name, &self.models),
            _ => Vec::new(),
        };

        if devices.is_empty() {
            return None;
        }

        let device_names: Vec<String> = devices.iter().map(|d| d.friendly_name.clone()).collect();
        self.directory.update_devices(devices);

        let registry = Registry {
            protocol,
            device_names,
        };
        let payload = serde_json::to_value(registry).unwrap_or(Value::Null);
        let item = Item::new(String::new(), protocol, MessageType::Disco, payload);
        let mut out = Message::new("DISCO", item);
        out.model = self.models.none();
        Some(out)
    }
}

/// One pass over the Z2M bridge device list: keeps `EndDevice`/`Router`
/// entries (skips the coordinator itself), building both the directory
/// records and the friendly-name list in the same iteration.
fn discover_z2m(payload: &Value, models: &ModelRegistry) -> Vec<Device> {
    let Some(entries) = payload.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let entry_type = entry.get("type").and_then(Value::as_str)?;
            if entry_type != "EndDevice" && entry_type != "Router" {
                return None;
            }
            let friendly_name = entry.get("friendly_name").and_then(Value::as_str)?;
            let mut device = Device::new(friendly_name, Protocol::Z2M);
            device.address = entry.get("ieee_address").and_then(Value::as_str).map(str::to_string);
            let vendor_model = entry.get("definition").and_then(|d| d.get("model")).and_then(Value::as_str);
            device.model = models.resolve_wire(vendor_model);
            Some(device)
        })
        .collect()
}

/// Tasmota discovery config payloads carry the device's topic in `"t"`,
/// host in `"hn"`, and model string in `"md"`.
fn discover_tasmota(payload: &Value, fallback_device_name: &str, models: &ModelRegistry) -> Vec<Device> {
    let friendly_name = payload
        .get("t")
        .and_then(Value::as_str)
        .unwrap_or(fallback_device_name);
    if friendly_name.is_empty() {
        return Vec::new();
    }
    let mut device = Device::new(friendly_name, Protocol::Tasmota);
    device.address = payload.get("hn").and_then(Value::as_str).map(str::to_string);
    device.model = models.resolve_wire(payload.get("md").and_then(Value::as_str));
    vec![device]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use serde_json::json;

    #[test]
    fn z2m_discovery_filters_coordinator() {
        let directory = DeviceDirectory::new();
        let discoverer = Discoverer::new(directory.clone(), ModelRegistry::new());
        let payload = json!([
            {"friendly_name": "Coordinator", "type": "Coordinator"},
            {"friendly_name": "switch_1", "type": "Router", "ieee_address": "0x1", "definition": {"model": "S26R2ZB"}},
            {"friendly_name": "sensor_1", "type": "EndDevice"},
        ]);
        let item = Item::new(String::new(), Protocol::Z2M, MessageType::Disco, payload);
        let message = discoverer.process(Message::new("DISCO", item)).unwrap();
        assert_eq!(message.tag, "DISCO");
        assert_eq!(message.model, Model::none());
        assert_eq!(directory.len(), 2);
        let switch = directory.get_device("switch_1").unwrap();
        assert_eq!(switch.model.as_str(), "SN_SMART_PLUG");
        assert_eq!(switch.address.as_deref(), Some("0x1"));
        assert!(directory.get_device("Coordinator").is_none());
    }

    #[test]
    fn tasmota_discovery_uses_topic_field() {
        let directory = DeviceDirectory::new();
        let discoverer = Discoverer::new(directory.clone(), ModelRegistry::new());
        let payload = json!({"t": "tasmota_ABCDEF", "hn": "192.168.1.5", "md": "Sonoff ZbBridge"});
        let item = Item::new("tasmota_ABCDEF", Protocol::Tasmota, MessageType::Disco, payload);
        discoverer.process(Message::new("DISCO", item)).unwrap();
        let device = directory.get_device("tasmota_ABCDEF").unwrap();
        assert_eq!(device.address.as_deref(), Some("192.168.1.5"));
        assert_eq!(device.model.as_str(), "SN_ZBBRIDGE");
    }

    #[test]
    fn empty_discovery_is_dropped() {
        let directory = DeviceDirectory::new();
        let discoverer = Discoverer::new(directory, ModelRegistry::new());
        let item = Item::new(String::new(), Protocol::Z2M, MessageType::Disco, json!([]));
        assert!(discoverer.process(Message::new("DISCO", item)).is_none());
    }
}
