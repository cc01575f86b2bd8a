// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stage 3 (state branch): decodes raw telemetry into [`DeviceState`].
//!
//! Which [`DeviceState`] variant a payload decodes into is determined by
//! the message's resolved [`Model`](crate::model::Model), via a static
//! `model -> variant` table — not by sniffing which fields happen to be
//! present, so a payload missing an optional field still resolves to the
//! variant its model is known to report.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;

use crate::device::Protocol;
use crate::error::DecodingError;
use crate::message::Message;
use crate::state::{AirSensor, Alarm, Button, DeviceState, Motion, SrtsA01, Switch, Switch2Channels};

/// Which [`DeviceState`] variant a model's telemetry decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Switch,
    Switch2Channels,
    AirSensor,
    Motion,
    Button,
    Alarm,
    SrtsA01,
}

fn refine_config() -> &'static HashMap<&'static str, Shape> {
    static TABLE: OnceLock<HashMap<&'static str, Shape>> = OnceLock::new();
    TABLE.get_or_init(|| {
        HashMap::from([
            ("SN_AIRSENSOR", Shape::AirSensor),
            ("SN_MINI", Shape::Switch),
            ("SN_MINI_L2", Shape::Switch),
            ("SN_SMART_PLUG", Shape::Switch),
            ("SHELLY_PLUGS", Shape::Switch),
            ("SHELLY_UNI", Shape::Switch2Channels),
            ("SN_MOTION", Shape::Motion),
            ("SN_BUTTON", Shape::Button),
            ("SRTS_A01", Shape::SrtsA01),
            ("NEO_ALARM", Shape::Alarm),
        ])
    })
}

/// Decodes `STATE`/`SENSOR`-tagged messages.
pub struct StateNormalizer;

impl StateNormalizer {
    /// Decodes `message.item.payload` into a [`DeviceState`] determined by
    /// `message.model`, replacing the payload with its serialized form on
    /// success.
    ///
    /// Tasmota's `SENSOR` tag never refines: `ANALOG`/`ENERGY` sub-mappings
    /// are logged for visibility and the message is forwarded unchanged.
    #[must_use]
    pub fn process(&self, mut message: Message) -> Option<Message> {
        if message.item.protocol == Protocol::Tasmota && message.tag == "SENSOR" {
            log_tasmota_sensor(&message);
            return Some(message);
        }

        let Some(shape) = refine_config().get(message.model.as_str()).copied() else {
            tracing::warn!(
                device = %message.item.device_name,
                model = %message.model,
                "model not supported by state normalizer"
            );
            return None;
        };

        match decode(shape, &message.item.payload) {
            Ok(state) => {
                message.item.payload = serde_json::to_value(state).unwrap_or_default();
                Some(message)
            }
            Err(err) => {
                tracing::warn!(
                    device = %message.item.device_name,
                    tag = %message.tag,
                    error = %err,
                    "dropping undecodable state payload"
                );
                None
            }
        }
    }
}

fn log_tasmota_sensor(message: &Message) {
    if let Some(analog) = message.item.payload.get("ANALOG") {
        tracing::debug!(device = %message.item.device_name, %analog, "analog reading");
    }
    if let Some(energy) = message.item.payload.get("ENERGY") {
        tracing::debug!(device = %message.item.device_name, %energy, "energy reading");
    }
}

fn decode(shape: Shape, payload: &Value) -> Result<DeviceState, DecodingError> {
    if !payload.is_object() {
        return Err(DecodingError::UnexpectedShape(format!("expected a JSON object, got {payload}")));
    }
    match shape {
        Shape::Switch => from_json::<Switch>(payload).map(DeviceState::Switch),
        Shape::Switch2Channels => from_json::<Switch2Channels>(payload).map(DeviceState::Switch2Channels),
        Shape::AirSensor => from_json::<AirSensor>(payload).map(DeviceState::AirSensor),
        Shape::Motion => from_json::<Motion>(payload).map(DeviceState::Motion),
        Shape::Button => from_json::<Button>(payload).map(DeviceState::Button),
        Shape::Alarm => from_json::<Alarm>(payload).map(DeviceState::Alarm),
        Shape::SrtsA01 => from_json::<SrtsA01>(payload).map(DeviceState::SrtsA01),
    }
}

fn from_json<T: serde::de::DeserializeOwned>(payload: &Value) -> Result<T, DecodingError> {
    serde_json::from_value(payload.clone()).map_err(|e| DecodingError::UnexpectedShape(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Item, MessageType};
    use serde_json::json;

    fn message_for(device: &str, protocol: Protocol, tag: &str, model: &str, payload: Value) -> Message {
        let item = Item::new(device, protocol, MessageType::State, payload);
        let mut message = Message::new(tag, item);
        message.model = crate::model::ModelRegistry::new().intern(model);
        message
    }

    #[test]
    fn decodes_switch_from_z2m_state() {
        let normalizer = StateNormalizer;
        let message = message_for("switch_1", Protocol::Z2M, "STATE", "SN_SMART_PLUG", json!({"state": "ON"}));
        let message = normalizer.process(message).unwrap();
        assert_eq!(message.item.payload["kind"], "Switch");
    }

    #[test]
    fn tasmota_sensor_tag_forwards_unchanged() {
        let normalizer = StateNormalizer;
        let payload = json!({"ANALOG": {"Range": 512}});
        let message = message_for("plug_1", Protocol::Tasmota, "SENSOR", "UNKNOWN", payload.clone());
        let message = normalizer.process(message).unwrap();
        assert_eq!(message.item.payload, payload);
    }

    #[test]
    fn decodes_motion() {
        let normalizer = StateNormalizer;
        let message = message_for("motion_1", Protocol::Z2M, "STATE", "SN_MOTION", json!({"occupancy": true}));
        let message = normalizer.process(message).unwrap();
        assert_eq!(message.item.payload["kind"], "Motion");
    }

    #[test]
    fn unsupported_model_is_dropped() {
        let normalizer = StateNormalizer;
        let message = message_for("weird_1", Protocol::Z2M, "STATE", "UNKNOWN", json!({"linkquality": 90}));
        assert!(normalizer.process(message).is_none());
    }

    #[test]
    fn srts_a01_range_violation_is_dropped() {
        let normalizer = StateNormalizer;
        let payload = json!({"occupied_heating_setpoint": 40});
        let message = message_for("trv_1", Protocol::Z2M, "STATE", "SRTS_A01", payload);
        assert!(normalizer.process(message).is_none());
    }
}
