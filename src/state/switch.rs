// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switch-shaped device state (one or two relays).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// On/off value shared by every relay-backed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerValue {
    /// Relay is energized.
    #[serde(rename = "ON")]
    On,
    /// Relay is de-energized.
    #[serde(rename = "OFF")]
    Off,
}

impl PowerValue {
    /// The literal Z2M/Tasmota command value used to drive this relay on.
    pub const SWITCH_ON: &'static str = "ON";
    /// The literal Z2M/Tasmota command value used to drive this relay off.
    pub const SWITCH_OFF: &'static str = "OFF";
}

/// A single-relay switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    /// Behavior on power restore (e.g. `"on"`, `"off"`, `"previous"`), when
    /// the device reports it.
    #[serde(default)]
    pub power_on_behavior: Option<String>,
    /// Relay power state. Z2M reports this as `"state"`, Tasmota as
    /// `"POWER"`; both aliases are accepted.
    #[serde(alias = "state", alias = "POWER")]
    pub power: PowerValue,
    /// When this state was last reported.
    #[serde(default, alias = "Time")]
    pub last_seen: Option<DateTime<Utc>>,
}

/// A two-relay switch (e.g. a dual-gang wall switch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch2Channels {
    /// Relay 1 power state.
    #[serde(default, alias = "state_l1", alias = "POWER1")]
    pub power1: Option<PowerValue>,
    /// Relay 2 power state.
    #[serde(default, alias = "state_l2", alias = "POWER2")]
    pub power2: Option<PowerValue>,
    /// When this state was last reported.
    #[serde(default, alias = "Time")]
    pub last_seen: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_accepts_tasmota_alias() {
        let switch: Switch = serde_json::from_str(r#"{"POWER": "ON"}"#).unwrap();
        assert_eq!(switch.power, PowerValue::On);
    }

    #[test]
    fn switch_accepts_z2m_alias() {
        let switch: Switch = serde_json::from_str(r#"{"state": "OFF"}"#).unwrap();
        assert_eq!(switch.power, PowerValue::Off);
    }

    #[test]
    fn switch2channels_roundtrip() {
        let switch = Switch2Channels {
            power1: Some(PowerValue::On),
            power2: Some(PowerValue::Off),
            last_seen: None,
        };
        let value = serde_json::to_value(&switch).unwrap();
        assert_eq!(value["power1"], "ON");
        assert_eq!(value["power2"], "OFF");
    }

    #[test]
    fn switch2channels_accepts_partial_update() {
        let switch: Switch2Channels = serde_json::from_str(r#"{"POWER1": "ON"}"#).unwrap();
        assert_eq!(switch.power1, Some(PowerValue::On));
        assert_eq!(switch.power2, None);
    }
}
