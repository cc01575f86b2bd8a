// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The typed device state family.
//!
//! Every variant of [`DeviceState`] corresponds to one shape of telemetry
//! the [`StateNormalizer`](crate::pipeline::state_normalizer::StateNormalizer)
//! knows how to decode. `last_seen` is common to all of them and accepts
//! either a `last_seen` or `Time` wire key, matching the two conventions
//! Z2M and Tasmota use respectively.

mod adc;
mod air_sensor;
mod alarm;
mod availability;
mod button;
mod motion;
mod srts_a01;
mod switch;

pub use adc::Adc;
pub use air_sensor::AirSensor;
pub use alarm::{Alarm, AlarmVolume};
pub use availability::Availability;
pub use button::{Button, ButtonAction};
pub use motion::Motion;
pub use srts_a01::{HeatingPreset, SensorSource, SrtsA01, SystemMode};
pub use switch::{PowerValue, Switch, Switch2Channels};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A decoded, typed device state.
///
/// Produced by the state normalizer stage from a raw telemetry
/// [`Item::payload`](crate::message::Item); consumers downstream of the
/// pipeline match on this instead of re-parsing JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DeviceState {
    /// A single-relay switch.
    Switch(Switch),
    /// A two-relay switch.
    Switch2Channels(Switch2Channels),
    /// A temperature/humidity sensor.
    AirSensor(AirSensor),
    /// A PIR occupancy sensor.
    Motion(Motion),
    /// A button reporting click actions.
    Button(Button),
    /// A siren/alarm device.
    Alarm(Alarm),
    /// A Sonoff SRTS-A01 thermostatic radiator valve.
    SrtsA01(SrtsA01),
    /// A raw analog-to-digital input, e.g. a Tasmota ADC pin.
    Adc(Adc),
}

impl DeviceState {
    /// The `last_seen` timestamp, if the underlying variant reported one.
    #[must_use]
    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Switch(s) => s.last_seen,
            Self::Switch2Channels(s) => s.last_seen,
            Self::AirSensor(s) => s.last_seen,
            Self::Motion(s) => s.last_seen,
            Self::Button(s) => s.last_seen,
            Self::Alarm(s) => s.last_seen,
            Self::SrtsA01(s) => s.last_seen,
            Self::Adc(s) => s.last_seen,
        }
    }

    /// Dumps the state's non-null fields to a JSON object, the input an
    /// [`Encoder`](crate::encoder::Encoder) transforms for outbound commands.
    ///
    /// Mirrors `model_dump(exclude_none=True)` from the reference
    /// implementation: fields that are `None`/absent are left out of the
    /// object entirely rather than serialized as `null`.
    #[must_use]
    pub fn to_wire_fields(&self) -> Value {
        let value = match self {
            Self::Switch(s) => serde_json::to_value(s),
            Self::Switch2Channels(s) => serde_json::to_value(s),
            Self::AirSensor(s) => serde_json::to_value(s),
            Self::Motion(s) => serde_json::to_value(s),
            Self::Button(s) => serde_json::to_value(s),
            Self::Alarm(s) => serde_json::to_value(s),
            Self::SrtsA01(s) => serde_json::to_value(s),
            Self::Adc(s) => serde_json::to_value(s),
        }
        .unwrap_or(Value::Null);
        strip_nulls(value)
    }
}

/// Removes `null`-valued object entries, recursively.
fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_wire_fields_drops_nulls() {
        let state = DeviceState::Switch(Switch {
            power_on_behavior: None,
            power: PowerValue::On,
            last_seen: None,
        });
        let wire = state.to_wire_fields();
        assert!(wire.get("last_seen").is_none());
        assert_eq!(wire.get("power").unwrap(), "ON");
    }
}
