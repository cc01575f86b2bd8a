// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State for the Sonoff SRTS-A01 thermostatic radiator valve.
//!
//! The numeric fields carry the same exclusive bounds as the device's own
//! firmware; values outside them are rejected at deserialization time
//! rather than silently clamped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Heating preset mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatingPreset {
    /// User-set target temperature.
    Manual,
    /// Away/holiday preset.
    Away,
    /// Schedule-driven preset.
    Auto,
}

/// Which temperature sensor the valve uses as its control input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorSource {
    /// The valve's own built-in sensor.
    Internal,
    /// An externally reported temperature.
    External,
}

/// Whether the valve is actively heating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemMode {
    /// Valve closed.
    Off,
    /// Valve actively regulating to setpoint.
    Heat,
}

/// Latest reported state of a SRTS-A01 valve.
///
/// Every field is optional: Z2M state payloads for this device commonly
/// report only the attributes that changed, not a full snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrtsA01 {
    /// Target temperature while the `away` preset is active.
    /// Valid range: exclusive `(-10, 35)`.
    #[serde(default, deserialize_with = "deserialize_away_preset_temperature")]
    pub away_preset_temperature: Option<f64>,
    /// Externally-supplied temperature reading, used when `sensor` is
    /// [`SensorSource::External`]. Valid range: exclusive `(0, 55)`.
    #[serde(default, deserialize_with = "deserialize_external_temperature_input")]
    pub external_temperature_input: Option<f64>,
    /// Target temperature while heating normally.
    /// Valid range: exclusive `(5, 30)`.
    #[serde(default, deserialize_with = "deserialize_occupied_heating_setpoint")]
    pub occupied_heating_setpoint: Option<f64>,
    /// Active preset.
    #[serde(default)]
    pub preset: Option<HeatingPreset>,
    /// Which sensor feeds the control loop.
    #[serde(default)]
    pub sensor: Option<SensorSource>,
    /// Whether the valve is heating or idle.
    #[serde(default)]
    pub system_mode: Option<SystemMode>,
    /// When this state was last reported.
    #[serde(default, alias = "Time")]
    pub last_seen: Option<DateTime<Utc>>,
}

fn deserialize_bounded<'de, D>(
    deserializer: D,
    field: &'static str,
    min: f64,
    max: f64,
) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if value > min && value < max {
        Ok(Some(value))
    } else {
        Err(serde::de::Error::custom(format!(
            "{field} value {value} is out of range ({min}, {max})"
        )))
    }
}

fn deserialize_away_preset_temperature<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_bounded(deserializer, "away_preset_temperature", -10.0, 35.0)
}

fn deserialize_external_temperature_input<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_bounded(deserializer, "external_temperature_input", 0.0, 55.0)
}

fn deserialize_occupied_heating_setpoint<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_bounded(deserializer, "occupied_heating_setpoint", 5.0, 30.0)
}
