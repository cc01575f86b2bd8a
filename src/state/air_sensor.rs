// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature/humidity sensor state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A temperature/humidity (and optionally pressure) sensor reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirSensor {
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Atmospheric pressure in hPa, when the sensor reports it.
    #[serde(default)]
    pub pressure: Option<f64>,
    /// Battery level, percent, when the sensor reports it.
    #[serde(default)]
    pub battery: Option<u8>,
    /// When this state was last reported.
    #[serde(default, alias = "Time")]
    pub last_seen: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_payload() {
        let sensor: AirSensor =
            serde_json::from_str(r#"{"temperature": 21.5, "humidity": 47.0}"#).unwrap();
        assert_eq!(sensor.temperature, 21.5);
        assert!(sensor.pressure.is_none());
    }
}
