// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Siren/alarm device state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The volume level of a siren's chirp/alarm tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmVolume {
    /// Low volume.
    Low,
    /// Medium volume.
    Medium,
    /// High volume.
    High,
}

/// A siren/alarm device's latest reported state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    /// Whether the alarm is currently sounding.
    #[serde(default)]
    pub alarm: Option<bool>,
    /// Whether the device is reporting a low battery.
    #[serde(default)]
    pub battery_low: Option<bool>,
    /// Duration, in seconds, the alarm sounds for when triggered.
    #[serde(default)]
    pub duration: Option<u32>,
    /// Which melody the siren plays when triggered.
    #[serde(default)]
    pub melody: Option<u32>,
    /// Current alarm volume.
    #[serde(default)]
    pub volume: Option<AlarmVolume>,
    /// When this state was last reported.
    #[serde(default, alias = "Time")]
    pub last_seen: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_volume() {
        let alarm: Alarm = serde_json::from_str(r#"{"volume": "high"}"#).unwrap();
        assert_eq!(alarm.volume, Some(AlarmVolume::High));
    }

    #[test]
    fn decodes_alarm_fields() {
        let alarm: Alarm =
            serde_json::from_str(r#"{"alarm": true, "battery_low": false, "duration": 30, "melody": 5}"#).unwrap();
        assert_eq!(alarm.alarm, Some(true));
        assert_eq!(alarm.battery_low, Some(false));
        assert_eq!(alarm.duration, Some(30));
        assert_eq!(alarm.melody, Some(5));
    }
}
