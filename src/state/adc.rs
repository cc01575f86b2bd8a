// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw analog-to-digital input state, e.g. a Tasmota ADC pin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw ADC reading, as reported on Tasmota's `ANALOG` telemetry key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adc {
    /// Raw reading, 0-100 on the device's normalized scale.
    #[serde(alias = "Range")]
    pub range: f64,
    /// When this state was last reported.
    #[serde(default, alias = "Time")]
    pub last_seen: Option<DateTime<Utc>>,
}

impl Adc {
    /// The reading expressed as a voltage, the device's normalized scale
    /// being hundredths of a volt.
    #[must_use]
    pub fn voltage(&self) -> f64 {
        self.range / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voltage_is_range_over_100() {
        let adc = Adc {
            range: 330.0,
            last_seen: None,
        };
        assert!((adc.voltage() - 3.3).abs() < f64::EPSILON);
    }
}
