// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PIR occupancy sensor state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A PIR occupancy sensor reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Whether motion is currently detected.
    #[serde(default)]
    pub occupancy: Option<bool>,
    /// Whether the device is reporting a tamper condition.
    #[serde(default)]
    pub tamper: Option<bool>,
    /// When this state was last reported.
    #[serde(default, alias = "Time")]
    pub last_seen: Option<DateTime<Utc>>,
}

/// Whether a [`Motion`] reading indicates motion was detected.
#[must_use]
pub fn is_motion_detected(motion: &Motion) -> bool {
    motion.occupancy.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_motion() {
        let motion = Motion {
            occupancy: Some(true),
            tamper: None,
            last_seen: None,
        };
        assert!(is_motion_detected(&motion));
    }

    #[test]
    fn absent_occupancy_is_not_detected() {
        let motion = Motion {
            occupancy: None,
            tamper: Some(false),
            last_seen: None,
        };
        assert!(!is_motion_detected(&motion));
    }
}
