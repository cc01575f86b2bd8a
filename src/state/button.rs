// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Button click-action state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The click gesture a button last reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    /// A single click.
    Single,
    /// A double click.
    Double,
    /// A long press.
    Long,
}

/// A button device's latest reported action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    /// The click gesture last reported.
    pub action: ButtonAction,
    /// Battery level, percent, when the device reports it.
    #[serde(default)]
    pub battery: Option<u8>,
    /// When this state was last reported.
    #[serde(default, alias = "Time")]
    pub last_seen: Option<DateTime<Utc>>,
}

/// Whether `action` is one of the gestures a caller is prepared to handle.
#[must_use]
pub fn is_button_action_expected(action: ButtonAction, expected: &[ButtonAction]) -> bool {
    expected.contains(&action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_lowercase_action() {
        let button: Button = serde_json::from_str(r#"{"action": "double"}"#).unwrap();
        assert_eq!(button.action, ButtonAction::Double);
    }

    #[test]
    fn expected_action_check() {
        assert!(is_button_action_expected(
            ButtonAction::Single,
            &[ButtonAction::Single, ButtonAction::Double]
        ));
        assert!(!is_button_action_expected(ButtonAction::Long, &[ButtonAction::Single]));
    }
}
