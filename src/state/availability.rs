// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Online/offline availability state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::device::Protocol;
use crate::error::DecodingError;

/// Whether a device is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    /// Device is online.
    Online,
    /// Device is offline.
    Offline,
}

impl Availability {
    /// Decodes an availability payload.
    ///
    /// Tasmota reports availability as the bare string `"Online"` /
    /// `"Offline"`. Z2M reports it either as a bare lowercase string or as
    /// `{"state": "online" | "offline"}`, depending on bridge version.
    ///
    /// # Errors
    ///
    /// Returns [`DecodingError::UnknownToken`] if the payload does not
    /// match any of the recognized shapes.
    pub fn decode(protocol: Protocol, payload: &Value) -> Result<Self, DecodingError> {
        let token = match protocol {
            Protocol::Tasmota => payload.as_str(),
            _ => payload
                .as_str()
                .or_else(|| payload.get("state").and_then(Value::as_str)),
        };

        match token {
            Some(t) if t.eq_ignore_ascii_case("online") => Ok(Self::Online),
            Some(t) if t.eq_ignore_ascii_case("offline") => Ok(Self::Offline),
            Some(other) => Err(DecodingError::UnknownToken {
                field: "availability".to_string(),
                token: other.to_string(),
            }),
            None => Err(DecodingError::UnexpectedShape(
                "availability payload was not a string or {state: ...} object".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_tasmota_bare_string() {
        let result = Availability::decode(Protocol::Tasmota, &json!("Online")).unwrap();
        assert_eq!(result, Availability::Online);
    }

    #[test]
    fn decodes_z2m_object_shape() {
        let result = Availability::decode(Protocol::Z2M, &json!({"state": "offline"})).unwrap();
        assert_eq!(result, Availability::Offline);
    }

    #[test]
    fn decodes_z2m_bare_string() {
        let result = Availability::decode(Protocol::Z2M, &json!("online")).unwrap();
        assert_eq!(result, Availability::Online);
    }

    #[test]
    fn rejects_unknown_token() {
        let err = Availability::decode(Protocol::Tasmota, &json!("Unreachable")).unwrap_err();
        assert!(matches!(err, DecodingError::UnknownToken { .. }));
    }
}
