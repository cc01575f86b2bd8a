// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stage 3 (availability branch): decodes raw availability payloads into
//! [`Availability`].

use crate::message::Message;
use crate::state::Availability;

/// Decodes `AVAILABILITY`-tagged messages.
///
/// Messages whose payload cannot be decoded are logged and dropped; this
/// never propagates an error out of the pipeline.
pub struct AvailabilityNormalizer;

impl AvailabilityNormalizer {
    /// Decodes `message.item.payload` in place into a serialized
    /// [`Availability`] value.
    #[must_use]
    pub fn process(&self, mut message: Message) -> Option<Message> {
        match Availability::decode(message.item.protocol, &message.item.payload) {
            Ok(availability) => {
                message.item.payload = serde_json::to_value(availability).unwrap_or_default();
                Some(message)
            }
            Err(err) => {
                tracing::warn!(
                    device = %message.item.device_name,
                    error = %err,
                    "dropping undecodable availability payload"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Protocol;
    use crate::message::{Item, MessageType};
    use serde_json::json;

    #[test]
    fn decodes_valid_payload() {
        let normalizer = AvailabilityNormalizer;
        let item = Item::new("plug_1", Protocol::Tasmota, MessageType::Availability, json!("Online"));
        let message = normalizer.process(Message::new("AVAILABILITY", item)).unwrap();
        assert_eq!(message.item.payload, json!("Online"));
    }

    #[test]
    fn drops_invalid_payload() {
        let normalizer = AvailabilityNormalizer;
        let item = Item::new("plug_1", Protocol::Tasmota, MessageType::Availability, json!("Weird"));
        assert!(normalizer.process(Message::new("AVAILABILITY", item)).is_none());
    }
}
