// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol tags and the device record shared across the pipeline.

use serde::{Deserialize, Serialize};

use crate::model::Model;

/// The wire protocol a device's messages arrive over.
///
/// Only [`Protocol::Z2M`] and [`Protocol::Tasmota`] are wired into the
/// [topic registry](crate::topic::TopicRegistry); the remaining variants
/// are reserved for devices the directory can describe but the pipeline
/// does not yet route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    /// Zigbee2MQTT.
    Z2M,
    /// Tasmota firmware's native MQTT topic layout.
    Tasmota,
    /// Homie convention. Reserved, not routed.
    Homie,
    /// Ring's MQTT bridge. Reserved, not routed.
    Ring,
    /// Shelly's native MQTT layout. Reserved, not routed.
    Shelly,
    /// Zigbee2Tasmota bridge. Reserved, not routed.
    Z2T,
    /// Fallback for devices whose protocol could not be determined.
    Default,
}

/// A device known to the [directory](crate::directory::DeviceDirectory).
///
/// `friendly_name` is the stable identifier used everywhere else in the
/// pipeline (topics, the directory, the accessor); `model` starts out as
/// [`Model::unknown`] and is filled in once discovery or the model resolver
/// stage has seen enough to make a determination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// The name used in MQTT topics to address this device.
    pub friendly_name: String,
    /// Protocol this device was discovered through.
    pub protocol: Protocol,
    /// Host or radio address reported at discovery time (Z2M's
    /// `ieee_address`, Tasmota's `hn`), when the discovery payload carried
    /// one.
    pub address: Option<String>,
    /// Resolved model, or [`Model::unknown`] until resolution completes.
    pub model: Model,
}

impl Device {
    /// Creates a device record with an unresolved model and no address.
    #[must_use]
    pub fn new(friendly_name: impl Into<String>, protocol: Protocol) -> Self {
        Self {
            friendly_name: friendly_name.into(),
            protocol,
            address: None,
            model: Model::unknown(),
        }
    }
}
