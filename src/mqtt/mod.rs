// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The broker-facing half of the bridge: connection setup and the
//! publish/subscribe adapter [`DeviceAccessor`](crate::accessor::DeviceAccessor)
//! and the pipeline's scrutinizer run on top of.

mod context;

#[cfg(feature = "mqtt")]
mod client;

pub use context::{MqttContext, SecurityContext};

#[cfg(feature = "mqtt")]
pub use client::MqttClient;
