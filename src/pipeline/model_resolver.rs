// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stage 2: attaches a resolved [`Model`] to every non-`DISCO` message.

use crate::device::Device;
use crate::directory::DeviceDirectory;
use crate::message::Message;
use crate::model::ModelRegistry;

/// Resolves `message.item.device_name` against the directory and records
/// the device's model on the message.
///
/// Read-only with respect to the directory: a name the directory has no
/// record for resolves to [`Model::unknown`](crate::model::Model::unknown)
/// for this message only, without registering the device — the directory
/// is written only by [`Discoverer`](crate::pipeline::Discoverer). Never
/// drops a message: an unresolved device is never filtered out of the
/// pipeline.
pub struct ModelResolver {
    directory: DeviceDirectory,
    models: ModelRegistry,
}

impl ModelResolver {
    /// Creates a resolver backed by `directory`, interning resolved model
    /// tags through `models`.
    #[must_use]
    pub fn new(directory: DeviceDirectory, models: ModelRegistry) -> Self {
        Self { directory, models }
    }

    /// Resolves the model for `message.item.device_name` and records it on
    /// the message.
    #[must_use]
    pub fn process(&self, mut message: Message) -> Option<Message> {
        let device_name = message.item.device_name.clone();
        let protocol = message.item.protocol;

        let device = self.directory.get_device(&device_name).unwrap_or_else(|| {
            let mut device = Device::new(device_name.clone(), protocol);
            device.model = self.models.unknown();
            device
        });

        tracing::debug!(device = %device_name, model = %device.model, "resolved model");
        message.model = device.model;
        Some(message)
    }
}
