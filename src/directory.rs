// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The registry of every device the bridge has discovered.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::device::Device;

/// Shared, process-wide record of known devices.
///
/// Cheaply cloneable (the inner map is behind an `Arc`); every pipeline
/// stage that needs to look up or update a device's record holds a clone.
/// Uses `parking_lot::RwLock` rather than `tokio::sync::RwLock` because
/// lookups are uncontended, in-memory, and never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct DeviceDirectory {
    devices: Arc<RwLock<HashMap<String, Device>>>,
}

impl DeviceDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record for `device.friendly_name`.
    pub fn update_device(&self, device: Device) {
        self.devices
            .write()
            .insert(device.friendly_name.clone(), device);
    }

    /// Replaces every device record for a batch discovered at once,
    /// without touching records for other protocols.
    pub fn update_devices(&self, devices: impl IntoIterator<Item = Device>) {
        let mut guard = self.devices.write();
        for device in devices {
            guard.insert(device.friendly_name.clone(), device);
        }
    }

    /// Looks up a device by friendly name.
    #[must_use]
    pub fn get_device(&self, friendly_name: &str) -> Option<Device> {
        self.devices.read().get(friendly_name).cloned()
    }

    /// Returns every known device.
    #[must_use]
    pub fn get_devices(&self) -> Vec<Device> {
        self.devices.read().values().cloned().collect()
    }

    /// Returns every known friendly name.
    #[must_use]
    pub fn get_device_names(&self) -> Vec<String> {
        self.devices.read().keys().cloned().collect()
    }

    /// Number of known devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    /// Whether the directory has no devices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Protocol;

    #[test]
    fn update_and_get() {
        let directory = DeviceDirectory::new();
        directory.update_device(Device::new("switch_1", Protocol::Z2M));
        let device = directory.get_device("switch_1").unwrap();
        assert_eq!(device.protocol, Protocol::Z2M);
    }

    #[test]
    fn unknown_device_returns_none() {
        let directory = DeviceDirectory::new();
        assert!(directory.get_device("nope").is_none());
    }

    #[test]
    fn clone_shares_state() {
        let directory = DeviceDirectory::new();
        let clone = directory.clone();
        directory.update_device(Device::new("switch_1", Protocol::Tasmota));
        assert_eq!(clone.len(), 1);
    }

    #[test]
    fn update_devices_batch() {
        let directory = DeviceDirectory::new();
        directory.update_devices([
            Device::new("a", Protocol::Z2M),
            Device::new("b", Protocol::Z2M),
        ]);
        assert_eq!(directory.len(), 2);
        assert!(directory.get_device_names().contains(&"a".to_string()));
    }
}
