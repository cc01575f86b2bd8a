// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Turns typed intent (get this device's state, set it, flip a relay) into
//! the handful of outbound publishes each protocol needs, routed through
//! the [`CommandTopicRegistry`]/[`EncoderRegistry`] built once at start-up.
//!
//! Publishing is abstracted behind [`Publisher`] rather than taking a
//! concrete [`MqttClient`](crate::mqtt::MqttClient) directly, so this module
//! can be exercised without a broker.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::device::Protocol;
use crate::directory::DeviceDirectory;
use crate::encoder::EncoderRegistry;
use crate::error::{Error, Result};
use crate::model::Model;
use crate::state::{DeviceState, PowerValue, Switch};
use crate::timer::TimerManager;
use crate::topic::CommandTopicRegistry;

/// A boxed, `'static` future, used so [`Publisher`] stays object-safe.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Delivery quality asked for on outbound publishes. Accessor traffic is
/// always published at [`Qos::AtLeastOnce`], never retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qos {
    /// At most once.
    AtMostOnce,
    /// At least once.
    AtLeastOnce,
}

/// Everything [`DeviceAccessor`] needs from an MQTT connection.
///
/// Implemented by [`MqttClient`](crate::mqtt::MqttClient) for production
/// use; tests implement it with an in-memory recorder instead of standing
/// up a broker.
pub trait Publisher: Send + Sync {
    /// Publishes `payload` to `topic`.
    fn publish(&self, topic: String, payload: Vec<u8>, qos: Qos, retain: bool) -> BoxFuture<Result<()>>;
}

/// Turns get/set/power-change intent into outbound publishes.
///
/// Cheaply cloneable: every field is itself an `Arc`-backed handle shared
/// with the rest of the pipeline.
#[derive(Clone)]
pub struct DeviceAccessor {
    publisher: Arc<dyn Publisher>,
    command_topics: CommandTopicRegistry,
    encoders: Arc<EncoderRegistry>,
    directory: DeviceDirectory,
    timers: TimerManager,
}

impl DeviceAccessor {
    /// Builds an accessor that publishes through `publisher`, resolves
    /// command topic bases from `command_topics`, and encodes commands
    /// through `encoders`.
    #[must_use]
    pub fn new(
        publisher: Arc<dyn Publisher>,
        command_topics: CommandTopicRegistry,
        encoders: Arc<EncoderRegistry>,
        directory: DeviceDirectory,
        timers: TimerManager,
    ) -> Self {
        Self {
            publisher,
            command_topics,
            encoders,
            directory,
            timers,
        }
    }

    /// Requests a fresh read of `device_name`'s state.
    ///
    /// Consults the model's encoder for `gettable_fields`; if it has none
    /// (or no encoder is registered for `model`), logs and returns without
    /// publishing anything.
    pub async fn get_state(&self, device_name: &str, protocol: Protocol, model: &Model) -> Result<()> {
        let Some(encoder) = self.encoders.get(model) else {
            tracing::debug!(device = %device_name, %model, "no encoder registered, skipping get_state");
            return Ok(());
        };
        if encoder.gettable_fields.is_empty() {
            tracing::debug!(device = %device_name, %model, "model has no gettable fields");
            return Ok(());
        }
        let Some(base) = self.command_topics.lookup(protocol) else {
            tracing::warn!(device = %device_name, ?protocol, "no command topic base registered");
            return Ok(());
        };

        match protocol {
            Protocol::Z2M => {
                let mut fields = Map::new();
                for field in &encoder.gettable_fields {
                    fields.insert((*field).to_string(), Value::String(String::new()));
                }
                let payload = serde_json::to_vec(&Value::Object(fields)).unwrap_or_default();
                self.publisher
                    .publish(format!("{base}/{device_name}/get"), payload, Qos::AtLeastOnce, false)
                    .await?;
            }
            Protocol::Tasmota => {
                for field in &encoder.gettable_fields {
                    self.publisher
                        .publish(format!("{base}/{device_name}/{field}"), Vec::new(), Qos::AtLeastOnce, false)
                        .await?;
                }
            }
            _ => {
                tracing::debug!(device = %device_name, ?protocol, "get_state not routed for this protocol");
            }
        }
        Ok(())
    }

    /// Publishes `state_mapping` as a `set` command for `device_name`.
    pub async fn set_state(&self, device_name: &str, protocol: Protocol, state_mapping: &Map<String, Value>) -> Result<()> {
        let Some(base) = self.command_topics.lookup(protocol) else {
            tracing::warn!(device = %device_name, ?protocol, "no command topic base registered");
            return Ok(());
        };

        match protocol {
            Protocol::Z2M => {
                let payload = serde_json::to_vec(&Value::Object(state_mapping.clone())).unwrap_or_default();
                self.publisher
                    .publish(format!("{base}/{device_name}/set"), payload, Qos::AtLeastOnce, false)
                    .await?;
            }
            Protocol::Tasmota => {
                for (field, value) in state_mapping {
                    let payload = value_to_wire_string(value).into_bytes();
                    self.publisher
                        .publish(format!("{base}/{device_name}/{field}"), payload, Qos::AtLeastOnce, false)
                        .await?;
                }
            }
            _ => {
                tracing::debug!(device = %device_name, ?protocol, "set_state not routed for this protocol");
            }
        }
        Ok(())
    }

    /// Flips `device_names_csv`'s relay(s) on or off, with optional
    /// countdown/pulse behavior.
    ///
    /// Each comma-separated device name is handled independently. See
    /// the module docs for the exact ordering of the countdown/on-time/
    /// off-time rules.
    pub async fn switch_power_change(
        &self,
        device_names_csv: &str,
        protocol: Protocol,
        model: &Model,
        power_on: bool,
        countdown: f64,
        on_time: f64,
        off_time: f64,
    ) -> Result<()> {
        for device_name in device_names_csv.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            self.switch_power_change_one(device_name, protocol, model, power_on, countdown, on_time, off_time)
                .await?;
        }
        Ok(())
    }

    async fn switch_power_change_one(
        &self,
        device_name: &str,
        protocol: Protocol,
        model: &Model,
        power_on: bool,
        countdown: f64,
        on_time: f64,
        off_time: f64,
    ) -> Result<()> {
        if countdown != 0.0 {
            let accessor = self.clone();
            let device_name = device_name.to_string();
            let model = model.clone();
            self.timers.create_timer(&device_name, Duration::from_secs_f64(countdown), move || {
                tokio::spawn(async move {
                    if let Err(err) = accessor
                        .switch_power_change_one(&device_name, protocol, &model, power_on, 0.0, on_time, off_time)
                        .await
                    {
                        tracing::warn!(device = %device_name, %err, "deferred switch_power_change failed");
                    }
                });
            })?;
            return Ok(());
        }

        self.apply_power(device_name, protocol, model, power_on).await?;

        if power_on && on_time > 0.0 {
            self.schedule_power(device_name, protocol, model, false, on_time);
        } else if !power_on && off_time > 0.0 {
            self.schedule_power(device_name, protocol, model, true, off_time);
        }
        Ok(())
    }

    /// Same as [`Self::switch_power_change`], but resolves `protocol`/
    /// `model` per device name from the directory instead of taking them
    /// as arguments. A name the directory has no record for is logged
    /// and skipped, never propagated as an error.
    pub async fn switch_power_change_for_known_devices(
        &self,
        device_names_csv: &str,
        power_on: bool,
        countdown: f64,
        on_time: f64,
        off_time: f64,
    ) {
        for device_name in device_names_csv.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let Some(device) = self.directory.get_device(device_name) else {
                tracing::warn!(device = %device_name, "switch_power_change: unknown device");
                continue;
            };
            if let Err(err) = self
                .switch_power_change_one(device_name, device.protocol, &device.model, power_on, countdown, on_time, off_time)
                .await
            {
                tracing::warn!(device = %device_name, %err, "switch_power_change failed");
            }
        }
    }

    fn schedule_power(&self, device_name: &str, protocol: Protocol, model: &Model, power_on: bool, delay_seconds: f64) {
        let accessor = self.clone();
        let device_name = device_name.to_string();
        let model = model.clone();
        if let Err(err) = self.timers.create_timer(&device_name, Duration::from_secs_f64(delay_seconds), move || {
            tokio::spawn(async move {
                if let Err(err) = accessor.apply_power(&device_name, protocol, &model, power_on).await {
                    tracing::warn!(device = %device_name, %err, "pulsed power change failed");
                }
            });
        }) {
            tracing::warn!(%err, "failed to schedule pulsed power change");
        }
    }

    async fn apply_power(&self, device_name: &str, protocol: Protocol, model: &Model, power_on: bool) -> Result<()> {
        let state = DeviceState::Switch(Switch {
            power_on_behavior: None,
            power: if power_on { PowerValue::On } else { PowerValue::Off },
            last_seen: None,
        });
        let wire = self
            .encoders
            .encode(model, &state)
            .map_err(Error::Decoding)?;
        let Value::Object(fields) = wire else {
            return Ok(());
        };
        self.set_state(device_name, protocol, &fields).await
    }
}

/// Renders a JSON scalar the way Tasmota command payloads expect raw
/// (non-JSON-encoded) values: strings unquoted, everything else via its
/// normal `Display`.
fn value_to_wire_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
