// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `iotbridge` - normalizes heterogeneous IoT device traffic into one
//! typed MQTT pipeline.
//!
//! Zigbee2MQTT and Tasmota report the same kinds of devices (switches,
//! sensors, valves) through two different topic layouts and payload
//! shapes. This crate subscribes to both, and turns their traffic into a
//! single stream of typed [`state::DeviceState`] values plus a small API
//! ([`accessor::DeviceAccessor`]) for driving devices back, so a consumer
//! never has to know which protocol a given device happens to speak.
//!
//! # Pipeline
//!
//! Four stages, each a tokio task connected to the next by a bounded
//! channel: [`pipeline::Scrutinizer`] turns raw `(topic, payload)` pairs
//! into [`message::Message`]s; [`pipeline::Discoverer`] folds `DISCO`
//! traffic into the [`directory::DeviceDirectory`]; [`pipeline::ModelResolver`]
//! attaches each message's resolved [`model::Model`]; and
//! [`pipeline::AvailabilityNormalizer`]/[`pipeline::StateNormalizer`] decode
//! the remaining traffic into typed state. [`pipeline::build_pipeline`]
//! wires all four up.
//!
//! # Quick start
//!
//! ```no_run
//! use iotbridge::accessor::DeviceAccessor;
//! use iotbridge::directory::DeviceDirectory;
//! use iotbridge::encoder::EncoderRegistry;
//! use iotbridge::model::ModelRegistry;
//! use iotbridge::mqtt::{MqttClient, MqttContext};
//! use iotbridge::pipeline::build_pipeline;
//! use iotbridge::timer::TimerManager;
//! use iotbridge::topic::CommandTopicRegistry;
//! use std::sync::Arc;
//!
//! # async fn example() -> iotbridge::Result<()> {
//! let directory = DeviceDirectory::new();
//! let models = ModelRegistry::with_known_models();
//! let mut pipeline = build_pipeline(directory.clone(), models, 1024);
//!
//! let client = MqttClient::connect(MqttContext::new("localhost", 1883, "iotbridge")).await?;
//! let accessor = DeviceAccessor::new(
//!     Arc::new(client),
//!     CommandTopicRegistry::with_defaults(),
//!     Arc::new(EncoderRegistry::with_builtins()),
//!     directory,
//!     TimerManager::new(),
//! );
//! accessor.get_state("plug1", iotbridge::device::Protocol::Z2M, &iotbridge::model::Model::unknown()).await?;
//! # let _ = pipeline.refined_rx.recv().await;
//! # Ok(())
//! # }
//! ```

pub mod accessor;
pub mod device;
pub mod directory;
pub mod encoder;
pub mod error;
pub mod message;
pub mod model;
pub mod mqtt;
pub mod pipeline;
pub mod state;
pub mod timer;
pub mod topic;

pub use accessor::DeviceAccessor;
pub use device::{Device, Protocol};
pub use directory::DeviceDirectory;
pub use error::{ConfigError, DecodingError, Error, ProtocolError, Result, TimerError};
pub use message::{Item, Message, MessageType, Registry};
pub use model::{Model, ModelRegistry};
pub use pipeline::{build_pipeline, NewDeviceEvent, Pipeline};
pub use state::DeviceState;
pub use timer::TimerManager;
pub use topic::{CommandTopicRegistry, TopicRegistry};
