// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wires the four pipeline stages together: scrutinize, discover, resolve
//! model, normalize.
//!
//! ```text
//! Scrutinizer -> raw_queue -> Stage1(Discoverer) -> layer1_queue
//!             -> Stage2(ModelResolver) -> layer2_queue
//!             -> Stage3(AvailabilityNormalizer | StateNormalizer) -> refined_queue
//! ```

pub mod availability_normalizer;
pub mod discoverer;
pub mod dispatcher;
pub mod model_resolver;
pub mod scrutinizer;
pub mod state_normalizer;

pub use availability_normalizer::AvailabilityNormalizer;
pub use discoverer::Discoverer;
pub use dispatcher::{condition, handler, Condition, Dispatcher, DispatcherMsg, Handler};
pub use model_resolver::ModelResolver;
pub use scrutinizer::Scrutinizer;
pub use state_normalizer::StateNormalizer;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::device::Protocol;
use crate::directory::DeviceDirectory;
use crate::message::Registry;
use crate::model::ModelRegistry;
use crate::topic::TopicRegistry;

/// Emitted by stage 2's default handler for every friendly name present
/// in a freshly processed `DISCO` registry snapshot, so whatever consumer
/// owns the broker connection (normally a
/// [`DeviceAccessor`](crate::accessor::DeviceAccessor)) can request a
/// state refresh for devices it has not seen telemetry from yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeviceEvent {
    /// Friendly name of the newly discovered device.
    pub device_name: String,
    /// Protocol it was discovered through.
    pub protocol: Protocol,
}

/// Channels and task handles for a running pipeline.
pub struct Pipeline {
    /// Feed raw-scrutinized messages in here.
    pub raw_tx: mpsc::Sender<DispatcherMsg>,
    /// Fully normalized messages come out here.
    pub refined_rx: mpsc::Receiver<DispatcherMsg>,
    /// Fires once per friendly name the moment it is first discovered.
    pub new_device_rx: mpsc::UnboundedReceiver<NewDeviceEvent>,
    /// Join handles for the three stage tasks, in stage order.
    pub stage_handles: Vec<JoinHandle<()>>,
    /// How long a caller should wait after triggering initial discovery
    /// before relying on the directory being populated. Z2M's bridge can
    /// take a moment to publish its device list after subscribing; state
    /// traffic that arrives before that publish resolves against a device
    /// the directory does not know about yet. This is not resolved here,
    /// only documented.
    pub discovery_grace_period: Duration,
}

/// Builds and spawns the three pipeline stages.
///
/// `channel_capacity` bounds every inter-stage queue; when a stage's
/// output channel is full, forwarding to it times out after one second
/// and the message is dropped (see [`Dispatcher::process_and_forward`]),
/// the pipeline's backpressure-shedding behavior.
#[must_use]
pub fn build_pipeline(
    directory: DeviceDirectory,
    models: ModelRegistry,
    channel_capacity: usize,
) -> Pipeline {
    let (raw_tx, raw_rx) = mpsc::channel(channel_capacity);
    let (layer1_tx, layer1_rx) = mpsc::channel(channel_capacity);
    let (layer2_tx, layer2_rx) = mpsc::channel(channel_capacity);
    let (refined_tx, refined_rx) = mpsc::channel(channel_capacity);
    let (new_device_tx, new_device_rx) = mpsc::unbounded_channel();

    let discoverer = Discoverer::new(directory.clone(), models.clone());
    let stage1 = Dispatcher::new(raw_rx, Some(layer1_tx))
        .named("Dispatcher#discoverer")
        .with_handler(
            condition(|m| m.tag == "DISCO"),
            handler(move |m| discoverer.process(m)),
        );

    let resolver = ModelResolver::new(directory.clone(), models);
    let stage2 = Dispatcher::new(layer1_rx, Some(layer2_tx))
        .named("Dispatcher#model_resolver")
        .with_handler(
            condition(|m| m.tag != "DISCO"),
            handler(move |m| resolver.process(m)),
        )
        .with_default_handler(handler(move |m| {
            notify_new_devices(&m, &new_device_tx);
            Some(m)
        }));

    let availability_normalizer = AvailabilityNormalizer;
    let state_normalizer = StateNormalizer;
    let stage3 = Dispatcher::new(layer2_rx, Some(refined_tx))
        .named("Dispatcher#normalizer")
        .with_handler(
            condition(|m| m.tag == "AVAILABILITY"),
            handler(move |m| availability_normalizer.process(m)),
        )
        .with_handler(
            condition(|m| m.tag == "STATE" || m.tag == "SENSOR"),
            handler(move |m| state_normalizer.process(m)),
        );

    let stage_handles = vec![stage1.spawn(), stage2.spawn(), stage3.spawn()];

    Pipeline {
        raw_tx,
        refined_rx,
        new_device_rx,
        stage_handles,
        discovery_grace_period: Duration::from_secs(2),
    }
}

fn notify_new_devices(message: &crate::message::Message, tx: &mpsc::UnboundedSender<NewDeviceEvent>) {
    let Ok(registry) = serde_json::from_value::<Registry>(message.item.payload.clone()) else {
        return;
    };
    for device_name in registry.device_names {
        let _ = tx.send(NewDeviceEvent {
            device_name,
            protocol: registry.protocol,
        });
    }
}

/// Default bound for inter-stage channels: generous enough that a
/// momentary burst (a Z2M bridge re-announcing all devices) doesn't back
/// up, small enough that a stalled consumer sheds load instead of
/// growing without bound.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Builds the default topic/command topic registries this crate's
/// pipeline is intended to run against.
#[must_use]
pub fn default_topics() -> TopicRegistry {
    TopicRegistry::with_defaults()
}
