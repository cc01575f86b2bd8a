// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Thin CLI: connects to a broker, runs the pipeline, and prints every
//! normalized message to stdout. Intended for manual testing against a
//! real Zigbee2MQTT/Tasmota setup, not as the bridge's only front end.

use std::env;
use std::sync::Arc;

use iotbridge::accessor::DeviceAccessor;
use iotbridge::directory::DeviceDirectory;
use iotbridge::encoder::EncoderRegistry;
use iotbridge::message::MessageType;
use iotbridge::model::ModelRegistry;
use iotbridge::mqtt::{MqttClient, MqttContext, SecurityContext};
use iotbridge::pipeline::{build_pipeline, Scrutinizer};
use iotbridge::timer::TimerManager;
use iotbridge::topic::{CommandTopicRegistry, TopicRegistry};

#[tokio::main]
async fn main() -> iotbridge::Result<()> {
    tracing_subscriber_init();

    let host = env::var("IOTBRIDGE_MQTT_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port: u16 = env::var("IOTBRIDGE_MQTT_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(1883);
    let mut context = MqttContext::new(host, port, "iotbridge");
    if let (Ok(username), Ok(password)) = (env::var("IOTBRIDGE_MQTT_USER"), env::var("IOTBRIDGE_MQTT_PASSWORD")) {
        context = context.with_security(SecurityContext::new(username, password));
    }

    let client = MqttClient::connect(context).await?;
    let topics = TopicRegistry::with_defaults();
    for pattern in topics.subscribe_patterns() {
        client.subscribe(pattern).await?;
    }

    let directory = DeviceDirectory::new();
    let models = ModelRegistry::with_known_models();
    let mut pipeline = build_pipeline(directory.clone(), models, 1024);

    let accessor = Arc::new(DeviceAccessor::new(
        Arc::new(client.clone()),
        CommandTopicRegistry::with_defaults(),
        Arc::new(EncoderRegistry::with_builtins()),
        directory,
        TimerManager::new(),
    ));

    let scrutinizer = Scrutinizer::new(TopicRegistry::with_defaults());
    let raw_tx = pipeline.raw_tx.clone();
    client.message_callback_add(
        "#",
        Arc::new(move |topic: &str, payload: &[u8]| {
            if let Some(message) = scrutinizer.to_message(topic, payload) {
                let tx = raw_tx.clone();
                let message = iotbridge::pipeline::DispatcherMsg::Data(message);
                tokio::spawn(async move {
                    let _ = tx.send(message).await;
                });
            }
        }),
    );

    tokio::time::sleep(pipeline.discovery_grace_period).await;

    loop {
        tokio::select! {
            event = pipeline.new_device_rx.recv() => {
                let Some(event) = event else {
                    break;
                };
                let accessor = Arc::clone(&accessor);
                tokio::spawn(async move {
                    if let Err(err) = accessor
                        .get_state(&event.device_name, event.protocol, &iotbridge::model::Model::unknown())
                        .await
                    {
                        tracing::warn!(device = %event.device_name, %err, "initial get_state failed");
                    }
                });
            }
            message = pipeline.refined_rx.recv() => {
                let Some(message) = message else {
                    break;
                };
                if let iotbridge::pipeline::DispatcherMsg::Data(message) = message {
                    if message.item.message_type == MessageType::State {
                        println!("{} {} {}", message.item.device_name, message.tag, message.item.payload);
                    }
                }
            }
        }
    }

    Ok(())
}

fn tracing_subscriber_init() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
