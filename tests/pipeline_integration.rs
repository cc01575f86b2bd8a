// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end pipeline tests: raw `(topic, payload)` pairs in through
//! [`Scrutinizer`], refined messages and directory updates out.
//!
//! These exercise the same four stages a live broker connection would
//! drive, without needing one — mockforge-mqtt's broker doesn't forward
//! publishes between clients (see `tests/mqtt_integration.rs`), so the
//! realistic entry point for a pipeline test is `Scrutinizer::to_message`
//! feeding `Pipeline::raw_tx` directly.

use std::time::Duration;

use iotbridge::device::{Device, Protocol};
use iotbridge::directory::DeviceDirectory;
use iotbridge::message::MessageType;
use iotbridge::model::ModelRegistry;
use iotbridge::pipeline::{build_pipeline, DispatcherMsg, Scrutinizer};
use iotbridge::topic::TopicRegistry;

async fn recv_refined(pipeline: &mut iotbridge::pipeline::Pipeline) -> iotbridge::message::Message {
    let DispatcherMsg::Data(message) = tokio::time::timeout(Duration::from_secs(1), pipeline.refined_rx.recv())
        .await
        .expect("refined message within timeout")
        .expect("refined channel still open")
    else {
        panic!("expected a Data message");
    };
    message
}

#[tokio::test]
async fn z2m_switch_state_normalizes_to_switch_variant() {
    let directory = DeviceDirectory::new();
    let models = ModelRegistry::new();
    let mut plug1 = Device::new("plug1", Protocol::Z2M);
    plug1.model = models.intern("SN_SMART_PLUG");
    directory.update_device(plug1);

    let mut pipeline = build_pipeline(directory, models, 16);
    let scrutinizer = Scrutinizer::new(TopicRegistry::with_defaults());

    let message = scrutinizer
        .to_message("zigbee2mqtt/plug1", br#"{"state":"ON"}"#)
        .expect("topic resolves");
    pipeline.raw_tx.send(DispatcherMsg::Data(message)).await.unwrap();

    let refined = recv_refined(&mut pipeline).await;
    assert_eq!(refined.item.device_name, "plug1");
    assert_eq!(refined.item.protocol, Protocol::Z2M);
    assert_eq!(refined.item.message_type, MessageType::State);
    assert_eq!(refined.model.as_str(), "SN_SMART_PLUG");
    assert_eq!(refined.item.payload["kind"], "Switch");
    assert_eq!(refined.item.payload["power"], "ON");
}

#[tokio::test]
async fn tasmota_lwt_normalizes_to_online_availability() {
    let directory = DeviceDirectory::new();
    directory.update_device(Device::new("shelly1", Protocol::Tasmota));

    let mut pipeline = build_pipeline(directory, ModelRegistry::new(), 16);
    let scrutinizer = Scrutinizer::new(TopicRegistry::with_defaults());

    let message = scrutinizer
        .to_message("tele/shelly1/LWT", b"Online")
        .expect("topic resolves");
    pipeline.raw_tx.send(DispatcherMsg::Data(message)).await.unwrap();

    let refined = recv_refined(&mut pipeline).await;
    assert_eq!(refined.item.device_name, "shelly1");
    assert_eq!(refined.item.message_type, MessageType::Availability);
    assert_eq!(refined.item.payload, serde_json::json!("Online"));
}

#[tokio::test]
async fn z2m_bridge_devices_populates_directory_and_skips_coordinator() {
    let directory = DeviceDirectory::new();
    let mut pipeline = build_pipeline(directory.clone(), ModelRegistry::new(), 16);
    let scrutinizer = Scrutinizer::new(TopicRegistry::with_defaults());

    let payload = br#"[
        {"friendly_name":"plug1","ieee_address":"0x1","type":"EndDevice","definition":{"model":"S26R2ZB"}},
        {"friendly_name":"coord","type":"Coordinator"}
    ]"#;
    let message = scrutinizer
        .to_message("zigbee2mqtt/bridge/devices", payload)
        .expect("topic resolves");
    pipeline.raw_tx.send(DispatcherMsg::Data(message)).await.unwrap();

    let refined = recv_refined(&mut pipeline).await;
    assert_eq!(refined.item.message_type, MessageType::Disco);
    let registry: iotbridge::message::Registry = serde_json::from_value(refined.item.payload).unwrap();
    assert_eq!(registry.device_names, vec!["plug1".to_string()]);

    let plug = directory.get_device("plug1").expect("plug1 in directory");
    assert_eq!(plug.model.as_str(), "SN_SMART_PLUG");
    assert!(directory.get_device("coord").is_none());
}

#[tokio::test]
async fn srts_a01_out_of_range_setpoint_is_dropped_and_pipeline_keeps_running() {
    let directory = DeviceDirectory::new();
    let models = ModelRegistry::new();
    let mut trv1 = Device::new("trv1", Protocol::Z2M);
    trv1.model = models.intern("SRTS_A01");
    directory.update_device(trv1);

    let mut pipeline = build_pipeline(directory.clone(), models, 16);
    let scrutinizer = Scrutinizer::new(TopicRegistry::with_defaults());

    let bad = scrutinizer
        .to_message("zigbee2mqtt/trv1", br#"{"occupied_heating_setpoint":40}"#)
        .expect("topic resolves");
    pipeline.raw_tx.send(DispatcherMsg::Data(bad)).await.unwrap();

    // Nothing should come out for the rejected payload...
    let drained = tokio::time::timeout(Duration::from_millis(300), pipeline.refined_rx.recv()).await;
    assert!(drained.is_err(), "expected no refined message for the out-of-range payload");

    // ...but the pipeline is still alive and processes the next message normally.
    let good = scrutinizer
        .to_message("zigbee2mqtt/trv1", br#"{"occupied_heating_setpoint":21.0}"#)
        .expect("topic resolves");
    pipeline.raw_tx.send(DispatcherMsg::Data(good)).await.unwrap();
    let refined = recv_refined(&mut pipeline).await;
    assert_eq!(refined.item.payload["kind"], "SrtsA01");
}
