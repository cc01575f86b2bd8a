// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The broker connection this bridge runs against.
//!
//! A cloneable, `Arc`-backed handle wrapping `rumqttc::AsyncClient` plus a
//! background task that drains the `rumqttc::EventLoop` and dispatches
//! inbound publishes to whichever registered callback's pattern matches,
//! rather than every caller pattern-matching the raw topic itself.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::oneshot;

use crate::accessor::{BoxFuture, Publisher, Qos as AccessorQos};
use crate::error::{ProtocolError, Result};
use crate::mqtt::context::MqttContext;

static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A callback fired for every inbound publish whose topic matches its
/// registered pattern.
type MessageCallback = Arc<dyn Fn(&str, &[u8]) + Send + Sync>;

/// A callback fired once per successful `CONNACK`.
type ConnectCallback = Arc<dyn Fn() + Send + Sync>;

/// A connected MQTT client.
///
/// Cheaply cloneable; the clone shares the same underlying
/// `rumqttc::AsyncClient` and callback registries.
#[derive(Clone)]
pub struct MqttClient {
    inner: Arc<Inner>,
}

struct Inner {
    client: AsyncClient,
    connected: AtomicBool,
    message_callbacks: RwLock<Vec<(String, MessageCallback)>>,
    connect_callbacks: RwLock<Vec<ConnectCallback>>,
}

impl MqttClient {
    /// Opens a connection described by `context` and starts the background
    /// event-loop task.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ConnectionFailed`] if the broker does not
    /// acknowledge the connection within `context.connection_timeout`.
    pub async fn connect(context: MqttContext) -> Result<Self> {
        let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let client_id = format!("{}_{}_{counter}", context.client_id, std::process::id());

        let mut options = MqttOptions::new(client_id, &context.host, context.port);
        options.set_keep_alive(context.keep_alive);
        options.set_clean_session(true);
        if let Some(security) = &context.security {
            options.set_credentials(&security.username, &security.password);
        }

        let (client, event_loop) = AsyncClient::new(options, 64);

        let inner = Arc::new(Inner {
            client,
            connected: AtomicBool::new(false),
            message_callbacks: RwLock::new(Vec::new()),
            connect_callbacks: RwLock::new(Vec::new()),
        });
        let mqtt_client = Self { inner };

        let (connack_tx, connack_rx) = oneshot::channel();
        let background = mqtt_client.clone();
        tokio::spawn(async move {
            drain_event_loop(event_loop, background, Some(connack_tx)).await;
        });

        match tokio::time::timeout(context.connection_timeout, connack_rx).await {
            Ok(Ok(())) => {
                mqtt_client.inner.connected.store(true, Ordering::Release);
                tracing::info!(host = %context.host, port = context.port, "connected to MQTT broker");
            }
            Ok(Err(_)) => {
                return Err(ProtocolError::ConnectionFailed("event loop terminated before CONNACK".to_string()).into());
            }
            Err(_) => {
                return Err(ProtocolError::ConnectionFailed(format!(
                    "no CONNACK within {}s",
                    context.connection_timeout.as_secs()
                ))
                .into());
            }
        }

        Ok(mqtt_client)
    }

    /// Whether the client currently believes it is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    /// Subscribes to an MQTT topic filter (`+`/`#` wildcards allowed).
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Mqtt`] if the subscribe request could not
    /// be sent.
    pub async fn subscribe(&self, filter: &str) -> Result<()> {
        self.inner
            .client
            .subscribe(filter, QoS::AtLeastOnce)
            .await
            .map_err(ProtocolError::Mqtt)?;
        Ok(())
    }

    /// Registers `callback` to run for every inbound publish whose topic
    /// matches `pattern`, instead of every caller re-testing the raw topic
    /// string itself.
    pub fn message_callback_add(&self, pattern: impl Into<String>, callback: MessageCallback) {
        self.inner.message_callbacks.write().push((pattern.into(), callback));
    }

    /// Registers `callback` to run once per successful `CONNACK`,
    /// including reconnects.
    pub fn on_connect(&self, callback: ConnectCallback) {
        self.inner.connect_callbacks.write().push(callback);
    }

    fn dispatch(&self, topic: &str, payload: &[u8]) {
        for (pattern, callback) in self.inner.message_callbacks.read().iter() {
            if crate::topic::topic_matches(pattern, topic) {
                callback(topic, payload);
            }
        }
    }
}

impl Publisher for MqttClient {
    fn publish(&self, topic: String, payload: Vec<u8>, qos: AccessorQos, retain: bool) -> BoxFuture<Result<()>> {
        let client = self.inner.client.clone();
        let qos = match qos {
            AccessorQos::AtMostOnce => QoS::AtMostOnce,
            AccessorQos::AtLeastOnce => QoS::AtLeastOnce,
        };
        Box::pin(async move {
            client
                .publish(topic, qos, retain, payload)
                .await
                .map_err(ProtocolError::Mqtt)?;
            Ok(())
        })
    }
}

async fn drain_event_loop(mut event_loop: EventLoop, client: MqttClient, connack_tx: Option<oneshot::Sender<()>>) {
    let mut connack_tx = connack_tx;
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                client.inner.connected.store(true, Ordering::Release);
                if let Some(tx) = connack_tx.take() {
                    let _ = tx.send(());
                }
                for callback in client.inner.connect_callbacks.read().iter() {
                    callback();
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                client.dispatch(&publish.topic, &publish.payload);
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                tracing::info!("MQTT broker disconnected");
                client.inner.connected.store(false, Ordering::Release);
                break;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::error!(%err, "MQTT event loop error");
                client.inner.connected.store(false, Ordering::Release);
                break;
            }
        }
    }
}
