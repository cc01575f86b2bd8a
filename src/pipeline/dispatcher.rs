// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Generic pipeline stage: an ordered list of `(condition, handler)` pairs
//! applied to messages read from one channel and forwarded to another.
//!
//! Mirrors the producer/consumer dispatcher used to wire up the reference
//! bridge's processing stages, translated from a thread-per-stage model to
//! a tokio task per stage.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::message::Message;

static DISPATCHER_INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A message moving through a [`Dispatcher`]'s channel, plus the sentinel
/// used to request a graceful stop.
#[derive(Debug)]
pub enum DispatcherMsg {
    /// A message to process.
    Data(Message),
    /// Sentinel requesting the dispatcher stop after everything already
    /// queued ahead of it has been processed.
    Stop,
}

/// A predicate deciding whether a handler applies to a given message.
pub type Condition = Arc<dyn Fn(&Message) -> bool + Send + Sync>;

/// Transforms (or drops, by returning `None`) a message.
pub type Handler = Arc<dyn Fn(Message) -> Option<Message> + Send + Sync>;

/// Wraps a plain function in an [`Arc`] for use as a [`Condition`].
pub fn condition<F>(f: F) -> Condition
where
    F: Fn(&Message) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wraps a plain function in an [`Arc`] for use as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(Message) -> Option<Message> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// One stage of the pipeline.
///
/// Reads [`DispatcherMsg`]s from `input`, applies the first handler whose
/// condition matches (logging a warning if more than one condition
/// matches the same message), falls back to `default_handler` when none
/// match, and forwards whatever the handler returns to `output`, if any.
pub struct Dispatcher {
    name: String,
    input: mpsc::Receiver<DispatcherMsg>,
    output: Option<mpsc::Sender<DispatcherMsg>>,
    handlers: Vec<(Condition, Handler)>,
    default_handler: Option<Handler>,
    force_stop: Arc<AtomicBool>,
}

impl Dispatcher {
    /// Creates a dispatcher reading from `input` and forwarding to
    /// `output` (if given).
    #[must_use]
    pub fn new(input: mpsc::Receiver<DispatcherMsg>, output: Option<mpsc::Sender<DispatcherMsg>>) -> Self {
        let n = DISPATCHER_INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self {
            name: format!("Dispatcher#{n}"),
            input,
            output,
            handlers: Vec::new(),
            default_handler: None,
            force_stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Overrides the auto-generated `Dispatcher#N` name, for clearer logs.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a conditional handler. Handlers are tried in registration
    /// order; the first whose condition matches wins.
    #[must_use]
    pub fn with_handler(mut self, condition: Condition, handler: Handler) -> Self {
        self.handlers.push((condition, handler));
        self
    }

    /// Sets the handler applied when no conditional handler matches.
    /// Without one, an unmatched message is forwarded unchanged.
    #[must_use]
    pub fn with_default_handler(mut self, handler: Handler) -> Self {
        self.default_handler = Some(handler);
        self
    }

    /// A handle that, when set, causes the dispatcher's run loop to exit
    /// on its next 1-second poll without draining the remainder of the
    /// input channel.
    #[must_use]
    pub fn force_stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.force_stop)
    }

    /// Runs the dispatcher loop until [`DispatcherMsg::Stop`] is received,
    /// the input channel closes, or the force-stop flag is set.
    ///
    /// Polls with a 1 second timeout so the force-stop flag is checked
    /// even while idle.
    pub async fn run(mut self) {
        loop {
            if self.force_stop.load(Ordering::Relaxed) {
                tracing::debug!(dispatcher = %self.name, "force stop requested");
                break;
            }
            match tokio::time::timeout(Duration::from_secs(1), self.input.recv()).await {
                Ok(Some(DispatcherMsg::Stop)) => {
                    tracing::debug!(dispatcher = %self.name, "graceful stop requested");
                    break;
                }
                Ok(Some(DispatcherMsg::Data(msg))) => {
                    self.process_and_forward(msg).await;
                }
                Ok(None) => {
                    tracing::debug!(dispatcher = %self.name, "input channel closed");
                    break;
                }
                Err(_timeout) => {}
            }
        }
    }

    /// Spawns [`Self::run`] as a tokio task.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn process_and_forward(&self, msg: Message) {
        let mut matched_handler = None;
        for (cond, handler) in &self.handlers {
            if cond(&msg) {
                if matched_handler.is_some() {
                    tracing::warn!(
                        dispatcher = %self.name,
                        message_id = %msg.id,
                        "more than one handler condition matched; using the first"
                    );
                    continue;
                }
                matched_handler = Some(handler);
            }
        }

        let result = match matched_handler {
            Some(handler) => handler(msg),
            None => match &self.default_handler {
                Some(default) => default(msg),
                None => Some(msg),
            },
        };

        let Some(out_msg) = result else {
            return;
        };

        if let Some(output) = &self.output {
            let send = output.send(DispatcherMsg::Data(out_msg));
            if tokio::time::timeout(Duration::from_secs(1), send).await.is_err() {
                tracing::warn!(dispatcher = %self.name, "timed out forwarding message downstream, dropping");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Protocol;
    use crate::message::{Item, MessageType};
    use serde_json::Value;

    fn msg(tag: &str) -> Message {
        Message::new(
            tag,
            Item::new("dev", Protocol::Z2M, MessageType::State, Value::Null),
        )
    }

    #[tokio::test]
    async fn forwards_unmatched_message_unchanged_by_default() {
        let (tx_in, rx_in) = mpsc::channel(8);
        let (tx_out, mut rx_out) = mpsc::channel(8);
        let dispatcher = Dispatcher::new(rx_in, Some(tx_out));
        let handle = dispatcher.spawn();

        tx_in.send(DispatcherMsg::Data(msg("STATE"))).await.unwrap();
        let DispatcherMsg::Data(out) = rx_out.recv().await.unwrap() else {
            panic!("expected data");
        };
        assert_eq!(out.tag, "STATE");

        tx_in.send(DispatcherMsg::Stop).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn matching_handler_is_applied() {
        let (tx_in, rx_in) = mpsc::channel(8);
        let (tx_out, mut rx_out) = mpsc::channel(8);
        let dispatcher = Dispatcher::new(rx_in, Some(tx_out)).with_handler(
            condition(|m| m.tag == "STATE"),
            handler(|mut m| {
                m.tag = "HANDLED".to_string();
                Some(m)
            }),
        );
        let handle = dispatcher.spawn();

        tx_in.send(DispatcherMsg::Data(msg("STATE"))).await.unwrap();
        let DispatcherMsg::Data(out) = rx_out.recv().await.unwrap() else {
            panic!("expected data");
        };
        assert_eq!(out.tag, "HANDLED");

        tx_in.send(DispatcherMsg::Stop).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn handler_returning_none_drops_message() {
        let (tx_in, rx_in) = mpsc::channel(8);
        let (tx_out, mut rx_out) = mpsc::channel(8);
        let dispatcher =
            Dispatcher::new(rx_in, Some(tx_out)).with_handler(condition(|_| true), handler(|_| None));
        let handle = dispatcher.spawn();

        tx_in.send(DispatcherMsg::Data(msg("STATE"))).await.unwrap();
        tx_in.send(DispatcherMsg::Stop).await.unwrap();
        handle.await.unwrap();
        assert!(rx_out.try_recv().is_err());
    }

    #[tokio::test]
    async fn force_stop_exits_without_draining() {
        let (_tx_in, rx_in) = mpsc::channel(8);
        let dispatcher = Dispatcher::new(rx_in, None);
        let stop_flag = dispatcher.force_stop_flag();
        let handle = dispatcher.spawn();
        stop_flag.store(true, Ordering::Relaxed);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("dispatcher should stop promptly")
            .unwrap();
    }
}
