// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device single-in-flight one-shot timers, used by
//! [`DeviceAccessor`](crate::accessor::DeviceAccessor) for countdown and
//! on/off-duration behavior.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::error::TimerError;

/// Tracks at most one scheduled timer per device name.
///
/// Scheduling a new timer for a device that already has one cancels the
/// existing one first; cancellation is `JoinHandle::abort`, which cannot
/// interrupt a callback that has already started running its body, only
/// one still waiting to fire.
#[derive(Clone, Default)]
pub struct TimerManager {
    timers: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
}

impl TimerManager {
    /// Creates an empty timer manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `callback` to run after `delay`, replacing and
    /// cancelling any timer already scheduled for `device_name`.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::ScheduleFailed`] if the callback task could
    /// not be spawned (practically unreachable on a running tokio
    /// runtime).
    pub fn create_timer<F>(&self, device_name: &str, delay: Duration, callback: F) -> Result<(), TimerError>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut timers = self.timers.lock();
        if let Some(existing) = timers.remove(device_name) {
            existing.abort();
        }

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
        timers.insert(device_name.to_string(), handle);
        Ok(())
    }

    /// Cancels the timer scheduled for `device_name`, if any.
    pub fn cancel_timer(&self, device_name: &str) {
        if let Some(handle) = self.timers.lock().remove(device_name) {
            handle.abort();
        }
    }

    /// Best-effort check for whether `device_name` has a timer scheduled.
    ///
    /// This only reflects registry membership: a timer whose callback has
    /// already started running (and not yet cleaned up its own entry) and
    /// one still waiting to fire are indistinguishable here.
    #[must_use]
    pub fn is_timer_active(&self, device_name: &str) -> bool {
        self.timers.lock().contains_key(device_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test(start_paused = true)]
    async fn timer_fires_after_delay() {
        let manager = TimerManager::new();
        let fired = Arc::new(AtomicBool::new(false));
        let fired_clone = Arc::clone(&fired);

        manager
            .create_timer("switch_1", Duration::from_secs(5), move || {
                fired_clone.store(true, Ordering::SeqCst);
            })
            .unwrap();
        assert!(manager.is_timer_active("switch_1"));

        tokio::time::advance(Duration::from_secs(6)).await;
        tokio::task::yield_now().await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn scheduling_replaces_previous_timer() {
        let manager = TimerManager::new();
        let first_fired = Arc::new(AtomicBool::new(false));
        let second_fired = Arc::new(AtomicBool::new(false));

        let first = Arc::clone(&first_fired);
        manager
            .create_timer("switch_1", Duration::from_secs(10), move || {
                first.store(true, Ordering::SeqCst);
            })
            .unwrap();

        let second = Arc::clone(&second_fired);
        manager
            .create_timer("switch_1", Duration::from_secs(1), move || {
                second.store(true, Ordering::SeqCst);
            })
            .unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert!(second_fired.load(Ordering::SeqCst));
        assert!(!first_fired.load(Ordering::SeqCst));
    }

    #[test]
    fn no_timer_is_not_active() {
        let manager = TimerManager::new();
        assert!(!manager.is_timer_active("nope"));
    }
}
