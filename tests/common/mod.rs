// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scriptable controller and recording subscribers shared by the
//! integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use intesis_lib::{
    Controller, ControllerError, DeviceId, DeviceSnapshot, Devices, UpdateCallback, ZoneCommand,
};
use parking_lot::Mutex;

#[derive(Default)]
struct State {
    live: AtomicBool,
    connect_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    connect_results: Mutex<VecDeque<Result<(), ControllerError>>>,
    connect_delay: Mutex<Duration>,
    listeners: Mutex<Vec<UpdateCallback>>,
    devices: Mutex<Devices>,
    zone_commands: Mutex<Vec<(DeviceId, u8, ZoneCommand)>>,
}

/// Controller stub whose link flag and connect outcomes are set by the test.
///
/// Clones share state, so the test keeps one clone and hands the other to the
/// supervisor.
#[derive(Clone, Default)]
pub struct MockController(Arc<State>);

impl MockController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the controller's own link flag.
    pub fn set_live(&self, live: bool) {
        self.0.live.store(live, Ordering::SeqCst);
    }

    /// Queues the outcome of the next `connect` call. Unqueued calls succeed.
    pub fn push_connect_result(&self, result: Result<(), ControllerError>) {
        self.0.connect_results.lock().push_back(result);
    }

    /// Makes every later `connect` take `delay` before it resolves.
    pub fn set_connect_delay(&self, delay: Duration) {
        *self.0.connect_delay.lock() = delay;
    }

    pub fn fail_next_connects(&self, times: usize) {
        for n in 0..times {
            self.push_connect_result(Err(ControllerError::Connection(format!("attempt {n}"))));
        }
    }

    pub fn set_devices(&self, devices: Devices) {
        *self.0.devices.lock() = devices;
    }

    pub fn insert_device(&self, id: &str, snapshot: DeviceSnapshot) {
        self.0.devices.lock().insert(DeviceId::new(id), snapshot);
    }

    pub fn connect_calls(&self) -> usize {
        self.0.connect_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.0.stop_calls.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.0.listeners.lock().len()
    }

    pub fn zone_commands(&self) -> Vec<(DeviceId, u8, ZoneCommand)> {
        self.0.zone_commands.lock().clone()
    }

    /// Fires an update at every registered listener, as the vendor client
    /// would after receiving a push.
    pub async fn fire(&self, device_id: Option<&str>) {
        let listeners = self.0.listeners.lock().clone();
        for listener in listeners {
            listener.call(device_id.map(DeviceId::new)).await;
        }
    }

    /// Drops the link and reports it.
    pub async fn drop_link(&self) {
        self.set_live(false);
        self.fire(None).await;
    }
}

impl Controller for MockController {
    async fn connect(&self) -> Result<(), ControllerError> {
        self.0.connect_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.0.connect_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let result = self.0.connect_results.lock().pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            self.set_live(true);
        }
        result
    }

    async fn stop(&self) {
        self.0.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.set_live(false);
    }

    fn is_connected(&self) -> bool {
        self.0.live.load(Ordering::SeqCst)
    }

    fn get_devices(&self) -> Devices {
        self.0.devices.lock().clone()
    }

    async fn set_zone_status(
        &self,
        device_id: &DeviceId,
        zone: u8,
        command: ZoneCommand,
    ) -> Result<(), ControllerError> {
        if !self.is_connected() {
            return Err(ControllerError::Connection("offline".to_string()));
        }
        self.0
            .zone_commands
            .lock()
            .push((device_id.clone(), zone, command));
        Ok(())
    }

    fn add_update_callback(&self, callback: UpdateCallback) {
        let mut listeners = self.0.listeners.lock();
        if !listeners.contains(&callback) {
            listeners.push(callback);
        }
    }

    fn remove_update_callback(&self, callback: &UpdateCallback) {
        self.0.listeners.lock().retain(|l| l != callback);
    }
}

/// A subscriber that records every device id it is called with.
#[derive(Clone)]
pub struct Recorder {
    pub callback: UpdateCallback,
    calls: Arc<Mutex<Vec<Option<DeviceId>>>>,
}

impl Recorder {
    pub fn new() -> Self {
        let calls: Arc<Mutex<Vec<Option<DeviceId>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let callback = UpdateCallback::new(move |device_id| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().push(device_id);
            }
        });
        Self { callback, calls }
    }

    pub fn calls(&self) -> Vec<Option<DeviceId>> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}
