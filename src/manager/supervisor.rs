// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection supervisor wrapping one vendor controller.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::controller::Controller;
use crate::error::ControllerError;
use crate::subscription::{SubscriberSet, UpdateCallback};
use crate::types::{DeviceClass, DeviceId, DeviceSnapshot, DeviceType, Devices, ZoneCommand};

use super::entry_config::EntryConfig;
use super::link_state::LinkState;
use super::policy::ReconnectPolicy;

/// Keeps a vendor controller connected and relays its updates to entities.
///
/// The supervisor owns the controller for its whole life. It registers a
/// single relay listener with the controller and fans every update out to
/// its own subscribers. After each update it compares the controller's view
/// of the link with its own belief:
///
/// - controller down, belief up: the belief drops and a reconnection episode
///   is started after the policy's initial delay. Each failed attempt waits
///   twice as long as the previous one, up to the policy's ceiling. A
///   successful attempt restores the belief and notifies every subscriber
///   with `None`.
/// - controller up, belief down: the belief is restored quietly.
///
/// At most one reconnection episode runs at a time. [`stop`](Self::stop)
/// cancels it.
///
/// Cloning is cheap and yields a handle to the same supervisor.
///
/// # Examples
///
/// ```no_run
/// use intesis_lib::ConnectionSupervisor;
/// use intesis_lib::controller::Controller;
/// use intesis_lib::manager::EntryConfig;
/// use intesis_lib::subscription::UpdateCallback;
/// use intesis_lib::types::DeviceType;
///
/// # async fn example<C: Controller>(controller: C) -> Result<(), intesis_lib::ControllerError> {
/// let entry = EntryConfig::new("entry-1", "account", DeviceType::IntesisHome)
///     .with_credentials("user", "pass");
/// let supervisor = ConnectionSupervisor::new(
///     tokio::runtime::Handle::current(),
///     controller,
///     entry,
///     DeviceType::IntesisHome,
/// );
///
/// supervisor.connect().await?;
/// supervisor.add_update_callback(UpdateCallback::new(|device_id| async move {
///     println!("changed: {device_id:?}");
/// }));
///
/// let devices = supervisor.get_devices();
/// println!("{} units", devices.len());
///
/// supervisor.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct ConnectionSupervisor<C: Controller> {
    inner: Arc<Inner<C>>,
}

/// Builder for a [`ConnectionSupervisor`] with non-default settings.
#[must_use]
pub struct SupervisorBuilder<C: Controller> {
    runtime: Handle,
    controller: C,
    entry: EntryConfig,
    device_type: DeviceType,
    policy: ReconnectPolicy,
}

impl<C: Controller> SupervisorBuilder<C> {
    /// Sets the reconnection timing.
    pub fn policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builds the supervisor. Nothing is connected yet.
    pub fn build(self) -> ConnectionSupervisor<C> {
        let (state_tx, _) = watch::channel(LinkState::Disconnected);

        let inner = Arc::new_cyclic(|weak: &Weak<Inner<C>>| {
            let weak = weak.clone();
            let relay = UpdateCallback::new(move |device_id| {
                let weak = weak.clone();
                async move {
                    if let Some(inner) = weak.upgrade() {
                        inner.on_controller_event(device_id).await;
                    }
                }
            });

            Inner {
                runtime: self.runtime,
                controller: self.controller,
                entry: self.entry,
                device_type: self.device_type,
                policy: self.policy,
                subscribers: SubscriberSet::new(),
                relay,
                link: Mutex::new(Link::default()),
                state_tx,
            }
        });

        ConnectionSupervisor { inner }
    }
}

struct Inner<C: Controller> {
    runtime: Handle,
    controller: C,
    entry: EntryConfig,
    device_type: DeviceType,
    policy: ReconnectPolicy,
    subscribers: SubscriberSet,
    /// The one listener registered with the controller.
    relay: UpdateCallback,
    link: Mutex<Link>,
    state_tx: watch::Sender<LinkState>,
}

/// Belief flag and episode bookkeeping, guarded together.
#[derive(Default)]
struct Link {
    connected: bool,
    stopped: bool,
    episode: Option<Episode>,
    next_episode_id: u64,
}

impl Link {
    /// Returns true if episode `id` is the live one and the supervisor runs.
    fn owns_episode(&self, id: u64) -> bool {
        !self.stopped && self.episode.as_ref().is_some_and(|episode| episode.id == id)
    }
}

struct Episode {
    id: u64,
    phase: EpisodePhase,
    task: JoinHandle<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EpisodePhase {
    /// Sleeping before the next attempt.
    Waiting,
    /// Inside `Controller::connect`.
    Attempting,
}

impl<C: Controller> ConnectionSupervisor<C> {
    /// Creates a supervisor with the default [`ReconnectPolicy`].
    ///
    /// `runtime` is where reconnection episodes are spawned. The controller
    /// must not have any listener from this supervisor registered yet.
    pub fn new(runtime: Handle, controller: C, entry: EntryConfig, device_type: DeviceType) -> Self {
        Self::builder(runtime, controller, entry, device_type).build()
    }

    /// Starts building a supervisor with custom settings.
    pub fn builder(
        runtime: Handle,
        controller: C,
        entry: EntryConfig,
        device_type: DeviceType,
    ) -> SupervisorBuilder<C> {
        SupervisorBuilder {
            runtime,
            controller,
            entry,
            device_type,
            policy: ReconnectPolicy::default(),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Connects the controller and starts relaying its updates.
    ///
    /// # Errors
    ///
    /// Returns the controller's error unchanged. No retry is attempted.
    pub async fn connect(&self) -> Result<(), ControllerError> {
        let inner = &self.inner;
        tracing::debug!(device_type = %inner.device_type, "Connecting to controller");

        inner.controller.connect().await?;

        {
            let mut link = inner.link.lock();
            link.connected = true;
            inner.state_tx.send_replace(LinkState::Connected);
        }
        inner.controller.add_update_callback(inner.relay.clone());

        tracing::debug!(
            device_type = %inner.device_type,
            devices = inner.controller.get_devices().len(),
            "Connected to controller"
        );
        Ok(())
    }

    /// Stops relaying updates, cancels any pending reconnection and stops the
    /// controller.
    ///
    /// The supervisor must not be reused afterwards.
    pub async fn stop(&self) {
        let inner = &self.inner;
        inner.controller.remove_update_callback(&inner.relay);

        let episode = {
            let mut link = inner.link.lock();
            link.stopped = true;
            link.connected = false;
            inner.state_tx.send_replace(LinkState::Stopped);
            link.episode.take()
        };
        if let Some(episode) = episode {
            tracing::debug!(episode = episode.id, "Cancelling pending reconnection");
            episode.task.abort();
        }

        inner.controller.stop().await;
        tracing::debug!(device_type = %inner.device_type, "Controller stopped");
    }

    /// Returns whether the supervisor believes the controller is connected.
    ///
    /// This is not a live probe.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.link.lock().connected
    }

    /// Returns the current link state.
    #[must_use]
    pub fn link_state(&self) -> LinkState {
        self.inner.state_tx.borrow().clone()
    }

    /// Returns a receiver that observes link state changes.
    #[must_use]
    pub fn watch_link_state(&self) -> watch::Receiver<LinkState> {
        self.inner.state_tx.subscribe()
    }

    /// Returns true while a reconnection episode is alive.
    #[must_use]
    pub fn is_reconnecting(&self) -> bool {
        self.inner.link.lock().episode.is_some()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the configuration entry this supervisor was created with.
    #[must_use]
    pub fn entry(&self) -> &EntryConfig {
        &self.inner.entry
    }

    /// Returns the controller flavour.
    #[must_use]
    pub fn device_type(&self) -> DeviceType {
        self.inner.device_type
    }

    /// Returns whether the controller is cloud-hosted or local.
    #[must_use]
    pub fn device_class(&self) -> DeviceClass {
        self.inner.device_type.class()
    }

    /// Returns the reconnection timing in use.
    #[must_use]
    pub fn policy(&self) -> &ReconnectPolicy {
        &self.inner.policy
    }

    // =========================================================================
    // Subscribers
    // =========================================================================

    /// Subscribes to controller updates. Adding a registered callback again
    /// does nothing.
    pub fn add_update_callback(&self, callback: UpdateCallback) {
        if self.inner.subscribers.add(callback) {
            tracing::debug!(
                subscribers = self.inner.subscribers.len(),
                "Update callback added"
            );
        }
    }

    /// Unsubscribes a callback. Unknown callbacks are ignored.
    pub fn remove_update_callback(&self, callback: &UpdateCallback) {
        if self.inner.subscribers.remove(callback) {
            tracing::debug!(
                subscribers = self.inner.subscribers.len(),
                "Update callback removed"
            );
        }
    }

    /// Returns the number of subscribed callbacks.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    /// Handles an update from the controller.
    ///
    /// This is what the relay registered with the controller calls; it is
    /// public so hosts that poll the controller themselves can feed it.
    pub async fn on_controller_event(&self, device_id: Option<DeviceId>) {
        self.inner.on_controller_event(device_id).await;
    }

    // =========================================================================
    // Controller operations
    // =========================================================================

    /// Returns the controller's snapshot of every device.
    #[must_use]
    pub fn get_devices(&self) -> Devices {
        self.inner.controller.get_devices()
    }

    /// Returns the controller's snapshot of one device.
    #[must_use]
    pub fn get_device(&self, device_id: &DeviceId) -> Option<DeviceSnapshot> {
        self.inner.controller.get_device(device_id)
    }

    /// Opens or closes a zone.
    ///
    /// # Errors
    ///
    /// Returns the controller's error unchanged.
    pub async fn set_zone_status(
        &self,
        device_id: &DeviceId,
        zone: u8,
        command: ZoneCommand,
    ) -> Result<(), ControllerError> {
        self.inner
            .controller
            .set_zone_status(device_id, zone, command)
            .await
    }
}

impl<C: Controller> Inner<C> {
    async fn on_controller_event(self: &Arc<Self>, device_id: Option<DeviceId>) {
        self.subscribers.dispatch(device_id.as_ref()).await;

        let live = self.controller.is_connected();
        let mut link = self.link.lock();
        if link.stopped {
            return;
        }

        if !live && link.connected {
            link.connected = false;
            let delay = self.policy.initial_delay(self.device_type.class());
            tracing::info!(
                device_type = %self.device_type,
                delay_secs = delay.as_secs(),
                "Connection to controller lost, reconnecting"
            );
            self.start_episode(&mut link, delay);
        } else if live && !link.connected {
            link.connected = true;
            if link
                .episode
                .as_ref()
                .is_some_and(|episode| episode.phase == EpisodePhase::Waiting)
                && let Some(episode) = link.episode.take()
            {
                episode.task.abort();
            }
            self.state_tx.send_replace(LinkState::Connected);
            tracing::debug!(device_type = %self.device_type, "Connection to controller restored");
        }
    }

    /// Spawns a new reconnection episode. Must be called with the link locked.
    fn start_episode(self: &Arc<Self>, link: &mut Link, delay: Duration) {
        if let Some(stale) = link.episode.take() {
            stale.task.abort();
        }

        let id = link.next_episode_id;
        link.next_episode_id += 1;

        let task = self
            .runtime
            .spawn(run_episode(Arc::downgrade(self), id, delay));
        link.episode = Some(Episode {
            id,
            phase: EpisodePhase::Waiting,
            task,
        });
        self.state_tx
            .send_replace(LinkState::Reconnecting { attempt: 0, delay });
    }

    /// Marks the episode as attempting.
    ///
    /// Returns false if the episode was superseded or is no longer needed.
    fn begin_attempt(&self, id: u64) -> bool {
        let mut link = self.link.lock();
        if !link.owns_episode(id) {
            return false;
        }
        if link.connected {
            link.episode = None;
            return false;
        }
        if let Some(episode) = link.episode.as_mut() {
            episode.phase = EpisodePhase::Attempting;
        }
        true
    }

    /// Returns the episode to waiting for its next attempt.
    ///
    /// An update may have restored the link while the attempt was failing;
    /// the episode then ends here.
    fn schedule_retry(&self, id: u64, attempt: u32, delay: Duration) -> bool {
        let mut link = self.link.lock();
        if !link.owns_episode(id) {
            return false;
        }
        if link.connected {
            link.episode = None;
            return false;
        }
        if let Some(episode) = link.episode.as_mut() {
            episode.phase = EpisodePhase::Waiting;
        }
        self.state_tx
            .send_replace(LinkState::Reconnecting { attempt, delay });
        true
    }

    /// Ends the episode after a successful attempt.
    ///
    /// Returns false if the episode was superseded, in which case nothing is
    /// published.
    fn complete_episode(&self, id: u64) -> bool {
        let mut link = self.link.lock();
        if !link.owns_episode(id) {
            return false;
        }
        link.episode = None;
        link.connected = true;
        self.state_tx.send_replace(LinkState::Connected);
        true
    }

    /// Ends the episode after an attempt failed with a non-retryable error.
    ///
    /// `Failed` is only published while the link is still believed down; an
    /// update that restored it in the meantime keeps `Connected`.
    fn abandon_episode(&self, id: u64, err: &ControllerError) {
        let mut link = self.link.lock();
        if !link.owns_episode(id) {
            return;
        }
        link.episode = None;

        if link.connected {
            tracing::warn!(
                device_type = %self.device_type,
                error = %err,
                "Reconnection attempt failed after the link was restored"
            );
            return;
        }

        tracing::error!(
            device_type = %self.device_type,
            error = %err,
            "Reconnection to controller abandoned"
        );
        self.state_tx.send_replace(LinkState::Failed(err.to_string()));
    }
}

/// One reconnection episode: wait, attempt, back off, repeat.
///
/// Holds only a weak reference between attempts so a dropped supervisor ends
/// the loop.
async fn run_episode<C: Controller>(inner: Weak<Inner<C>>, id: u64, initial_delay: Duration) {
    let mut delay = initial_delay;
    let mut retry: u32 = 0;

    loop {
        tokio::time::sleep(delay).await;

        let Some(inner) = inner.upgrade() else {
            return;
        };
        if !inner.begin_attempt(id) {
            return;
        }

        match inner.controller.connect().await {
            Ok(()) => {
                if inner.complete_episode(id) {
                    tracing::info!(
                        device_type = %inner.device_type,
                        attempt = retry,
                        "Reconnected to controller"
                    );
                    inner.subscribers.dispatch(None).await;
                }
                return;
            }
            Err(err) if err.is_connection() => {
                delay = inner.policy.backoff_delay(retry);
                retry = retry.saturating_add(1);
                if !inner.schedule_retry(id, retry, delay) {
                    tracing::debug!(error = %err, "Reconnection attempt failed, episode no longer needed");
                    return;
                }
                tracing::info!(
                    device_type = %inner.device_type,
                    error = %err,
                    delay_secs = delay.as_secs(),
                    "Failed to reconnect to controller, retrying"
                );
            }
            Err(err) => {
                inner.abandon_episode(id, &err);
                return;
            }
        }
    }
}

impl<C: Controller> Clone for ConnectionSupervisor<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Controller> fmt::Debug for ConnectionSupervisor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSupervisor")
            .field("device_type", &self.inner.device_type)
            .field("unique_id", &self.inner.entry.unique_id)
            .field("connected", &self.is_connected())
            .field("subscribers", &self.inner.subscribers.len())
            .finish_non_exhaustive()
    }
}
