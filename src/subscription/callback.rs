// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Update callbacks and the ordered subscriber set.
//!
//! - [`UpdateCallback`] - Cloneable handle to an async update listener
//! - [`SubscriberSet`] - Duplicate-free, insertion-ordered set of handles

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::DeviceId;

/// Boxed future returned by an update callback.
pub type UpdateFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

type CallbackFn = dyn Fn(Option<DeviceId>) -> UpdateFuture + Send + Sync;

/// Handle to an async listener that is told when device state changed.
///
/// The argument is the device that changed, or `None` when every device
/// should be considered changed (for example after a reconnect).
///
/// Handles compare by identity: clones of one handle are equal, two handles
/// built from identical closures are not. Keep the handle you subscribed with
/// to unsubscribe later.
///
/// # Examples
///
/// ```
/// use intesis_lib::subscription::UpdateCallback;
///
/// let callback = UpdateCallback::new(|device_id| async move {
///     println!("refresh {device_id:?}");
/// });
///
/// assert_eq!(callback, callback.clone());
/// ```
#[derive(Clone)]
pub struct UpdateCallback(Arc<CallbackFn>);

impl UpdateCallback {
    /// Wraps an async closure as a callback handle.
    pub fn new<F, Fut>(callback: F) -> Self
    where
        F: Fn(Option<DeviceId>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let wrapped: Arc<CallbackFn> =
            Arc::new(move |device_id| -> UpdateFuture { Box::pin(callback(device_id)) });
        Self(wrapped)
    }

    /// Invokes the callback and awaits it.
    pub async fn call(&self, device_id: Option<DeviceId>) {
        (self.0)(device_id).await;
    }
}

impl PartialEq for UpdateCallback {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for UpdateCallback {}

impl fmt::Debug for UpdateCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UpdateCallback({:p})", Arc::as_ptr(&self.0).cast::<()>())
    }
}

/// Ordered set of update callbacks.
///
/// Adding a callback that is already present and removing one that is absent
/// are both no-ops. Dispatch order is registration order.
///
/// The set is safe to share between tasks; the lock is never held while a
/// callback runs.
#[derive(Default)]
pub struct SubscriberSet {
    callbacks: RwLock<Vec<UpdateCallback>>,
}

impl SubscriberSet {
    /// Creates an empty subscriber set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a callback unless it is already registered.
    ///
    /// Returns `true` if the callback was added.
    pub fn add(&self, callback: UpdateCallback) -> bool {
        let mut callbacks = self.callbacks.write();
        if callbacks.contains(&callback) {
            return false;
        }
        callbacks.push(callback);
        true
    }

    /// Removes a callback if registered.
    ///
    /// Returns `true` if the callback was found and removed.
    pub fn remove(&self, callback: &UpdateCallback) -> bool {
        let mut callbacks = self.callbacks.write();
        let before = callbacks.len();
        callbacks.retain(|c| c != callback);
        callbacks.len() != before
    }

    /// Returns a copy of the current callbacks in registration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<UpdateCallback> {
        self.callbacks.read().clone()
    }

    /// Awaits every registered callback in turn with `device_id`.
    ///
    /// Callbacks registered or removed while dispatch is running take effect
    /// on the next dispatch.
    pub async fn dispatch(&self, device_id: Option<&DeviceId>) {
        for callback in self.snapshot() {
            callback.call(device_id.cloned()).await;
        }
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    /// Returns `true` if no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.read().is_empty()
    }
}

impl fmt::Debug for SubscriberSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberSet")
            .field("callback_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recording(log: &Arc<Mutex<Vec<(usize, Option<DeviceId>)>>>, tag: usize) -> UpdateCallback {
        let log = Arc::clone(log);
        UpdateCallback::new(move |device_id| {
            let log = Arc::clone(&log);
            async move {
                log.lock().push((tag, device_id));
            }
        })
    }

    #[test]
    fn clones_are_equal_distinct_closures_are_not() {
        let a = UpdateCallback::new(|_| async {});
        let b = UpdateCallback::new(|_| async {});

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn adding_twice_keeps_one_entry() {
        let set = SubscriberSet::new();
        let callback = UpdateCallback::new(|_| async {});

        assert!(set.add(callback.clone()));
        assert!(!set.add(callback.clone()));
        assert_eq!(set.len(), 1);

        assert!(set.remove(&callback));
        assert!(set.is_empty());
    }

    #[test]
    fn removing_absent_callback_is_noop() {
        let set = SubscriberSet::new();
        let registered = UpdateCallback::new(|_| async {});
        let stranger = UpdateCallback::new(|_| async {});
        set.add(registered.clone());

        assert!(!set.remove(&stranger));
        assert_eq!(set.len(), 1);
        assert_eq!(set.snapshot(), vec![registered]);
    }

    #[tokio::test]
    async fn dispatch_runs_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let set = SubscriberSet::new();
        for tag in 0..3 {
            set.add(recording(&log, tag));
        }

        let id = DeviceId::new("42");
        set.dispatch(Some(&id)).await;

        let calls = log.lock().clone();
        assert_eq!(
            calls,
            vec![
                (0, Some(id.clone())),
                (1, Some(id.clone())),
                (2, Some(id)),
            ]
        );
    }

    #[tokio::test]
    async fn dispatch_with_none_reaches_everyone() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let set = SubscriberSet::new();
        set.add(recording(&log, 0));
        set.add(recording(&log, 1));

        set.dispatch(None).await;

        assert_eq!(log.lock().clone(), vec![(0, None), (1, None)]);
    }

    #[test]
    fn debug_shows_count() {
        let set = SubscriberSet::new();
        set.add(UpdateCallback::new(|_| async {}));

        let debug = format!("{set:?}");
        assert!(debug.contains("SubscriberSet"));
        assert!(debug.contains("callback_count: 1"));
    }
}
