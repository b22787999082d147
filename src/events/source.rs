// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use crate::events::EventSourceKey;
use crate::observability::messages::events::EventThrottled;
use crate::observability::messages::StructuredLog;
use crate::traits::{ListenerHandle, NativeEvent};
use crate::utils::sync::lock;

pub type EventCallback = Arc<dyn Fn(&NativeEvent) + Send + Sync>;

/// Identifies a callback registered on an [`EventSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

struct Registration {
    id: CallbackId,
    callback: EventCallback,
    permanent: bool,
}

/// One native listener fanned out to many logical callbacks.
///
/// Every native event fires each registered callback exactly once; one-shot
/// callbacks are dropped right after they fired. With a throttle window, the
/// first event opens the window and further events inside it are dropped.
pub struct EventSource {
    key: EventSourceKey,
    throttle: Option<Duration>,
    callbacks: Mutex<Vec<Registration>>,
    listener: Mutex<Option<ListenerHandle>>,
    window_opened_at: Mutex<Option<Instant>>,
    next_callback_id: AtomicU64,
}

impl EventSource {
    pub(crate) fn new(key: EventSourceKey, throttle: Option<Duration>) -> Self {
        Self {
            key,
            throttle,
            callbacks: Mutex::new(Vec::new()),
            listener: Mutex::new(None),
            window_opened_at: Mutex::new(None),
            next_callback_id: AtomicU64::new(1),
        }
    }

    pub fn key(&self) -> &EventSourceKey {
        &self.key
    }

    pub fn throttle(&self) -> Option<Duration> {
        self.throttle
    }

    pub fn add_callback(&self, callback: EventCallback, permanent: bool) -> CallbackId {
        let id = CallbackId(self.next_callback_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.callbacks).push(Registration {
            id,
            callback,
            permanent,
        });
        id
    }

    pub fn remove_callback(&self, id: CallbackId) -> bool {
        let mut callbacks = lock(&self.callbacks);
        let before = callbacks.len();
        callbacks.retain(|registration| registration.id != id);
        before != callbacks.len()
    }

    pub fn callback_count(&self) -> usize {
        lock(&self.callbacks).len()
    }

    pub(crate) fn set_listener(&self, handle: ListenerHandle) {
        *lock(&self.listener) = Some(handle);
    }

    pub(crate) fn take_listener(&self) -> Option<ListenerHandle> {
        lock(&self.listener).take()
    }

    /// Deliver a native event. Returns `false` when the event was throttled.
    pub fn dispatch(&self, event: &NativeEvent) -> bool {
        if !self.admit() {
            EventThrottled {
                event: &self.key.event,
                scope: &self.key.scope,
            }
            .log();
            return false;
        }

        // Snapshot so callbacks may register or remove callbacks while we iterate.
        let snapshot: Vec<(CallbackId, EventCallback, bool)> = lock(&self.callbacks)
            .iter()
            .map(|r| (r.id, r.callback.clone(), r.permanent))
            .collect();

        for (_, callback, _) in &snapshot {
            callback(event);
        }

        let fired_one_shots: HashSet<CallbackId> = snapshot
            .iter()
            .filter(|(_, _, permanent)| !permanent)
            .map(|(id, _, _)| *id)
            .collect();
        if !fired_one_shots.is_empty() {
            lock(&self.callbacks)
                .retain(|registration| !fired_one_shots.contains(&registration.id));
        }
        true
    }

    fn admit(&self) -> bool {
        let Some(window) = self.throttle else {
            return true;
        };
        let now = Instant::now();
        let mut opened_at = lock(&self.window_opened_at);
        match *opened_at {
            Some(opened) if now.duration_since(opened) < window => false,
            _ => {
                *opened_at = Some(now);
                true
            }
        }
    }
}

impl fmt::Debug for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource")
            .field("key", &self.key)
            .field("throttle", &self.throttle)
            .field("callbacks", &self.callback_count())
            .finish()
    }
}
