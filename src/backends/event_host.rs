// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::traits::{EventHost, EventScope, ListenerHandle, NativeEvent, NativeListener};
use crate::utils::sync::lock;

struct Attached {
    scope: EventScope,
    event: String,
    listener: NativeListener,
}

/// In-process stand-in for the page's native event system.
///
/// Elements exist once added with [`InMemoryEventHost::add_element`];
/// events are delivered synchronously by [`InMemoryEventHost::dispatch`].
#[derive(Default)]
pub struct InMemoryEventHost {
    elements: Mutex<HashSet<String>>,
    listeners: Mutex<BTreeMap<u64, Attached>>,
    next_handle: AtomicU64,
}

impl InMemoryEventHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&self, selector: &str) {
        lock(&self.elements).insert(selector.to_string());
    }

    pub fn remove_element(&self, selector: &str) {
        lock(&self.elements).remove(selector);
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Fire `event` on `scope`. Returns how many native listeners received it.
    pub fn dispatch(&self, scope: &EventScope, event: &str) -> usize {
        let targets: Vec<NativeListener> = lock(&self.listeners)
            .values()
            .filter(|attached| &attached.scope == scope && attached.event == event)
            .map(|attached| attached.listener.clone())
            .collect();

        let native = NativeEvent {
            scope: scope.clone(),
            name: event.to_string(),
        };
        for listener in &targets {
            listener(&native);
        }
        targets.len()
    }
}

impl EventHost for InMemoryEventHost {
    fn query_selector(&self, selector: &str) -> bool {
        lock(&self.elements).contains(selector)
    }

    fn add_listener(
        &self,
        scope: &EventScope,
        event: &str,
        listener: NativeListener,
    ) -> ListenerHandle {
        let id = self.next_handle.fetch_add(1, Ordering::Relaxed);
        lock(&self.listeners).insert(
            id,
            Attached {
                scope: scope.clone(),
                event: event.to_string(),
                listener,
            },
        );
        ListenerHandle(id)
    }

    fn remove_listener(&self, handle: ListenerHandle) {
        lock(&self.listeners).remove(&handle.0);
    }
}
