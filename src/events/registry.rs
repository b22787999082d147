// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{EventTrigger, TriggerSource};
use crate::errors::EventSourceError;
use crate::events::EventSource;
use crate::observability::messages::events::{
    EventSourceCreated, EventSourceRemoved, SelectorNotFound,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{EventHost, EventScope, NativeEvent, NativeListener};
use crate::utils::sync::lock;

/// Registry key: one event source per scope and event name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventSourceKey {
    pub scope: EventScope,
    pub event: String,
}

/// De-duplicates native event wiring.
///
/// Exactly one native listener is attached per distinct (scope, event);
/// any number of logical callbacks hang off the shared [`EventSource`].
pub struct EventSourceRegistry {
    host: Arc<dyn EventHost>,
    sources: Mutex<HashMap<EventSourceKey, Arc<EventSource>>>,
}

impl EventSourceRegistry {
    pub fn new(host: Arc<dyn EventHost>) -> Self {
        Self {
            host,
            sources: Mutex::new(HashMap::new()),
        }
    }

    /// Return the source for the trigger's (scope, event), creating it and
    /// attaching its native listener on first use.
    ///
    /// Selector scopes are resolved at creation time and fail when nothing
    /// matches. The throttle of the first creation sticks.
    pub fn get_or_create_event_source(
        &self,
        trigger: &EventTrigger,
        throttle: Option<Duration>,
    ) -> Result<Arc<EventSource>, EventSourceError> {
        let key = Self::key_for(trigger);

        let mut sources = lock(&self.sources);
        if let Some(existing) = sources.get(&key) {
            return Ok(existing.clone());
        }

        if let EventScope::Element(selector) = &key.scope {
            if !self.host.query_selector(selector) {
                SelectorNotFound {
                    selector,
                    event: &key.event,
                }
                .log();
                return Err(EventSourceError::SelectorNotFound {
                    selector: selector.clone(),
                    event: key.event.clone(),
                });
            }
        }

        let source = Arc::new(EventSource::new(key.clone(), throttle));
        let weak = Arc::downgrade(&source);
        let listener: NativeListener = Arc::new(move |event: &NativeEvent| {
            if let Some(source) = weak.upgrade() {
                source.dispatch(event);
            }
        });
        let handle = self.host.add_listener(&key.scope, &key.event, listener);
        source.set_listener(handle);

        EventSourceCreated {
            event: &key.event,
            scope: &key.scope,
            throttle,
        }
        .log();

        sources.insert(key, source.clone());
        Ok(source)
    }

    pub fn get(&self, trigger: &EventTrigger) -> Option<Arc<EventSource>> {
        lock(&self.sources).get(&Self::key_for(trigger)).cloned()
    }

    /// Detach the native listener of the trigger's source and forget it.
    pub fn remove_event_source(&self, trigger: &EventTrigger) -> bool {
        let removed = lock(&self.sources).remove(&Self::key_for(trigger));
        match removed {
            Some(source) => {
                self.detach(&source);
                true
            }
            None => false,
        }
    }

    /// Detach every native listener, e.g. when a page navigation tears down its slots.
    pub fn remove_all_event_sources(&self) {
        let drained: Vec<Arc<EventSource>> = lock(&self.sources).drain().map(|(_, s)| s).collect();
        for source in drained {
            self.detach(&source);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.sources).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn detach(&self, source: &EventSource) {
        if let Some(handle) = source.take_listener() {
            self.host.remove_listener(handle);
        }
        EventSourceRemoved {
            event: &source.key().event,
            scope: &source.key().scope,
        }
        .log();
    }

    fn key_for(trigger: &EventTrigger) -> EventSourceKey {
        let scope = match &trigger.source {
            TriggerSource::Window => EventScope::Window,
            TriggerSource::Document => EventScope::Document,
            TriggerSource::Selector(selector) => EventScope::Element(selector.clone()),
        };
        EventSourceKey {
            scope,
            event: trigger.event.clone(),
        }
    }
}
