// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::observability::messages::events::RenderTrackingCompleted;
use crate::observability::messages::StructuredLog;
use crate::utils::sync::lock;

pub type RenderListener = Arc<dyn Fn(&str) + Send + Sync>;

/// "Render ended" notifications from the ad-serving integration, keyed by dom id.
#[derive(Default)]
pub struct RenderEndedEvents {
    listeners: Mutex<HashMap<u64, RenderListener>>,
    next_id: AtomicU64,
}

impl RenderEndedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, listener: RenderListener) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.listeners).insert(id, listener);
        id
    }

    pub fn remove_listener(&self, id: u64) -> bool {
        lock(&self.listeners).remove(&id).is_some()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Report that the slot with `dom_id` finished rendering.
    pub fn emit(&self, dom_id: &str) {
        let snapshot: Vec<RenderListener> = lock(&self.listeners).values().cloned().collect();
        for listener in snapshot {
            listener(dom_id);
        }
    }

    /// Resolve once every slot in `dom_ids` has reported.
    ///
    /// Installs a single listener for the whole set and removes it when the
    /// future completes or is dropped.
    pub async fn await_all_ad_slots_rendered(&self, dom_ids: &[String]) {
        let pending: HashSet<String> = dom_ids.iter().cloned().collect();
        if pending.is_empty() {
            return;
        }
        let slot_count = pending.len();

        let (done_tx, done_rx) = oneshot::channel::<()>();
        let state = Arc::new(Mutex::new((pending, Some(done_tx))));
        let listener: RenderListener = Arc::new(move |dom_id: &str| {
            let mut guard = lock(&state);
            let (pending, done) = &mut *guard;
            pending.remove(dom_id);
            if pending.is_empty() {
                if let Some(done) = done.take() {
                    let _ = done.send(());
                }
            }
        });

        let id = self.add_listener(listener);
        let _registration = Registration { events: self, id };
        let _ = done_rx.await;
        RenderTrackingCompleted { slot_count }.log();
    }
}

struct Registration<'a> {
    events: &'a RenderEndedEvents,
    id: u64,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.events.remove_listener(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_resolves_after_all_slots_reported() {
        let events = Arc::new(RenderEndedEvents::new());
        let waiter = {
            let events = events.clone();
            tokio::spawn(async move { events.await_all_ad_slots_rendered(&ids(&["a", "b"])).await })
        };

        while events.listener_count() == 0 {
            tokio::task::yield_now().await;
        }
        events.emit("a");
        events.emit("unrelated");
        assert!(!waiter.is_finished());
        events.emit("b");

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(events.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_set_resolves_immediately() {
        let events = RenderEndedEvents::new();
        events.await_all_ad_slots_rendered(&[]).await;
        assert_eq!(events.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_repeated_calls_do_not_leak_listeners() {
        let events = Arc::new(RenderEndedEvents::new());
        for round in 0..3 {
            let dom_id = format!("slot-{}", round);
            let waiter = {
                let events = events.clone();
                let dom_ids = vec![dom_id.clone()];
                tokio::spawn(async move { events.await_all_ad_slots_rendered(&dom_ids).await })
            };
            while events.listener_count() == 0 {
                tokio::task::yield_now().await;
            }
            events.emit(&dom_id);
            waiter.await.unwrap();
        }
        assert_eq!(events.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_dropped_waiter_unregisters() {
        let events = RenderEndedEvents::new();
        let dom_ids = ids(&["never"]);
        let result = tokio::time::timeout(
            Duration::from_millis(10),
            events.await_all_ad_slots_rendered(&dom_ids),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(events.listener_count(), 0);
    }
}
