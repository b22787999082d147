// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use crate::utils::sync::lock;

/// Per-slot cool-down for refreshes.
///
/// A slot that was refreshed is throttled for `window`; throttled slots are
/// skipped by refresh execution until the window has elapsed.
#[derive(Debug)]
pub struct ThrottleGuard {
    window: Duration,
    refreshed_at: Mutex<HashMap<String, Instant>>,
}

impl ThrottleGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            refreshed_at: Mutex::new(HashMap::new()),
        }
    }

    /// Throttle `dom_id` if it is not throttled already. Returns whether the caller may refresh.
    pub fn try_acquire(&self, dom_id: &str) -> bool {
        let now = Instant::now();
        let mut refreshed_at = lock(&self.refreshed_at);
        refreshed_at.retain(|_, at| now.duration_since(*at) < self.window);
        if refreshed_at.contains_key(dom_id) {
            return false;
        }
        refreshed_at.insert(dom_id.to_string(), now);
        true
    }
}
