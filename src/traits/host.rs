// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Seams to the hosting page.

use std::fmt;
use std::sync::Arc;

/// The page the tag runs on.
pub trait PageEnvironment: Send + Sync {
    /// Current location href, e.g. `https://www.example.com/news?page=2`
    fn href(&self) -> String;
}

/// Scope a native listener is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventScope {
    Window,
    Document,
    /// An element resolved from a CSS selector
    Element(String),
}

impl fmt::Display for EventScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventScope::Window => write!(f, "window"),
            EventScope::Document => write!(f, "document"),
            EventScope::Element(selector) => write!(f, "element '{}'", selector),
        }
    }
}

/// A native event delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeEvent {
    pub scope: EventScope,
    pub name: String,
}

pub type NativeListener = Arc<dyn Fn(&NativeEvent) + Send + Sync>;

/// Identifies an attached native listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(pub u64);

/// Native event wiring of the host page.
pub trait EventHost: Send + Sync {
    /// Whether a CSS selector currently matches an element.
    fn query_selector(&self, selector: &str) -> bool;

    fn add_listener(
        &self,
        scope: &EventScope,
        event: &str,
        listener: NativeListener,
    ) -> ListenerHandle;

    fn remove_listener(&self, handle: ListenerHandle);
}
