// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod registry;
mod render;
mod source;
mod throttle;

pub use registry::{EventSourceKey, EventSourceRegistry};
pub use render::{RenderEndedEvents, RenderListener};
pub use source::{CallbackId, EventCallback, EventSource};
pub use throttle::ThrottleGuard;
