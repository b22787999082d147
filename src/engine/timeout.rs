// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::future::Future;
use std::time::Duration;

use crate::observability::messages::pipeline::IntegrationTimedOut;
use crate::observability::messages::StructuredLog;

/// Await `future`, giving up after `timeout`.
///
/// Used at integration edges (waiting for a third-party global, a consent
/// prompt, ...) where the request should go on in a degraded form instead
/// of failing: a timeout logs a warning and yields `None`.
pub async fn await_with_degraded_timeout<F, T>(
    what: &str,
    timeout: Duration,
    future: F,
) -> Option<T>
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(value) => Some(value),
        Err(_) => {
            IntegrationTimedOut { what, timeout }.log();
            None
        }
    }
}
