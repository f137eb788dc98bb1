//! Retry boundary for transient store conflicts
//!
//! Storage-level write conflicts are retried exactly once at the
//! per-organization serialization boundary, then surfaced as a transient
//! failure. Deterministic policy violations pass through untouched and are
//! never retried.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::store::{StoreError, StoreResult};

/// Configuration for the conflict retry boundary.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Delay before the single retry attempt
    pub retry_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_millis(25),
        }
    }
}

/// Run a store operation, retrying once on a transient conflict.
///
/// Any error other than [`StoreError::Conflict`] is returned immediately; a
/// conflict on the second attempt is returned to the caller, which maps it
/// to a transient failure.
pub async fn retry_once<T, F, Fut>(config: &RetryConfig, mut op: F) -> StoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    match op().await {
        Err(StoreError::Conflict(reason)) => {
            tracing::debug!(%reason, "store conflict, retrying once");
            sleep(config.retry_delay).await;
            op().await
        }
        other => other,
    }
}
