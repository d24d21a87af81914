//! Phone-side request path: is the watch reachable, and asking it to push
//! its match files.
//!
//! The request is best effort and single-flight: one zero-payload message,
//! a fixed number of retries with a fixed delay, no backoff and nothing
//! persisted across restarts. The caller's `requesting` flag is the only
//! duplicate-request guard.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::sleep;

use crate::config::SyncConfig;
use crate::transport::{Transport, BOWLS_SCORER_CAPABILITY, REQUEST_MATCH_FILES_PATH};

/// Retry schedule for the file request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            delay: Duration::from_millis(2000),
        }
    }
}

impl From<&SyncConfig> for RetryPolicy {
    fn from(config: &SyncConfig) -> Self {
        Self {
            retries: config.request_retries,
            delay: Duration::from_millis(config.request_retry_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The request message reached the transport layer.
    Sent,
    /// No reachable node advertises the scorer capability; nothing sent.
    NoDevice,
    /// Every send attempt failed.
    GaveUp,
    /// Cancelled between retry attempts.
    Cancelled,
}

/// Aborts an in-flight request's retry loop. Dropping the handle without
/// calling [`cancel`](CancelHandle::cancel) lets the request run out.
pub struct CancelHandle(oneshot::Sender<()>);

impl CancelHandle {
    pub fn cancel(self) {
        let _ = self.0.send(());
    }
}

pub struct CancelToken(Option<oneshot::Receiver<()>>);

impl CancelToken {
    /// A token that can never fire.
    pub fn never() -> Self {
        Self(None)
    }
}

pub fn cancellation() -> (CancelHandle, CancelToken) {
    let (tx, rx) = oneshot::channel();
    (CancelHandle(tx), CancelToken(Some(rx)))
}

/// True iff at least one reachable node advertises the scorer capability.
/// Transport errors read as "not connected"; this never fails open.
pub async fn is_watch_connected(transport: &dyn Transport) -> bool {
    match transport.capable_nodes(BOWLS_SCORER_CAPABILITY).await {
        Ok(nodes) => !nodes.is_empty(),
        Err(e) => {
            tracing::debug!("connectivity check failed: {e:#}");
            false
        }
    }
}

/// Ask the watch to push its match files.
///
/// Resolves one capable node, then sends a zero-payload message on the
/// request path, retrying per `policy` on send failure. At most
/// `1 + policy.retries` sends happen before giving up.
pub async fn request_match_files(
    transport: &dyn Transport,
    policy: &RetryPolicy,
    mut cancel: CancelToken,
) -> RequestOutcome {
    let node = match transport.capable_nodes(BOWLS_SCORER_CAPABILITY).await {
        Ok(nodes) => nodes.into_iter().next(),
        Err(e) => {
            tracing::warn!("capability lookup failed: {e:#}");
            None
        }
    };
    let Some(node) = node else {
        tracing::debug!("no scorer-capable node reachable, not sending request");
        return RequestOutcome::NoDevice;
    };

    for attempt in 1..=(1 + policy.retries) {
        match transport
            .send_message(&node.id, REQUEST_MATCH_FILES_PATH, &[])
            .await
        {
            Ok(()) => {
                tracing::debug!("file request sent to {} (attempt {attempt})", node.id);
                return RequestOutcome::Sent;
            }
            Err(e) => {
                tracing::warn!("file request attempt {attempt} failed: {e:#}");
            }
        }
        if attempt <= policy.retries && wait_or_cancelled(policy.delay, &mut cancel).await {
            tracing::debug!("file request cancelled after attempt {attempt}");
            return RequestOutcome::Cancelled;
        }
    }
    RequestOutcome::GaveUp
}

/// Sleep for the retry delay; true if cancellation fired first. A dropped
/// cancel handle is not a cancellation.
async fn wait_or_cancelled(delay: Duration, cancel: &mut CancelToken) -> bool {
    let Some(mut rx) = cancel.0.take() else {
        sleep(delay).await;
        return false;
    };
    match tokio::time::timeout(delay, &mut rx).await {
        // Cancelled mid-delay
        Ok(Ok(())) => true,
        // Handle dropped without cancelling; the receiver is spent, so
        // just wait out the delay
        Ok(Err(_)) => {
            sleep(delay).await;
            false
        }
        // Delay elapsed; keep the receiver for the next gap
        Err(_) => {
            cancel.0 = Some(rx);
            false
        }
    }
}
