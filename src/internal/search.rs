use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// A search that survived the debounce window and is being sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    /// Monotonic per debouncer; only the highest issued value may update
    /// the displayed results.
    pub seq: u64,
    pub query: String,
}

/// Delays searches until typing pauses, and numbers the requests it lets
/// through so late responses from superseded requests can be discarded.
///
/// Requests already in flight are never cancelled; only the pending timer is.
#[derive(Debug)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<CancellationToken>,
    issued: Arc<AtomicU64>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Restart the timer for `query`. If it elapses without another call,
    /// a fresh sequence number is issued and `on_fire` runs with it. Blank
    /// queries still reset the timer but never fire.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&mut self, query: &str, on_fire: F)
    where
        F: FnOnce(SearchTicket) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel_pending();

        let token = CancellationToken::new();
        self.pending = Some(token.clone());

        let query = query.to_string();
        let issued = Arc::clone(&self.issued);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::trace!(query = %query, "search superseded before firing");
                }
                _ = tokio::time::sleep(delay) => {
                    if query.trim().is_empty() {
                        return;
                    }
                    let seq = issued.fetch_add(1, Ordering::SeqCst) + 1;
                    tracing::debug!(seq, query = %query, "search issued");
                    on_fire(SearchTicket { seq, query }).await;
                }
            }
        });
    }

    /// Drop the pending timer, if any. In-flight requests are unaffected.
    pub fn cancel_pending(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }

    /// Sequence number of the most recently issued request (0 if none).
    pub fn latest_issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        seq == self.latest_issued()
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
