//! Shared request pacing gate
//!
//! One `RateLimiter` instance is shared by every worker in both crawl
//! phases, so the total request rate against the remote host never exceeds
//! one request per configured delay, no matter how wide the worker pool is.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum spacing between consecutive grants across all callers.
///
/// `acquire` is a pacing gate, not a lock: it returns once the spacing
/// invariant is satisfied and there is nothing to release afterwards.
/// Callers waiting on the internal mutex are woken in FIFO order, which
/// gives grants a roughly first-come-first-served ordering.
pub struct RateLimiter {
    min_gap: Duration,
    last_grant: Mutex<Option<Instant>>,
    grants: AtomicU64,
}

impl RateLimiter {
    /// Creates a limiter that spaces grants at least `min_gap` apart
    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_grant: Mutex::new(None),
            grants: AtomicU64::new(0),
        }
    }

    /// Blocks until at least the configured gap has elapsed since the
    /// previous grant, then records this grant. Cannot fail, only delay.
    pub async fn acquire(&self) {
        // The sleep happens while holding the mutex: the next waiter cannot
        // observe `last_grant` until this grant's timestamp is recorded, so
        // consecutive grants are always >= min_gap apart.
        let mut last = self.last_grant.lock().await;

        if let Some(prev) = *last {
            let ready_at = prev + self.min_gap;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last = Some(Instant::now());
        self.grants.fetch_add(1, Ordering::Relaxed);
    }

    /// Total number of grants issued so far
    pub fn grants_issued(&self) -> u64 {
        self.grants.load(Ordering::Relaxed)
    }

    /// The configured minimum gap between grants
    pub fn min_gap(&self) -> Duration {
        self.min_gap
    }
}
