//! Result aggregation
//!
//! Workers from both crawl phases funnel their partial results through one
//! `Aggregator`; it is the single mutation point for the run's output, so
//! a failing worker can never corrupt or lose another worker's records.

use crate::parse::RatedItem;
use std::collections::HashSet;
use std::sync::Mutex;

/// The final output of a crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    /// Every rated item collected, deduplicated on (owner, item id).
    /// Ordering carries no meaning.
    pub items: Vec<RatedItem>,

    /// Users whose collection could not be fetched
    pub failed_users: Vec<String>,

    /// How many unique users phase 1 discovered
    pub users_discovered: usize,
}

impl CrawlResult {
    /// True when the run produced neither items nor failures
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.failed_users.is_empty()
    }
}

#[derive(Debug, Default)]
struct Inner {
    items: Vec<RatedItem>,
    failed_users: Vec<String>,
}

/// Accumulates partial results from concurrent workers
#[derive(Debug, Default)]
pub struct Aggregator {
    inner: Mutex<Inner>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a batch of rated items. Safe to call from any worker.
    pub fn merge(&self, items: Vec<RatedItem>) {
        if items.is_empty() {
            return;
        }
        let mut inner = self.inner.lock().unwrap();
        inner.items.extend(items);
    }

    /// Records a user whose collection fetch produced no data
    pub fn record_failure(&self, user: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.failed_users.push(user.to_string());
    }

    /// Drains the accumulated state into the final result.
    ///
    /// Items are deduplicated on (owner, item id), keeping the first
    /// occurrence, so re-running an unchanged crawl yields a set-equal
    /// result even if the remote API repeats an item.
    pub fn finalize(&self) -> CrawlResult {
        let inner = std::mem::take(&mut *self.inner.lock().unwrap());

        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(inner.items.len());
        for item in inner.items {
            if seen.insert((item.owner.clone(), item.item_id.clone())) {
                items.push(item);
            }
        }

        CrawlResult {
            items,
            failed_users: inner.failed_users,
            users_discovered: 0,
        }
    }
}
