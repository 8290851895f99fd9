//! Crawler module for directory and collection fetching
//!
//! This module contains the core crawling logic, including:
//! - Rate-limited HTTP fetching with bounded retry
//! - Listing pagination and country discovery
//! - Two-phase crawl coordination with bounded worker pools

mod coordinator;
mod fetcher;
mod limiter;
mod paginator;

pub use coordinator::{run_harvest, Coordinator};
pub use fetcher::{build_http_client, FetchFailure, FetchOutcome, FetchPolicy, Fetcher};
pub use limiter::RateLimiter;
pub use paginator::{PageRef, Paginator, Partition};
