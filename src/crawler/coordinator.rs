//! Crawl coordinator - main harvest orchestration logic
//!
//! This module drives the two-phase pipeline:
//! - Phase 1: discover countries, enumerate their listing pages, and fetch
//!   them through a bounded worker pool into a deduplicated user set
//! - Phase 2: fetch every discovered user's collection through the same
//!   pool, merging rated items into the aggregator
//!
//! The coordinator is the failure containment boundary: a page or user
//! that produces no data is recorded and skipped, and never aborts
//! sibling work or the run.

use crate::aggregate::{Aggregator, CrawlResult};
use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, FetchOutcome, FetchPolicy, Fetcher};
use crate::crawler::limiter::RateLimiter;
use crate::crawler::paginator::{PageRef, Paginator};
use crate::parse::{parse_collection, parse_usernames};
use crate::HarvestError;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Main harvest coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Arc<Fetcher>,
    paginator: Paginator,
    collection_url: Url,
    cancel: Arc<AtomicBool>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Builds the HTTP client and the single shared rate limiter that
    /// paces every fetch in both phases.
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.user_agent)?;

        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(
            config.crawler.request_delay_ms,
        )));
        let fetcher = Arc::new(Fetcher::new(
            client,
            limiter,
            FetchPolicy {
                max_attempts: config.crawler.max_fetch_attempts,
            },
        ));

        let users_url = Url::parse(&config.site.users_url)?;
        let collection_url = Url::parse(&config.site.collection_url)?;
        let paginator = Paginator::new(fetcher.clone(), users_url);

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            paginator,
            collection_url,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns a handle that stops the coordinator dispatching new fetches
    /// when set. In-flight fetches finish or time out on their own.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Runs the full two-phase harvest
    pub async fn run(&self) -> Result<CrawlResult, HarvestError> {
        let users = self.discover_users().await?;

        if users.is_empty() {
            tracing::warn!("Discovery produced no users; nothing to harvest");
            return Ok(CrawlResult::default());
        }
        tracing::info!("Discovery complete: {} unique users", users.len());

        let users_discovered = users.len();
        let mut result = self.harvest_collections(users).await?;
        result.users_discovered = users_discovered;
        tracing::info!(
            "Harvest complete: {} rated items, {} failed users, {} requests issued",
            result.items.len(),
            result.failed_users.len(),
            self.fetcher.limiter().grants_issued()
        );

        Ok(result)
    }

    /// Phase 1: user discovery
    ///
    /// Enumerates listing pages country by country, then sweeps them all
    /// through the bounded worker pool. Usernames from every page are
    /// flattened into one deduplicated set; a page that cannot be fetched
    /// is counted and skipped.
    async fn discover_users(&self) -> Result<BTreeSet<String>, HarvestError> {
        let mut partitions = self.paginator.discover_partitions().await;
        if partitions.is_empty() {
            tracing::warn!("No countries discovered on the directory root");
            return Ok(BTreeSet::new());
        }

        let limit = self.config.crawler.country_limit as usize;
        if limit > 0 && partitions.len() > limit {
            tracing::info!(
                "Crawling the first {} of {} discovered countries",
                limit,
                partitions.len()
            );
            partitions.truncate(limit);
        }

        // Sequentially probe page counts, then build the full page list
        let mut pages: Vec<PageRef> = Vec::new();
        for partition in &partitions {
            if self.cancelled() {
                break;
            }
            let last_page = self.paginator.last_page_number(partition).await;
            tracing::debug!("Country '{}' spans {} page(s)", partition.label, last_page);
            pages.extend(self.paginator.pages_for(partition, last_page));
        }
        tracing::info!(
            "Fetching {} listing pages across {} countries",
            pages.len(),
            partitions.len()
        );

        let semaphore = Arc::new(Semaphore::new(
            self.config.crawler.max_concurrent_fetches as usize,
        ));
        let mut tasks = JoinSet::new();

        for page in pages {
            if self.cancelled() {
                tracing::info!("Cancellation requested, stopping page dispatch");
                break;
            }
            let semaphore = semaphore.clone();
            let fetcher = self.fetcher.clone();
            let url = self.paginator.page_url(&page.country, page.page);

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (page, None),
                };
                match fetcher.get(url.as_str(), &[]).await {
                    FetchOutcome::Success { body, .. } => (page, Some(parse_usernames(&body))),
                    _ => (page, None),
                }
            });
        }

        let mut users = BTreeSet::new();
        let mut failed_pages = 0usize;
        while let Some(joined) = tasks.join_next().await {
            let (page, usernames) = joined?;
            match usernames {
                Some(names) => users.extend(names),
                None => {
                    failed_pages += 1;
                    tracing::warn!(
                        "Skipping listing page {} of country '{}'",
                        page.page,
                        page.country
                    );
                }
            }
        }
        if failed_pages > 0 {
            tracing::warn!("{} listing page(s) produced no data", failed_pages);
        }

        Ok(users)
    }

    /// Phase 2: collection fetch
    ///
    /// One task per user, bounded by the worker pool. A successful task
    /// merges its rated items into the aggregator; a failed one records
    /// the user id. Neither outcome affects sibling tasks.
    async fn harvest_collections(
        &self,
        users: BTreeSet<String>,
    ) -> Result<CrawlResult, HarvestError> {
        let total = users.len();
        let aggregator = Arc::new(Aggregator::new());
        let completed = Arc::new(AtomicUsize::new(0));
        let semaphore = Arc::new(Semaphore::new(
            self.config.crawler.max_concurrent_fetches as usize,
        ));
        let mut tasks = JoinSet::new();

        for user in users {
            if self.cancelled() {
                tracing::info!("Cancellation requested, stopping collection dispatch");
                break;
            }
            let semaphore = semaphore.clone();
            let fetcher = self.fetcher.clone();
            let aggregator = aggregator.clone();
            let completed = completed.clone();
            let url = self.collection_url.to_string();

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };

                let query = [
                    ("username", user.as_str()),
                    ("stats", "1"),
                    ("subtype", "boardgame"),
                ];
                match fetcher.get(&url, &query).await {
                    FetchOutcome::Success { body, .. } => {
                        let items = parse_collection(body.as_bytes(), &user);
                        if items.is_empty() {
                            tracing::debug!("User '{}' has no rated items", user);
                        }
                        aggregator.merge(items);
                    }
                    _ => {
                        tracing::warn!("Collection fetch failed for user '{}'", user);
                        aggregator.record_failure(&user);
                    }
                }

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % 10 == 0 {
                    tracing::info!("Progress: {}/{} collections fetched", done, total);
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            joined?;
        }

        Ok(aggregator.finalize())
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

/// Runs a complete harvest with the given configuration
///
/// # Example
///
/// ```no_run
/// use meeple_harvest::config::load_config;
/// use meeple_harvest::crawler::run_harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let result = run_harvest(config).await?;
/// println!("{} rated items", result.items.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: Config) -> Result<CrawlResult, HarvestError> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
