//! Listing pagination
//!
//! The user directory is partitioned by country, and each country's listing
//! spans one or more pages. This module discovers the countries from the
//! directory root, probes a country's page count, and enumerates the page
//! URLs to fetch: `{users-url}[/page/{n}]?country={c}&state=&city=`, where
//! the `/page/{n}` segment appears only for pages past the first.

use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::parse::listing::{parse_country_options, parse_last_page};
use std::sync::Arc;
use url::Url;

/// One crawl partition: a country as listed on the directory root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Country label exactly as the root page lists it
    pub label: String,
}

/// One listing page to fetch: a partition and a 1-based page number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    pub country: String,
    pub page: u32,
}

/// Discovers partitions and enumerates their listing pages
pub struct Paginator {
    fetcher: Arc<Fetcher>,
    users_url: Url,
}

impl Paginator {
    pub fn new(fetcher: Arc<Fetcher>, users_url: Url) -> Self {
        Self { fetcher, users_url }
    }

    /// Fetches the directory root and returns the countries it lists, in
    /// document order. A root fetch failure yields an empty list (logged);
    /// the caller decides whether that is fatal for the run.
    pub async fn discover_partitions(&self) -> Vec<Partition> {
        match self.fetcher.get(self.users_url.as_str(), &[]).await {
            FetchOutcome::Success { body, .. } => parse_country_options(&body)
                .into_iter()
                .map(|label| Partition { label })
                .collect(),
            outcome => {
                tracing::warn!(
                    "Could not fetch directory root {}: {:?}",
                    self.users_url,
                    outcome
                );
                Vec::new()
            }
        }
    }

    /// Probes a partition's first page for the "last page" marker.
    ///
    /// A missing marker means a single-page partition, not an error. A page
    /// that cannot be fetched at all also reports 1 so the sweep still
    /// visits the first page and records its failure there.
    pub async fn last_page_number(&self, partition: &Partition) -> u32 {
        let url = self.page_url(&partition.label, 1);
        match self.fetcher.get(url.as_str(), &[]).await {
            FetchOutcome::Success { body, .. } => parse_last_page(&body),
            _ => {
                tracing::warn!(
                    "Could not probe page count for country '{}', assuming 1",
                    partition.label
                );
                1
            }
        }
    }

    /// Enumerates every page of a partition, in order
    pub fn pages_for(&self, partition: &Partition, last_page: u32) -> Vec<PageRef> {
        (1..=last_page.max(1))
            .map(|page| PageRef {
                country: partition.label.clone(),
                page,
            })
            .collect()
    }

    /// Builds the URL for one listing page
    pub fn page_url(&self, country: &str, page: u32) -> Url {
        let mut url = self.users_url.clone();

        if page > 1 {
            let page_segment = page.to_string();
            // Scheme is validated as http(s) at config load, so the URL is
            // always a valid base.
            url.path_segments_mut()
                .expect("users-url is a base URL")
                .pop_if_empty()
                .extend(["page", page_segment.as_str()]);
        }

        url.query_pairs_mut()
            .append_pair("country", country)
            .append_pair("state", "")
            .append_pair("city", "");

        url
    }
}
