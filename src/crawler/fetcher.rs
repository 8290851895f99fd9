//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building an HTTP client with a proper user agent string
//! - Rate-limited GET requests with bounded timeouts
//! - Bounded retry with fixed spacing for transient failures
//! - Error classification

use crate::config::UserAgentConfig;
use crate::crawler::limiter::RateLimiter;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Result of one logical fetch
///
/// A single attempt produces either `Success` or `TransientFailure`; the
/// retry wrapper turns a run of transient failures into `ExhaustedRetries`.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Got a success-class response
    Success {
        /// HTTP status code (always 200 under the current policy)
        status: u16,
        /// Raw response body
        body: String,
    },

    /// One attempt failed in a retryable way
    TransientFailure(FetchFailure),

    /// Every allowed attempt failed
    ExhaustedRetries {
        /// How many attempts were made
        attempts: u32,
        /// The failure observed on the final attempt
        last_failure: FetchFailure,
    },
}

/// Why a single fetch attempt failed
#[derive(Debug, Clone)]
pub enum FetchFailure {
    /// The server answered with a non-200 status
    BadStatus(u16),
    /// Connection error, timeout, or other transport-level problem
    Transport(String),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::BadStatus(status) => write!(f, "HTTP {}", status),
            FetchFailure::Transport(error) => write!(f, "transport error: {}", error),
        }
    }
}

/// Retry policy for a single logical fetch
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Attempt ceiling, including the first attempt
    pub max_attempts: u32,
}

/// Builds an HTTP client with proper configuration
///
/// The user agent follows the `Name/Version (+ContactURL; ContactEmail)`
/// convention so the remote operator can identify and reach us.
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// A rate-limited, retrying fetch seam shared by both crawl phases
///
/// Every attempt, first or retry, acquires a grant from the shared
/// limiter before touching the network, so retries can never exceed the
/// imposed request-rate ceiling.
pub struct Fetcher {
    client: Client,
    limiter: Arc<RateLimiter>,
    policy: FetchPolicy,
}

impl Fetcher {
    pub fn new(client: Client, limiter: Arc<RateLimiter>, policy: FetchPolicy) -> Self {
        Self {
            client,
            limiter,
            policy,
        }
    }

    /// Fetches a URL, retrying transient failures up to the attempt ceiling.
    ///
    /// Returns `Success` or `ExhaustedRetries`; the caller must treat the
    /// latter as "this URL produced no data", not as a fatal condition.
    pub async fn get(&self, url: &str, query: &[(&str, &str)]) -> FetchOutcome {
        let mut last_failure = None;

        for attempt in 1..=self.policy.max_attempts {
            self.limiter.acquire().await;

            match self.fetch_once(url, query).await {
                FetchOutcome::Success { status, body } => {
                    if attempt > 1 {
                        tracing::debug!("Fetch of {} succeeded on attempt {}", url, attempt);
                    }
                    return FetchOutcome::Success { status, body };
                }
                FetchOutcome::TransientFailure(failure) => {
                    tracing::debug!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt,
                        self.policy.max_attempts,
                        url,
                        failure
                    );
                    last_failure = Some(failure);
                }
                // fetch_once never reports exhaustion itself
                outcome @ FetchOutcome::ExhaustedRetries { .. } => return outcome,
            }
        }

        let last_failure = last_failure.unwrap_or_else(|| {
            FetchFailure::Transport("no attempts were made".to_string())
        });
        tracing::warn!(
            "Giving up on {} after {} attempts: {}",
            url,
            self.policy.max_attempts,
            last_failure
        );

        FetchOutcome::ExhaustedRetries {
            attempts: self.policy.max_attempts,
            last_failure,
        }
    }

    /// Issues one GET and classifies the response.
    ///
    /// Status 200 is the only success signal: the collection API answers
    /// 202 while a request is still queued server-side, so any other status
    /// counts as a retryable failed attempt.
    async fn fetch_once(&self, url: &str, query: &[(&str, &str)]) -> FetchOutcome {
        let response = match self.client.get(url).query(query).send().await {
            Ok(response) => response,
            Err(e) => {
                let description = if e.is_timeout() {
                    "request timeout".to_string()
                } else if e.is_connect() {
                    "connection failed".to_string()
                } else {
                    e.to_string()
                };
                return FetchOutcome::TransientFailure(FetchFailure::Transport(description));
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            return FetchOutcome::TransientFailure(FetchFailure::BadStatus(status.as_u16()));
        }

        match response.text().await {
            Ok(body) => FetchOutcome::Success {
                status: status.as_u16(),
                body,
            },
            Err(e) => FetchOutcome::TransientFailure(FetchFailure::Transport(e.to_string())),
        }
    }

    /// The shared rate limiter backing this fetcher
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}
