use serde::Deserialize;

/// Main configuration structure for Meeple-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub site: SiteConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Minimum spacing between any two requests, in milliseconds.
    /// Shared across every worker in both crawl phases.
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Maximum attempts for a single logical fetch before giving up
    #[serde(rename = "max-fetch-attempts")]
    pub max_fetch_attempts: u32,

    /// Maximum number of fetches in flight at once
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: u32,

    /// How many discovered countries to actually crawl. 0 means all of
    /// them. Defaults to 2 as a cost-control sampling policy.
    #[serde(rename = "country-limit", default = "default_country_limit")]
    pub country_limit: u32,
}

fn default_country_limit() -> u32 {
    2
}

/// Remote endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the user directory listing
    #[serde(rename = "users-url")]
    pub users_url: String,

    /// URL of the XML collection API
    #[serde(rename = "collection-url")]
    pub collection_url: String,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the ratings CSV file
    #[serde(rename = "ratings-path")]
    pub ratings_path: String,
}
