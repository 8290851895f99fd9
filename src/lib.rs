//! Meeple-Harvest: a BoardGameGeek ratings harvester
//!
//! This crate crawls the paginated per-country user directory on
//! boardgamegeek.com, then fetches every discovered user's board-game
//! collection from the XML API, merging the rated items into one flat
//! dataset. Fetches are paced by a shared rate limiter and retried with a
//! fixed spacing; individual page or user failures are recorded and skipped
//! without aborting the run.

pub mod aggregate;
pub mod config;
pub mod crawler;
pub mod output;
pub mod parse;

use thiserror::Error;

/// Main error type for Meeple-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Meeple-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use aggregate::{Aggregator, CrawlResult};
pub use config::Config;
pub use crawler::{run_harvest, Coordinator};
pub use parse::RatedItem;
