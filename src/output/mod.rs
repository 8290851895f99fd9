//! Output module for summarizing and exporting harvest results
//!
//! This module handles:
//! - Building and printing a run summary
//! - Writing the flat ratings CSV

mod report;

pub use report::write_ratings_csv;

use crate::aggregate::CrawlResult;
use chrono::{DateTime, Utc};

/// Summary of one harvest run
#[derive(Debug, Clone)]
pub struct HarvestSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished
    pub finished_at: DateTime<Utc>,

    /// Unique users discovered in phase 1
    pub users_discovered: usize,

    /// Users whose collection fetch failed
    pub users_failed: usize,

    /// Total rated items collected
    pub items_collected: usize,

    /// Distinct games seen across all collections
    pub distinct_games: usize,

    /// Mean rating across all collected items, if any were collected
    pub mean_rating: Option<f64>,

    /// The users that failed, for the failure report
    pub failed_users: Vec<String>,
}

/// Builds a summary from a finished crawl
pub fn summarize(
    result: &CrawlResult,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
) -> HarvestSummary {
    let distinct_games = result
        .items
        .iter()
        .map(|item| item.item_id.as_str())
        .collect::<std::collections::HashSet<_>>()
        .len();

    let mean_rating = if result.items.is_empty() {
        None
    } else {
        let sum: f64 = result.items.iter().map(|item| item.rating).sum();
        Some(sum / result.items.len() as f64)
    };

    HarvestSummary {
        started_at,
        finished_at,
        users_discovered: result.users_discovered,
        users_failed: result.failed_users.len(),
        items_collected: result.items.len(),
        distinct_games,
        mean_rating,
        failed_users: result.failed_users.clone(),
    }
}

/// Prints a summary to stdout in a formatted manner
pub fn print_summary(summary: &HarvestSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Run:");
    println!("  Started:  {}", summary.started_at.to_rfc3339());
    println!("  Finished: {}", summary.finished_at.to_rfc3339());
    let duration = summary.finished_at - summary.started_at;
    println!("  Duration: {}s", duration.num_seconds());
    println!();

    println!("Results:");
    println!("  Users discovered: {}", summary.users_discovered);
    println!("  Rated items collected: {}", summary.items_collected);
    println!("  Distinct games: {}", summary.distinct_games);
    if let Some(mean) = summary.mean_rating {
        println!("  Mean rating: {:.2}", mean);
    }
    println!();

    if summary.users_failed > 0 {
        println!("Failed Users ({}):", summary.users_failed);
        for user in &summary.failed_users {
            println!("  - {}", user);
        }
        println!();
    }

    let fetched = summary.users_discovered.saturating_sub(summary.users_failed);
    let success_rate = if summary.users_discovered > 0 {
        (fetched as f64 / summary.users_discovered as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Success Rate: {:.1}% ({} / {} users fetched)",
        success_rate, fetched, summary.users_discovered
    );
}
