//! Ratings CSV export
//!
//! Writes the flat (item id, rating, username) dataset to disk. Fields are
//! quoted only when they contain a delimiter, quote, or newline, per the
//! usual CSV conventions.

use crate::aggregate::CrawlResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes the collected ratings as CSV
///
/// # Arguments
///
/// * `result` - The finished crawl result
/// * `output_path` - Path where the CSV file should be written
pub fn write_ratings_csv(result: &CrawlResult, output_path: &Path) -> std::io::Result<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "item_id,rating,username")?;
    for item in &result.items {
        writeln!(
            writer,
            "{},{},{}",
            csv_field(&item.item_id),
            item.rating,
            csv_field(&item.owner)
        )?;
    }

    writer.flush()
}

/// Quotes a field if it contains a comma, quote, or newline
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
