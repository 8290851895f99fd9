//! Record parsers for the two remote document formats
//!
//! Both halves are pure functions over raw response bodies: the listing
//! parsers scan directory HTML for countries, page markers, and usernames;
//! the collection parser scans the XML API response for rated items.
//! Malformed or unexpected input yields an empty result, never an error.

pub mod collection;
pub mod listing;

pub use collection::{parse_collection, RatedItem};
pub use listing::{parse_country_options, parse_last_page, parse_usernames};
