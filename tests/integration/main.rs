//! Integration tests for Meeple-Harvest
//!
//! Each module spins up wiremock servers standing in for the directory
//! listing and the collection API.

mod crawl_tests;
