//! Integration tests for the registry crawler
//!
//! These tests use wiremock to stand in for the registry and drive scrape
//! units and full crawls end-to-end against a temporary database.

mod common;
mod crawl_tests;
mod scrape_tests;
