//! Output module for operator-facing reports
//!
//! This module handles:
//! - Crawl progress statistics per region
//! - Listing recorded scrape errors

mod errors;
pub mod stats;

pub use errors::{load_errors, print_errors};
pub use stats::{load_statistics, print_statistics, RegistryStatistics};
