//! Crawler module for registry record scraping
//!
//! This module contains the core crawling logic, including:
//! - Field extraction and the record parser
//! - Merging of repeated personnel rows
//! - HTTP fetching of record pages
//! - Scrape units, their scheduler and dispatch pacing
//! - Per-region crawl driving

mod driver;
mod extractor;
mod fetcher;
mod merge;
mod parser;
mod scheduler;
mod throttle;
mod unit;

pub use driver::{configured_regions, plan_region, CrawlDriver, RegionPlan, RegionReport};
pub use extractor::{ExtractError, FieldExtractor, FieldType, FieldValue, TIMESTAMP_FORMAT};
pub use fetcher::{build_http_client, fetch_page, FetchError, RawPage};
pub use merge::{PersonMerger, RelationshipRow, RELATIONSHIP_SEPARATOR};
pub use parser::{ParsedRecord, RecordParser};
pub use scheduler::{TaskScheduler, TokioScheduler};
pub use throttle::{SleepThrottle, Throttle};
pub use unit::{ScrapeContext, ScrapeFailure, ScrapeUnit, UnitOutcome};

use crate::config::Config;
use crate::identifier::Region;
use crate::storage::{self, open_storage, Storage};
use crate::RegistryError;
use std::path::Path;
use std::sync::Arc;

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub run_id: i64,
    pub regions: Vec<RegionReport>,
}

impl CrawlReport {
    pub fn dispatched(&self) -> u64 {
        self.regions.iter().map(|r| r.dispatched).sum()
    }
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the database and record a new run
/// 2. Build the HTTP client and the shared scrape context
/// 3. Drive every selected region up to its ceiling
/// 4. Wait for all dispatched scrape units to finish
///
/// `only` restricts the crawl to one configured region.
pub async fn crawl(
    config: Config,
    config_hash: &str,
    only: Option<Region>,
) -> Result<CrawlReport, RegistryError> {
    let regions = match only {
        Some(region) if config.ceiling(region.code()).is_none() => {
            return Err(RegistryError::RegionNotConfigured(region));
        }
        Some(region) => vec![region],
        None => configured_regions(&config),
    };

    let storage = storage::shared(open_storage(Path::new(&config.output.database_path))?);
    let run_id = storage::lock(&storage)?.create_run(config_hash)?;
    tracing::info!("Starting crawl run {}", run_id);

    let context = Arc::new(ScrapeContext::from_config(&config, Arc::clone(&storage))?);
    let scheduler = TokioScheduler::new(config.crawler.max_concurrent_units as usize);
    let throttle = SleepThrottle::from_millis(config.crawler.pause_ms);
    let driver = CrawlDriver::new(Arc::new(config), context, scheduler, throttle);

    let result = driver.run(&regions).await;

    // Units already dispatched still finish and record their outcome
    driver.scheduler().drain().await;

    match result {
        Ok(reports) => {
            let report = CrawlReport {
                run_id,
                regions: reports,
            };
            storage::lock(&storage)?.complete_run(run_id, report.dispatched())?;
            tracing::info!(
                "Crawl run {} completed: {} identifiers dispatched",
                run_id,
                report.dispatched()
            );
            Ok(report)
        }
        Err(e) => {
            if let Err(mark) = storage::lock(&storage).and_then(|mut s| s.fail_run(run_id)) {
                tracing::error!("Could not mark run {} as failed: {}", run_id, mark);
            }
            Err(e)
        }
    }
}
