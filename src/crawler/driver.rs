//! Crawl driver - per-region dispatch orchestration
//!
//! For each configured region the driver:
//! - Resumes from the highest persisted sequence
//! - Dispatches one scrape unit per identifier up to the region's ceiling
//! - Pauses after every `request-limit` dispatches
//!
//! The driver never waits on a unit's outcome. Units record their own
//! failures, so a bad record can not stop a region.

use crate::config::Config;
use crate::crawler::scheduler::TaskScheduler;
use crate::crawler::throttle::Throttle;
use crate::crawler::unit::{ScrapeContext, ScrapeUnit};
use crate::identifier::{next_sequence, Identifier, Region};
use crate::state::RegionState;
use crate::storage::{self, Storage};
use crate::RegistryError;
use std::sync::Arc;

/// Where a region's next crawl would start and stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionPlan {
    pub region: Region,
    /// First sequence to dispatch
    pub start: u32,
    /// Last sequence to dispatch, inclusive
    pub ceiling: u32,
}

impl RegionPlan {
    /// Number of identifiers the plan would dispatch
    pub fn pending(&self) -> u64 {
        if self.start > self.ceiling {
            0
        } else {
            u64::from(self.ceiling - self.start) + 1
        }
    }
}

/// What one region's crawl dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionReport {
    pub region: Region,
    pub start: u32,
    pub ceiling: u32,
    pub dispatched: u64,
    pub pauses: u64,
}

/// Computes the dispatch range for a region from persisted state
pub fn plan_region(
    storage: &dyn Storage,
    config: &Config,
    region: Region,
) -> Result<RegionPlan, RegistryError> {
    let ceiling = config
        .ceiling(region.code())
        .ok_or(RegistryError::RegionNotConfigured(region))?;
    let start = next_sequence(storage, region)?;

    Ok(RegionPlan {
        region,
        start,
        ceiling,
    })
}

/// Regions named in the configuration, in configuration order
pub fn configured_regions(config: &Config) -> Vec<Region> {
    config
        .regions
        .iter()
        .filter_map(|entry| Region::from_code(entry.id))
        .collect()
}

/// Drives the per-region dispatch loop
pub struct CrawlDriver<S: TaskScheduler, T: Throttle> {
    config: Arc<Config>,
    context: Arc<ScrapeContext>,
    scheduler: S,
    throttle: T,
}

impl<S: TaskScheduler, T: Throttle> CrawlDriver<S, T> {
    pub fn new(config: Arc<Config>, context: Arc<ScrapeContext>, scheduler: S, throttle: T) -> Self {
        Self {
            config,
            context,
            scheduler,
            throttle,
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Crawls the given regions one after another
    pub async fn run(&self, regions: &[Region]) -> Result<Vec<RegionReport>, RegistryError> {
        let mut reports = Vec::with_capacity(regions.len());
        for &region in regions {
            reports.push(self.run_region(region).await?);
        }
        Ok(reports)
    }

    /// Dispatches every outstanding identifier of one region
    ///
    /// The pacing counter starts at zero for each region.
    pub async fn run_region(&self, region: Region) -> Result<RegionReport, RegistryError> {
        let mut state = RegionState::Idle;
        advance(&mut state, RegionState::Resuming)?;

        let plan = {
            let storage = storage::lock(self.context.storage())?;
            plan_region(&*storage, &self.config, region)?
        };

        let mut report = RegionReport {
            region,
            start: plan.start,
            ceiling: plan.ceiling,
            dispatched: 0,
            pauses: 0,
        };

        if plan.pending() == 0 {
            tracing::info!("{} is fully crawled up to {}", region, plan.ceiling);
            advance(&mut state, RegionState::Done)?;
            return Ok(report);
        }

        tracing::info!(
            "Crawling {} from sequence {} to {}",
            region,
            plan.start,
            plan.ceiling
        );
        advance(&mut state, RegionState::Dispatching)?;

        let request_limit = u64::from(self.config.crawler.request_limit.max(1));

        for sequence in plan.start..=plan.ceiling {
            if report.dispatched > 0 && report.dispatched % request_limit == 0 {
                advance(&mut state, RegionState::Throttling)?;
                self.throttle.pause().await;
                report.pauses += 1;
                advance(&mut state, RegionState::Dispatching)?;

                tracing::debug!("{}: {} dispatched so far", region, report.dispatched);
            }

            let identifier = Identifier::new(region, sequence)?;
            self.scheduler
                .submit(ScrapeUnit::new(identifier, Arc::clone(&self.context)));
            report.dispatched += 1;
        }

        advance(&mut state, RegionState::Done)?;
        tracing::info!(
            "{}: dispatched {} identifiers with {} pauses",
            region,
            report.dispatched,
            report.pauses
        );

        Ok(report)
    }
}

fn advance(state: &mut RegionState, next: RegionState) -> Result<(), RegistryError> {
    if !state.can_transition_to(next) {
        return Err(RegistryError::InvalidTransition {
            from: *state,
            to: next,
        });
    }
    tracing::trace!("Region state {} -> {}", state, next);
    *state = next;
    Ok(())
}
