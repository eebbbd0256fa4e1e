//! Statistics generation from the registry database
//!
//! This module provides functionality for extracting and displaying
//! crawl progress from the storage layer.

use crate::identifier::{next_sequence, Region};
use crate::state::ErrorStage;
use crate::storage::{RunRecord, Storage};
use crate::RegistryError;
use std::collections::HashMap;

/// Registry crawl statistics summary
#[derive(Debug, Clone)]
pub struct RegistryStatistics {
    /// Stored companies per region
    pub companies_by_region: HashMap<Region, u64>,

    /// Next sequence each region would resume at
    pub resume_points: HashMap<Region, u32>,

    /// Total number of stored persons
    pub total_persons: u64,

    /// Companies whose page had no relationship table
    pub missing_personnel: u64,

    /// Recorded scrape errors per stage
    pub errors_by_stage: HashMap<ErrorStage, u64>,

    /// Companies left without their personnel batch
    pub unreconciled: Vec<String>,

    /// Most recent crawl run, if any
    pub latest_run: Option<RunRecord>,
}

impl RegistryStatistics {
    pub fn total_companies(&self) -> u64 {
        self.companies_by_region.values().sum()
    }

    pub fn total_errors(&self) -> u64 {
        self.errors_by_stage.values().sum()
    }
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> Result<RegistryStatistics, RegistryError> {
    let mut resume_points = HashMap::new();
    for region in Region::ALL {
        resume_points.insert(region, next_sequence(storage, region)?);
    }

    Ok(RegistryStatistics {
        companies_by_region: storage.count_companies_by_region()?,
        resume_points,
        total_persons: storage.count_persons()?,
        missing_personnel: storage.count_missing_personnel()?,
        errors_by_stage: storage.count_errors_by_stage()?,
        unreconciled: storage.find_unreconciled_companies()?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RegistryStatistics) {
    println!("=== Registry Statistics ===\n");

    println!("Companies by Region:");
    for region in Region::ALL {
        let count = stats.companies_by_region.get(&region).copied().unwrap_or(0);
        let resume = stats.resume_points.get(&region).copied().unwrap_or(1);
        println!("  {}: {} (next sequence {})", region, count, resume);
    }
    println!("  Total: {}", stats.total_companies());
    println!();

    println!("Personnel:");
    println!("  Persons stored: {}", stats.total_persons);
    println!(
        "  Companies without personnel data: {}",
        stats.missing_personnel
    );
    println!();

    println!("Scrape Errors ({}):", stats.total_errors());
    for stage in ErrorStage::ALL {
        let count = stats.errors_by_stage.get(&stage).copied().unwrap_or(0);
        println!("  {}: {}", stage, count);
    }
    println!();

    if !stats.unreconciled.is_empty() {
        println!("Unreconciled Companies ({}):", stats.unreconciled.len());
        for cr_id in &stats.unreconciled {
            println!("  - {}", cr_id);
        }
        println!();
    }

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run:");
            println!("  ID: {}", run.id);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            println!("  Dispatched: {}", run.dispatched);
        }
        None => println!("No crawl runs recorded"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;

    #[test]
    fn test_statistics_on_empty_database() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let stats = load_statistics(&storage).unwrap();

        assert_eq!(stats.total_companies(), 0);
        assert_eq!(stats.total_errors(), 0);
        assert_eq!(stats.resume_points.get(&Region::Beirut), Some(&1));
        assert!(stats.unreconciled.is_empty());
        assert!(stats.latest_run.is_none());
    }

    #[test]
    fn test_statistics_count_errors_and_runs() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("abc").unwrap();
        storage.complete_run(run_id, 12).unwrap();
        storage
            .record_error("1000000001", ErrorStage::Company, "Field not found")
            .unwrap();
        storage
            .record_error("1000000002", ErrorStage::Unknown, "HTTP 500")
            .unwrap();
        storage
            .record_error("1000000003", ErrorStage::Unknown, "timeout")
            .unwrap();

        let stats = load_statistics(&storage).unwrap();
        assert_eq!(stats.total_errors(), 3);
        assert_eq!(stats.errors_by_stage.get(&ErrorStage::Unknown), Some(&2));

        let run = stats.latest_run.unwrap();
        assert_eq!(run.id, run_id);
        assert_eq!(run.dispatched, 12);
    }
}
