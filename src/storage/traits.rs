//! Storage traits and error types
//!
//! This module defines the Persistence Gateway interface the crawl pipeline
//! writes to and reads resume state from.

use crate::identifier::Region;
use crate::model::{Company, Person};
use crate::state::ErrorStage;
use crate::storage::{RunRecord, ScrapeErrorRecord, StoredCompany, StoredPerson};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl StorageError {
    /// Returns true for unique-key and foreign-key conflicts
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ConstraintViolation(_))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Writes are append-only for companies and persons. Scrape errors are
/// upserted by identifier.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run and returns its ID
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Marks a run as completed with a finish timestamp and its dispatch count
    fn complete_run(&mut self, run_id: i64, dispatched: u64) -> StorageResult<()>;

    /// Marks a run as failed
    fn fail_run(&mut self, run_id: i64) -> StorageResult<()>;

    // ===== Companies and Persons =====

    /// Inserts a company in a single statement and returns its row ID
    ///
    /// A second insert for the same identifier or source URL fails with
    /// `StorageError::ConstraintViolation`.
    fn insert_company(&mut self, company: &Company) -> StorageResult<i64>;

    /// Inserts all persons of one company atomically
    fn insert_persons_batch(&mut self, company_id: i64, persons: &[Person]) -> StorageResult<()>;

    /// Maximum persisted sequence for a region, `None` if the region is empty
    fn highest_sequence_for_region(&self, region: Region) -> StorageResult<Option<u32>>;

    /// Gets a company by its canonical identifier
    fn get_company(&self, cr_id: &str) -> StorageResult<Option<StoredCompany>>;

    /// Gets all persons of a company, in insertion order
    fn get_persons(&self, company_id: i64) -> StorageResult<Vec<StoredPerson>>;

    // ===== Scrape Errors =====

    /// Records a scrape failure
    ///
    /// Safe to call repeatedly for the same identifier: the existing record
    /// takes the new stage and message and its attempt counter goes up.
    fn record_error(&mut self, cr_id: &str, stage: ErrorStage, message: &str)
        -> StorageResult<()>;

    /// Gets the error recorded for an identifier
    fn get_error(&self, cr_id: &str) -> StorageResult<Option<ScrapeErrorRecord>>;

    /// Lists recorded errors, optionally for one stage only
    fn list_errors(&self, stage: Option<ErrorStage>) -> StorageResult<Vec<ScrapeErrorRecord>>;

    // ===== Statistics =====

    /// Counts companies per region
    fn count_companies_by_region(&self) -> StorageResult<HashMap<Region, u64>>;

    /// Counts all persons
    fn count_persons(&self) -> StorageResult<u64>;

    /// Counts companies whose page had no relationship table
    fn count_missing_personnel(&self) -> StorageResult<u64>;

    /// Counts recorded errors per stage
    fn count_errors_by_stage(&self) -> StorageResult<HashMap<ErrorStage, u64>>;

    /// Identifiers of companies that expect personnel but have none stored
    ///
    /// This is the state left behind by a crash between the company insert
    /// and the personnel batch.
    fn find_unreconciled_companies(&self) -> StorageResult<Vec<String>>;
}
