//! Storage module for persisting registry data
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Company and personnel persistence
//! - Scrape error tracking
//! - Run tracking and resume-point lookup

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::model::{Company, Person};
use crate::state::ErrorStage;
use crate::RegistryError;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Storage handle shared between the driver and in-flight scrape units
pub type SharedStorage = Arc<Mutex<SqliteStorage>>;

/// Wraps a storage backend for sharing across tasks
pub fn shared(storage: SqliteStorage) -> SharedStorage {
    Arc::new(Mutex::new(storage))
}

/// Locks shared storage, surfacing a poisoned lock as a storage error
pub fn lock(storage: &SharedStorage) -> StorageResult<MutexGuard<'_, SqliteStorage>> {
    storage
        .lock()
        .map_err(|_| StorageError::Database("storage lock poisoned".to_string()))
}

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, RegistryError> {
    SqliteStorage::new(path)
}

/// A company as stored, with its row ID
#[derive(Debug, Clone)]
pub struct StoredCompany {
    pub id: i64,
    pub company: Company,
    pub created_at: String,
}

/// A person as stored, with its owning company
#[derive(Debug, Clone)]
pub struct StoredPerson {
    pub id: i64,
    pub company_id: i64,
    pub person: Person,
}

/// A recorded scrape failure
#[derive(Debug, Clone)]
pub struct ScrapeErrorRecord {
    pub id: i64,
    pub cr_id: String,
    pub stage: ErrorStage,
    pub message: String,
    /// Number of failures recorded for this identifier
    pub attempts: u32,
    pub created_at: String,
    pub updated_at: String,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub dispatched: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
