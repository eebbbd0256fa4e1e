//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::identifier::{Identifier, Region};
use crate::model::{Company, Person};
use crate::state::ErrorStage;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus, ScrapeErrorRecord, StoredCompany, StoredPerson};
use crate::RegistryError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

const COMPANY_COLUMNS: &str = "id, cr_id, source_url, registration_number, name, additional_name,
    registration_date, record_type, status, duration, legal_form, capital, title, description,
    missing_personnel_data, created_at";

const ERROR_COLUMNS: &str = "id, cr_id, stage, message, attempts, created_at, updated_at";

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, dispatched";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` and ensures the schema exists
    pub fn new(path: &Path) -> Result<Self, RegistryError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, RegistryError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Maps constraint failures to `ConstraintViolation`, everything else to `Sqlite`
fn classify(err: rusqlite::Error) -> StorageError {
    match &err {
        rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
            StorageError::ConstraintViolation(msg.clone().unwrap_or_else(|| e.to_string()))
        }
        _ => StorageError::Sqlite(err),
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
        dispatched: row.get::<_, i64>(5)? as u64,
    })
}

fn error_from_row(row: &Row<'_>) -> rusqlite::Result<ScrapeErrorRecord> {
    Ok(ScrapeErrorRecord {
        id: row.get(0)?,
        cr_id: row.get(1)?,
        stage: ErrorStage::from_db_string(&row.get::<_, String>(2)?)
            .unwrap_or(ErrorStage::Unknown),
        message: row.get(3)?,
        attempts: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Raw company columns; converted to domain types outside the row closure
struct CompanyRow {
    id: i64,
    cr_id: String,
    source_url: String,
    registration_number: i64,
    name: String,
    additional_name: String,
    registration_date: String,
    record_type: String,
    status: String,
    duration: String,
    legal_form: String,
    capital: String,
    title: String,
    description: String,
    missing_personnel_data: bool,
    created_at: String,
}

impl CompanyRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            cr_id: row.get(1)?,
            source_url: row.get(2)?,
            registration_number: row.get(3)?,
            name: row.get(4)?,
            additional_name: row.get(5)?,
            registration_date: row.get(6)?,
            record_type: row.get(7)?,
            status: row.get(8)?,
            duration: row.get(9)?,
            legal_form: row.get(10)?,
            capital: row.get(11)?,
            title: row.get(12)?,
            description: row.get(13)?,
            missing_personnel_data: row.get(14)?,
            created_at: row.get(15)?,
        })
    }

    fn into_stored(self) -> StorageResult<StoredCompany> {
        let identifier = Identifier::from_str(&self.cr_id)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let registration_date = DateTime::parse_from_rfc3339(&self.registration_date)
            .map_err(|e| StorageError::Serialization(format!("registration_date: {}", e)))?;
        let capital = Decimal::from_str(&self.capital)
            .map_err(|e| StorageError::Serialization(format!("capital: {}", e)))?;

        Ok(StoredCompany {
            id: self.id,
            company: Company {
                identifier,
                source_url: self.source_url,
                registration_number: self.registration_number as u64,
                name: self.name,
                additional_name: self.additional_name,
                registration_date,
                record_type: self.record_type,
                status: self.status,
                duration: self.duration,
                legal_form: self.legal_form,
                capital,
                title: self.title,
                description: self.description,
                missing_personnel_data: self.missing_personnel_data,
            },
            created_at: self.created_at,
        })
    }
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now(), config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    fn complete_run(&mut self, run_id: i64, dispatched: u64) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, dispatched = ?3 WHERE id = ?4",
            params![
                RunStatus::Completed.to_db_string(),
                now(),
                dispatched as i64,
                run_id
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn fail_run(&mut self, run_id: i64) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![RunStatus::Failed.to_db_string(), now(), run_id],
        )?;
        Ok(())
    }

    // ===== Companies and Persons =====

    fn insert_company(&mut self, company: &Company) -> StorageResult<i64> {
        let now = now();
        self.conn
            .execute(
                "INSERT INTO companies (cr_id, region, sequence, source_url, registration_number,
                 name, additional_name, registration_date, record_type, status, duration,
                 legal_form, capital, title, description, missing_personnel_data,
                 created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?17)",
                params![
                    company.cr_id(),
                    company.region().code(),
                    company.sequence(),
                    company.source_url,
                    company.registration_number as i64,
                    company.name,
                    company.additional_name,
                    company.registration_date.to_rfc3339(),
                    company.record_type,
                    company.status,
                    company.duration,
                    company.legal_form,
                    company.capital.to_string(),
                    company.title,
                    company.description,
                    company.missing_personnel_data,
                    now,
                ],
            )
            .map_err(classify)?;

        Ok(self.conn.last_insert_rowid())
    }

    fn insert_persons_batch(&mut self, company_id: i64, persons: &[Person]) -> StorageResult<()> {
        let now = now();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO persons (company_id, name, nationality, relationship, stock, quota,
                 ratio, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for person in persons {
                stmt.execute(params![
                    company_id,
                    person.name,
                    person.nationality,
                    person.relationship,
                    person.stock as i64,
                    person.quota as i64,
                    person.ratio as i64,
                    now,
                ])
                .map_err(classify)?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn highest_sequence_for_region(&self, region: Region) -> StorageResult<Option<u32>> {
        let highest: Option<u32> = self.conn.query_row(
            "SELECT MAX(sequence) FROM companies WHERE region = ?1",
            params![region.code()],
            |row| row.get(0),
        )?;
        Ok(highest)
    }

    fn get_company(&self, cr_id: &str) -> StorageResult<Option<StoredCompany>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM companies WHERE cr_id = ?1", COMPANY_COLUMNS),
                params![cr_id],
                CompanyRow::from_row,
            )
            .optional()?;

        row.map(CompanyRow::into_stored).transpose()
    }

    fn get_persons(&self, company_id: i64) -> StorageResult<Vec<StoredPerson>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, company_id, name, nationality, relationship, stock, quota, ratio
             FROM persons WHERE company_id = ?1 ORDER BY id",
        )?;

        let persons = stmt
            .query_map(params![company_id], |row| {
                Ok(StoredPerson {
                    id: row.get(0)?,
                    company_id: row.get(1)?,
                    person: Person {
                        name: row.get(2)?,
                        nationality: row.get(3)?,
                        relationship: row.get(4)?,
                        stock: row.get::<_, i64>(5)? as u64,
                        quota: row.get::<_, i64>(6)? as u64,
                        ratio: row.get::<_, i64>(7)? as u64,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(persons)
    }

    // ===== Scrape Errors =====

    fn record_error(
        &mut self,
        cr_id: &str,
        stage: ErrorStage,
        message: &str,
    ) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO scrape_errors (cr_id, stage, message, attempts, created_at, updated_at)
             VALUES (?1, ?2, ?3, 1, ?4, ?4)
             ON CONFLICT(cr_id) DO UPDATE SET
                stage = excluded.stage,
                message = excluded.message,
                attempts = scrape_errors.attempts + 1,
                updated_at = excluded.updated_at",
            params![cr_id, stage.to_db_string(), message, now()],
        )?;
        Ok(())
    }

    fn get_error(&self, cr_id: &str) -> StorageResult<Option<ScrapeErrorRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {} FROM scrape_errors WHERE cr_id = ?1", ERROR_COLUMNS),
                params![cr_id],
                error_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn list_errors(&self, stage: Option<ErrorStage>) -> StorageResult<Vec<ScrapeErrorRecord>> {
        let records = match stage {
            Some(stage) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM scrape_errors WHERE stage = ?1 ORDER BY cr_id",
                    ERROR_COLUMNS
                ))?;
                let rows = stmt.query_map(params![stage.to_db_string()], error_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM scrape_errors ORDER BY cr_id",
                    ERROR_COLUMNS
                ))?;
                let rows = stmt.query_map([], error_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(records)
    }

    // ===== Statistics =====

    fn count_companies_by_region(&self) -> StorageResult<HashMap<Region, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT region, COUNT(*) FROM companies GROUP BY region")?;

        let rows = stmt.query_map([], |row| Ok((row.get::<_, u8>(0)?, row.get::<_, i64>(1)?)))?;

        let mut counts = HashMap::new();
        for row in rows {
            let (code, count) = row?;
            if let Some(region) = Region::from_code(code) {
                counts.insert(region, count as u64);
            }
        }

        Ok(counts)
    }

    fn count_persons(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM persons", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_missing_personnel(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM companies WHERE missing_personnel_data = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_errors_by_stage(&self) -> StorageResult<HashMap<ErrorStage, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT stage, COUNT(*) FROM scrape_errors GROUP BY stage")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (stage_str, count) = row?;
            if let Some(stage) = ErrorStage::from_db_string(&stage_str) {
                counts.insert(stage, count as u64);
            }
        }

        Ok(counts)
    }

    fn find_unreconciled_companies(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.cr_id FROM companies c
             WHERE c.missing_personnel_data = 0
               AND NOT EXISTS (SELECT 1 FROM persons p WHERE p.company_id = c.id)
             ORDER BY c.cr_id",
        )?;

        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(ids)
    }
}
