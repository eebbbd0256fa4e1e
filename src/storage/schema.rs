//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the registry database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    dispatched INTEGER NOT NULL DEFAULT 0
);

-- One row per successfully parsed registry record
CREATE TABLE IF NOT EXISTS companies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cr_id TEXT NOT NULL UNIQUE,
    region INTEGER NOT NULL,
    sequence INTEGER NOT NULL,
    source_url TEXT NOT NULL UNIQUE,
    registration_number INTEGER NOT NULL,
    name TEXT NOT NULL,
    additional_name TEXT NOT NULL,
    registration_date TEXT NOT NULL,
    record_type TEXT NOT NULL,
    status TEXT NOT NULL,
    duration TEXT NOT NULL,
    legal_form TEXT NOT NULL,
    capital TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    missing_personnel_data INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(region, sequence)
);

CREATE INDEX IF NOT EXISTS idx_companies_name ON companies(name);
CREATE INDEX IF NOT EXISTS idx_companies_region_sequence ON companies(region, sequence);

-- Persons affiliated with a company
CREATE TABLE IF NOT EXISTS persons (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    company_id INTEGER NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    nationality TEXT NOT NULL,
    relationship TEXT NOT NULL,
    stock INTEGER NOT NULL DEFAULT 0,
    quota INTEGER NOT NULL DEFAULT 0,
    ratio INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    UNIQUE(company_id, name)
);

CREATE INDEX IF NOT EXISTS idx_persons_name ON persons(name);
CREATE INDEX IF NOT EXISTS idx_persons_company ON persons(company_id);

-- At most one failure record per identifier
CREATE TABLE IF NOT EXISTS scrape_errors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cr_id TEXT NOT NULL UNIQUE,
    stage TEXT NOT NULL,
    message TEXT NOT NULL,
    attempts INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_scrape_errors_stage ON scrape_errors(stage);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
