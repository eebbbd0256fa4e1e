//! Registry Crawler: incremental scraper for a commercial registry
//!
//! This crate walks the registry's per-region identifier space, fetches one
//! page per record, parses it into a company and its affiliated persons, and
//! stores the results in SQLite while recording every per-record failure.

pub mod config;
pub mod crawler;
pub mod identifier;
pub mod model;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for crawler operations
///
/// Only infrastructure-level failures end up here. Per-record failures are
/// recorded as ScrapeError rows and never abort a crawl.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Identifier error: {0}")]
    Identifier(#[from] IdentifierError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: state::RegionState,
        to: state::RegionState,
    },

    #[error("Region {0} is not configured")]
    RegionNotConfigured(identifier::Region),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid timezone offset: {0}")]
    InvalidTimezone(String),
}

/// Identifier-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Unknown region code: {0}")]
    UnknownRegion(u8),

    #[error("Sequence out of range: {0}")]
    SequenceOutOfRange(u32),

    #[error("Malformed identifier: {0}")]
    Malformed(String),
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use identifier::{Identifier, Region};
pub use model::{Company, Person};
pub use state::{ErrorStage, RegionState};
