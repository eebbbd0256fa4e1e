//! Scrape units
//!
//! A scrape unit is the fetch -> parse -> persist work for one identifier.
//! Units run independently; every failure is converted into a ScrapeError
//! record at the unit boundary and never reaches the crawl driver.

use crate::config::{parse_timezone, Config};
use crate::crawler::extractor::{ExtractError, FieldExtractor};
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchError};
use crate::crawler::parser::{ParsedRecord, RecordParser};
use crate::identifier::Identifier;
use crate::state::ErrorStage;
use crate::storage::{self, SharedStorage, Storage, StorageError};
use crate::RegistryError;
use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Why a scrape unit did not fully succeed
#[derive(Debug, Error)]
pub enum ScrapeFailure {
    #[error("{0}")]
    Transport(#[from] FetchError),

    #[error("Company extraction failed: {0}")]
    CompanyExtraction(ExtractError),

    #[error("Personnel extraction failed: {0}")]
    PersonnelExtraction(ExtractError),

    #[error("Persistence conflict: {message}")]
    PersistenceConflict { stage: ErrorStage, message: String },

    #[error("Persistence failed: {message}")]
    Persistence { stage: ErrorStage, message: String },
}

impl ScrapeFailure {
    /// Stage tag recorded with the failure
    pub fn stage(&self) -> ErrorStage {
        match self {
            Self::Transport(_) => ErrorStage::Unknown,
            Self::CompanyExtraction(_) => ErrorStage::Company,
            Self::PersonnelExtraction(_) => ErrorStage::Personnel,
            Self::PersistenceConflict { stage, .. } | Self::Persistence { stage, .. } => *stage,
        }
    }

    fn from_storage(stage: ErrorStage, err: StorageError) -> Self {
        if err.is_conflict() {
            Self::PersistenceConflict {
                stage,
                message: err.to_string(),
            }
        } else {
            Self::Persistence {
                stage,
                message: err.to_string(),
            }
        }
    }
}

/// What a successful unit stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitOutcome {
    pub company_id: i64,
    pub persons: usize,
}

/// Everything a scrape unit needs, shared by all units of a crawl
pub struct ScrapeContext {
    client: Client,
    storage: SharedStorage,
    parser: RecordParser,
    base_url: Url,
}

impl ScrapeContext {
    pub fn new(client: Client, storage: SharedStorage, parser: RecordParser, base_url: Url) -> Self {
        Self {
            client,
            storage,
            parser,
            base_url,
        }
    }

    /// Builds the context from configuration
    pub fn from_config(config: &Config, storage: SharedStorage) -> Result<Self, RegistryError> {
        let base_url = Url::parse(&config.registry.base_url)?;
        let timezone = parse_timezone(&config.registry.timezone)?;
        let client = build_http_client(&config.user_agent, config.crawler.request_timeout_secs)?;
        let parser = RecordParser::new(FieldExtractor::new(timezone));

        Ok(Self::new(client, storage, parser, base_url))
    }

    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/// Fetch, parse and persist work for a single identifier
pub struct ScrapeUnit {
    identifier: Identifier,
    locator: String,
    context: Arc<ScrapeContext>,
}

impl ScrapeUnit {
    pub fn new(identifier: Identifier, context: Arc<ScrapeContext>) -> Self {
        let locator = identifier.locator(&context.base_url).to_string();
        Self {
            identifier,
            locator,
            context,
        }
    }

    pub fn identifier(&self) -> Identifier {
        self.identifier
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Runs the unit to completion
    ///
    /// Failures are recorded as ScrapeError rows before being returned; the
    /// return value is informational only.
    pub async fn run(self) -> Result<UnitOutcome, ScrapeFailure> {
        let result = self.execute().await;

        match &result {
            Ok(outcome) => tracing::debug!(
                "Stored {} with {} persons",
                self.identifier,
                outcome.persons
            ),
            Err(failure) => self.record_failure(failure),
        }

        result
    }

    async fn execute(&self) -> Result<UnitOutcome, ScrapeFailure> {
        let page = fetch_page(&self.context.client, &self.locator).await?;

        let parsed = self
            .context
            .parser
            .parse_page(&page.body, self.identifier, &self.locator)
            .map_err(ScrapeFailure::CompanyExtraction)?;

        self.persist(parsed)
    }

    /// Stores the company, then its personnel batch
    ///
    /// A personnel failure leaves the company stored without persons.
    fn persist(&self, parsed: ParsedRecord) -> Result<UnitOutcome, ScrapeFailure> {
        let mut storage = storage::lock(&self.context.storage)
            .map_err(|e| ScrapeFailure::from_storage(ErrorStage::Company, e))?;

        let company_id = storage
            .insert_company(&parsed.company)
            .map_err(|e| ScrapeFailure::from_storage(ErrorStage::Company, e))?;

        let persons = parsed
            .personnel
            .map_err(ScrapeFailure::PersonnelExtraction)?;

        if !persons.is_empty() {
            storage
                .insert_persons_batch(company_id, &persons)
                .map_err(|e| ScrapeFailure::from_storage(ErrorStage::Personnel, e))?;
        }

        Ok(UnitOutcome {
            company_id,
            persons: persons.len(),
        })
    }

    fn record_failure(&self, failure: &ScrapeFailure) {
        let cr_id = self.identifier.canonical_form();
        let stage = failure.stage();
        tracing::warn!("Scrape of {} failed at {} stage: {}", cr_id, stage, failure);

        let recorded = storage::lock(&self.context.storage)
            .and_then(|mut storage| storage.record_error(&cr_id, stage, &failure.to_string()));

        if let Err(e) = recorded {
            tracing::error!("Could not record scrape error for {}: {}", cr_id, e);
        }
    }
}
