use serde::Deserialize;

/// Main configuration structure for the registry crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub registry: RegistryConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "region")]
    pub regions: Vec<RegionEntry>,
}

impl Config {
    /// Returns the configured sequence ceiling for a region code, if any
    pub fn ceiling(&self, region_code: u8) -> Option<u32> {
        self.regions
            .iter()
            .find(|entry| entry.id == region_code)
            .map(|entry| entry.ceiling)
    }
}

/// Source registry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Record page URL without the `id` query parameter
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Canonical zone for registration timestamps, as `+HH:MM` or `-HH:MM`
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Dispatch pacing and fetch behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of dispatches between pacing pauses
    #[serde(rename = "request-limit", default = "default_request_limit")]
    pub request_limit: u32,

    /// Length of each pacing pause (milliseconds)
    #[serde(rename = "pause-ms", default = "default_pause_ms")]
    pub pause_ms: u64,

    /// Maximum number of scrape units in flight at once
    #[serde(rename = "max-concurrent-units", default = "default_max_concurrent_units")]
    pub max_concurrent_units: u32,

    /// Per-fetch timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_limit: default_request_limit(),
            pause_ms: default_pause_ms(),
            max_concurrent_units: default_max_concurrent_units(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Per-region crawl bound
#[derive(Debug, Clone, Deserialize)]
pub struct RegionEntry {
    /// Region code (1..=6)
    pub id: u8,

    /// Highest sequence number to attempt
    pub ceiling: u32,
}

fn default_timezone() -> String {
    "+00:00".to_string()
}

fn default_request_limit() -> u32 {
    10
}

fn default_pause_ms() -> u64 {
    1000
}

fn default_max_concurrent_units() -> u32 {
    4
}

fn default_request_timeout_secs() -> u64 {
    30
}
