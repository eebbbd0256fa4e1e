//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with a proper user agent string
//! - GET requests for record pages
//! - Classifying transport failures
//!
//! There is no retry here. A failed fetch is recorded against the identifier
//! and the next crawl or the scheduler decides whether to try again.

use crate::config::UserAgentConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Raw HTML of a fetched record page
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Page body content
    pub body: String,
}

/// Transport-level fetch failures
///
/// A page that loads but describes a missing record is not an error here;
/// the record parser rejects it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP {status_code} for {url}")]
    Status { url: String, status_code: u16 },

    #[error("Unreadable response body for {url}: {message}")]
    Body { url: String, message: String },

    #[error("Request failed for {url}: {message}")]
    Other { url: String, message: String },
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use registry_crawler::config::UserAgentConfig;
/// use registry_crawler::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "RegistryCrawler".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, 30).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout_secs: u64,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one record page
///
/// | Condition            | Result             |
/// |----------------------|--------------------|
/// | 2xx with a body      | `Ok(RawPage)`      |
/// | Non-2xx status       | `FetchError::Status` |
/// | Timeout              | `FetchError::Timeout` |
/// | Connection refused   | `FetchError::Connect` |
/// | Body not decodable   | `FetchError::Body` |
pub async fn fetch_page(client: &Client, url: &str) -> Result<RawPage, FetchError> {
    let response = client.get(url).send().await.map_err(|e| classify(url, e))?;

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status_code: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| FetchError::Body {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    Ok(RawPage {
        final_url,
        status_code: status.as_u16(),
        body,
    })
}

fn classify(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else {
        FetchError::Other {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
