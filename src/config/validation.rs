use crate::config::types::{Config, CrawlerConfig, RegionEntry, RegistryConfig, UserAgentConfig};
use crate::identifier::{Region, MAX_SEQUENCE};
use crate::ConfigError;
use chrono::FixedOffset;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_registry_config(&config.registry)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_regions(&config.regions)?;
    Ok(())
}

/// Parses a `+HH:MM` / `-HH:MM` offset into a fixed timezone
pub fn parse_timezone(s: &str) -> Result<FixedOffset, ConfigError> {
    let invalid = || ConfigError::InvalidTimezone(s.to_string());

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };

    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    if hours.len() != 2 || minutes.len() != 2 {
        return Err(invalid());
    }

    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 14 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Validates registry configuration
fn validate_registry_config(config: &RegistryConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    parse_timezone(&config.timezone)?;

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.request_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "request_limit must be >= 1, got {}",
            config.request_limit
        )));
    }

    if config.pause_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "pause_ms must be <= 60000ms, got {}ms",
            config.pause_ms
        )));
    }

    if config.max_concurrent_units < 1 || config.max_concurrent_units > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_units must be between 1 and 64, got {}",
            config.max_concurrent_units
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates per-region ceilings
fn validate_regions(regions: &[RegionEntry]) -> Result<(), ConfigError> {
    if regions.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[region]] entry is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for entry in regions {
        if Region::from_code(entry.id).is_none() {
            return Err(ConfigError::Validation(format!(
                "region id must be between 1 and 6, got {}",
                entry.id
            )));
        }

        if !seen.insert(entry.id) {
            return Err(ConfigError::Validation(format!(
                "region {} is configured more than once",
                entry.id
            )));
        }

        if entry.ceiling < 1 || entry.ceiling > MAX_SEQUENCE {
            return Err(ConfigError::Validation(format!(
                "ceiling for region {} must be between 1 and {}, got {}",
                entry.id, MAX_SEQUENCE, entry.ceiling
            )));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::Validation(format!("Invalid email format: '{}'", email));

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(invalid());
    }

    Ok(())
}
