use crate::config::types::{Config, CrawlConfig, SearchConfig, SiteConfig, StorageConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawl_config(&config.crawl)?;
    validate_search_config(&config.search)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

/// Validates the site location
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            config.base_url
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates traversal and download limits
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.download_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "download-attempts must be >= 1, got {}",
            config.download_attempts
        )));
    }

    Ok(())
}

/// Validates the search form parameters
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    validate_year("start-year", &config.start_year)?;
    if let Some(end_year) = &config.end_year {
        validate_year("end-year", end_year)?;
    }

    if config.property_type.is_empty() || config.per_page.is_empty() {
        return Err(ConfigError::Validation(
            "property-type and per-page cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates storage locations
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("content-dir", &config.content_dir),
        ("asset-dir", &config.asset_dir),
        ("ledger-path", &config.ledger_path),
        ("session-state-path", &config.session_state_path),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    if config.session_state_path == config.ledger_path {
        return Err(ConfigError::Validation(
            "session-state-path and ledger-path must differ".to_string(),
        ));
    }

    if config.content_dir == config.asset_dir {
        return Err(ConfigError::Validation(
            "content-dir and asset-dir must differ".to_string(),
        ));
    }

    Ok(())
}

/// A year must be four ASCII digits
fn validate_year(field: &str, year: &str) -> Result<(), ConfigError> {
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::Validation(format!(
            "{} must be a four digit year, got '{}'",
            field, year
        )));
    }
    Ok(())
}
