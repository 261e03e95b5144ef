use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variables consulted after the TOML file is parsed
pub const ENV_USERNAME: &str = "REALTRACK_USERNAME";
pub const ENV_PASSWORD: &str = "REALTRACK_PASSWORD";
pub const ENV_MAX_PAGES: &str = "REALTRACK_MAX_PAGES";
pub const ENV_START_YEAR: &str = "REALTRACK_SEARCH_START_YEAR";
pub const ENV_END_YEAR: &str = "REALTRACK_SEARCH_END_YEAR";

/// Loads, overrides from the process environment, and validates a configuration file
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use realtrack_ingest::config::load_config;
///
/// let config = load_config(Path::new("realtrack.toml")).unwrap();
/// println!("Max pages: {}", config.crawl.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    validate(&config)?;

    Ok(config)
}

/// Applies environment overrides using the given lookup
///
/// Empty values are treated as unset. Credentials and the search start/end
/// years replace the file values; the page count must parse as an integer.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(username) = get(ENV_USERNAME) {
        config.site.username = Some(username);
    }
    if let Some(password) = get(ENV_PASSWORD) {
        config.site.password = Some(password);
    }
    if let Some(max_pages) = get(ENV_MAX_PAGES) {
        config.crawl.max_pages = max_pages.trim().parse().map_err(|_| {
            ConfigError::Validation(format!(
                "{} must be an integer >= 1, got '{}'",
                ENV_MAX_PAGES, max_pages
            ))
        })?;
    }
    if let Some(start_year) = get(ENV_START_YEAR) {
        config.search.start_year = start_year;
    }
    if let Some(end_year) = get(ENV_END_YEAR) {
        config.search.end_year = Some(end_year);
    }

    Ok(())
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs can be correlated with the configuration they used.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
