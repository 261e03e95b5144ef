//! Configuration module for the RealTrack ingest
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Credentials, the page limit and the search years can also come from
//! the environment (`REALTRACK_*` variables), which take precedence.
//!
//! # Example
//!
//! ```no_run
//! use realtrack_ingest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("realtrack.toml")).unwrap();
//! println!("Walking up to {} results pages", config.crawl.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, Credentials, SearchConfig, SiteConfig, StorageConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_with_hash, ENV_END_YEAR,
    ENV_MAX_PAGES, ENV_PASSWORD, ENV_START_YEAR, ENV_USERNAME,
};
pub use validation::validate;
