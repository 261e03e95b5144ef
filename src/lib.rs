//! RealTrack ingest: incremental harvesting of transaction records
//!
//! This crate walks the RealTrack search results newest-first, stores the raw
//! detail page of every record it has not seen before, downloads the assets
//! each record links to, and keeps a ledger of ingested identifiers whose
//! consistency with the files on disk is checked before and after every run.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod integrity;
pub mod output;
pub mod session;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for ingest operations
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Integrity violation: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("Unable to download asset from {url} after {attempts} attempts: {reason}")]
    Download {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
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

    #[error("Missing credentials: set REALTRACK_USERNAME and REALTRACK_PASSWORD")]
    MissingCredentials,
}

/// The site's markup no longer contains something the ingest depends on
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Could not find RT ID in detail page")]
    MissingRecordId,

    #[error("Unable to locate total count on search page")]
    MissingTotalCount,

    #[error("Total count '{0}' is not a valid number")]
    InvalidTotalCount(String),

    #[error("Search submission did not produce a results table")]
    MissingResultsTable,
}

/// Violations of the invariants between the ledger, the files on disk and the site
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("Mismatch between saved HTML files ({content}) and seen ID count ({ledger})")]
    ContentLedgerMismatch { content: usize, ledger: usize },

    #[error("Seen IDs ({seen}) exceed the site's reported total count ({total})")]
    SeenExceedsTotal { seen: usize, total: u64 },

    #[error(
        "Backlog of {backlog} records (total {total}, seen {seen}) suggests the search parameters changed"
    )]
    BacklogTooLarge { seen: usize, total: u64, backlog: u64 },

    #[error("Ordering invariant broken: no previously ingested record was encountered")]
    OrderingBroken,

    #[error("Refusing to overwrite existing raw content for {record_id}")]
    RawContentExists { record_id: String },
}

/// Result type alias for ingest operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, SearchConfig};
pub use crawler::{run_ingest, Coordinator, CrawlOutcome};
pub use session::{HttpSession, PageSession};
pub use state::{CrawlRunState, Traversal};
