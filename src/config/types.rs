use chrono::Datelike;
use serde::Deserialize;

/// Main configuration structure for the ingest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Site location and login details
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Root URL of the listings site
    #[serde(rename = "base-url")]
    pub base_url: String,

    pub username: Option<String>,

    pub password: Option<String>,

    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.realtrack.com".to_string(),
            username: None,
            password: None,
            user_agent: format!("realtrack-ingest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Traversal and download limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum number of results pages to walk per run
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Attempts per asset download before the run is aborted
    #[serde(rename = "download-attempts")]
    pub download_attempts: u32,

    /// Fixed delay between download attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 1,
            download_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

/// Parameters submitted with the search form
///
/// Built once per run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    #[serde(rename = "property-type")]
    pub property_type: String,

    #[serde(rename = "per-page")]
    pub per_page: String,

    #[serde(rename = "sort-primary")]
    pub sort_primary: String,

    #[serde(rename = "sort-primary-order")]
    pub sort_primary_order: String,

    #[serde(rename = "sort-secondary")]
    pub sort_secondary: Option<String>,

    #[serde(rename = "sort-secondary-order")]
    pub sort_secondary_order: String,

    #[serde(rename = "start-month")]
    pub start_month: String,

    #[serde(rename = "start-year")]
    pub start_year: String,

    #[serde(rename = "end-month")]
    pub end_month: String,

    /// Defaults to the current year when unset
    #[serde(rename = "end-year")]
    pub end_year: Option<String>,
}

impl SearchConfig {
    /// The end year to submit, falling back to the current calendar year
    pub fn resolved_end_year(&self) -> String {
        self.end_year
            .clone()
            .unwrap_or_else(|| chrono::Local::now().year().to_string())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            property_type: "retailBldg".to_string(),
            per_page: "50".to_string(),
            sort_primary: "regDate".to_string(),
            sort_primary_order: "descending".to_string(),
            sort_secondary: None,
            sort_secondary_order: "ascending".to_string(),
            start_month: "1/1".to_string(),
            start_year: "1996".to_string(),
            end_month: "12/31".to_string(),
            end_year: None,
        }
    }
}

/// Locations of everything the ingest persists
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// One `<id>.html` file per ingested record
    #[serde(rename = "content-dir")]
    pub content_dir: String,

    /// One sub-directory per record holding its assets and `manifest.json`
    #[serde(rename = "asset-dir")]
    pub asset_dir: String,

    /// JSON array of already ingested record IDs
    #[serde(rename = "ledger-path")]
    pub ledger_path: String,

    /// Cookies of the last authenticated session, reused by the next run
    #[serde(rename = "session-state-path")]
    pub session_state_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            content_dir: "data/raw_html/realtrack".to_string(),
            asset_dir: "data/raw_assets/realtrack".to_string(),
            ledger_path: "data/state/seen_rt_ids.json".to_string(),
            session_state_path: "data/state/realtrack_storage_state.json".to_string(),
        }
    }
}

/// Login credentials resolved from config and environment
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Returns the login credentials, failing if either half is missing
    pub fn credentials(&self) -> Result<Credentials, crate::ConfigError> {
        match (&self.site.username, &self.site.password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Ok(Credentials {
                    username: username.clone(),
                    password: password.clone(),
                })
            }
            _ => Err(crate::ConfigError::MissingCredentials),
        }
    }
}
