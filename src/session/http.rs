//! HTTP session against the RealTrack site
//!
//! This module handles every request the ingest makes, including:
//! - Building the HTTP client around a shared cookie jar and user agent
//! - Detecting an authenticated session and logging in when needed
//! - Saving the login cookies so the next run can reuse them
//! - Submitting the search form and paging through results
//! - Fetching detail pages and downloading assets with retries

use crate::config::{Config, Credentials, SearchConfig};
use crate::session::cookies::SessionState;
use crate::session::retry::RetryPolicy;
use crate::session::search::{
    results_page_path, search_form, AUTH_MARKER, LOGIN_PATH, RESULTS_PATH, RESULTS_TABLE_MARKER,
    SEARCH_FORM_PATH,
};
use crate::session::PageSession;
use crate::{ConfigError, ExtractionError, IngestError};
use async_trait::async_trait;
use reqwest::header::REFERER;
use reqwest::{Client, Response};
use reqwest_cookie_store::CookieStoreMutex;
use std::sync::Arc;
use std::time::Duration;

/// Builds an HTTP client that keeps cookies in `cookies`
///
/// # Example
///
/// ```no_run
/// use realtrack_ingest::session::{build_http_client, SessionState};
///
/// let state = SessionState::in_memory();
/// let client = build_http_client("realtrack-ingest/0.1", state.jar()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &str,
    cookies: Arc<CookieStoreMutex>,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .cookie_provider(cookies)
        .gzip(true)
        .brotli(true)
        .build()
}

/// A logged-in browsing session over plain HTTP
pub struct HttpSession {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
    retry: RetryPolicy,
    state: SessionState,
}

impl HttpSession {
    /// Creates a session for `base_url` with cookies kept in memory only
    ///
    /// Credentials are only needed if the site does not already consider the
    /// session authenticated.
    pub fn new(
        base_url: &str,
        user_agent: &str,
        credentials: Option<Credentials>,
        retry: RetryPolicy,
    ) -> crate::Result<Self> {
        Self::with_session_state(
            base_url,
            user_agent,
            credentials,
            retry,
            SessionState::in_memory(),
        )
    }

    /// Creates a session whose cookies come from, and are saved to, `state`
    pub fn with_session_state(
        base_url: &str,
        user_agent: &str,
        credentials: Option<Credentials>,
        retry: RetryPolicy,
        state: SessionState,
    ) -> crate::Result<Self> {
        let client =
            build_http_client(user_agent, state.jar()).map_err(|source| IngestError::Http {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            retry,
            state,
        })
    }

    /// Creates a session from the loaded configuration, reusing saved cookies
    pub fn from_config(config: &Config, credentials: Credentials) -> crate::Result<Self> {
        let retry = RetryPolicy::new(
            config.crawl.download_attempts,
            Duration::from_millis(config.crawl.retry_delay_ms),
        );
        Self::with_session_state(
            &config.site.base_url,
            &config.site.user_agent,
            Some(credentials),
            retry,
            SessionState::load(&config.storage.session_state_path),
        )
    }

    pub fn session_state(&self) -> &SessionState {
        &self.state
    }

    async fn get_text(&self, url: &str) -> crate::Result<String> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| http_error(url, source))?;
        read_text(url, response).await
    }

    async fn post_form_text(&self, url: &str, form: &[(&str, String)]) -> crate::Result<String> {
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|source| http_error(url, source))?;
        read_text(url, response).await
    }
}

#[async_trait]
impl PageSession for HttpSession {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn ensure_login(&self) -> crate::Result<()> {
        let search_url = self.build_absolute_url(SEARCH_FORM_PATH);
        let html = self.get_text(&search_url).await?;
        if html.contains(AUTH_MARKER) {
            tracing::info!("Existing session is authenticated");
            return Ok(());
        }

        let credentials = self
            .credentials
            .as_ref()
            .ok_or(ConfigError::MissingCredentials)?;

        tracing::info!("Logging in as {}", credentials.username);
        let login_url = self.build_absolute_url(LOGIN_PATH);
        let form = [
            ("username", credentials.username.clone()),
            ("password", credentials.password.clone()),
            ("function", "login".to_string()),
        ];
        let html = self.post_form_text(&login_url, &form).await?;

        if !html.contains(AUTH_MARKER) {
            return Err(IngestError::Auth(
                "RealTrack login failed; check credentials".to_string(),
            ));
        }

        tracing::info!("Login succeeded");
        self.state.save()?;
        Ok(())
    }

    async fn open_search(&self, search: &SearchConfig) -> crate::Result<String> {
        let url = self.build_absolute_url(RESULTS_PATH);
        tracing::info!(
            "Submitting search: {} {}-{}, sorted by {} {}",
            search.property_type,
            search.start_year,
            search.resolved_end_year(),
            search.sort_primary,
            search.sort_primary_order
        );

        let html = self.post_form_text(&url, &search_form(search)).await?;
        if !html.contains(RESULTS_TABLE_MARKER) {
            return Err(ExtractionError::MissingResultsTable.into());
        }
        Ok(html)
    }

    async fn open_results_page(&self, page_index: u32) -> crate::Result<String> {
        let url = self.build_absolute_url(&results_page_path(page_index));
        self.get_text(&url).await
    }

    async fn fetch_detail(&self, url: &str) -> crate::Result<String> {
        self.get_text(url).await
    }

    async fn download_binary(&self, url: &str) -> crate::Result<Vec<u8>> {
        let client = &self.client;
        let referer = self.base_url.as_str();

        self.retry
            .download(url, move || async move {
                let response = match client.get(url).header(REFERER, referer).send().await {
                    Ok(response) => response,
                    Err(e) => return Err(e.to_string()),
                };

                let status = response.status();
                if !status.is_success() {
                    return Err(format!("status {}", status.as_u16()));
                }

                response
                    .bytes()
                    .await
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| e.to_string())
            })
            .await
    }
}

fn http_error(url: &str, source: reqwest::Error) -> IngestError {
    IngestError::Http {
        url: url.to_string(),
        source,
    }
}

async fn read_text(url: &str, response: Response) -> crate::Result<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(IngestError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().await.map_err(|source| http_error(url, source))
}
