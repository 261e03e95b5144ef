//! Authenticated access to the listings site
//!
//! [`PageSession`] is everything the crawl needs from the site: a login, the
//! search submission, results paging, detail pages and binary downloads.
//! [`HttpSession`] implements it over `reqwest`, keeping its cookies in a
//! [`SessionState`] that can be saved between runs.

mod cookies;
mod http;
mod retry;
pub mod search;

#[cfg(test)]
mod fake;

pub use cookies::SessionState;
pub use http::{build_http_client, HttpSession};
pub use retry::RetryPolicy;

#[cfg(test)]
pub(crate) use fake::FakeSession;

use crate::config::SearchConfig;
use crate::url::resolve_link;
use async_trait::async_trait;

/// Navigation and retrieval against the listings site
///
/// All calls are made sequentially by the crawl; implementations do not need
/// to support overlapping requests.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Root URL of the site, without a trailing slash
    fn base_url(&self) -> &str;

    /// Turns a path or URL found in site markup into an absolute URL
    fn build_absolute_url(&self, path_or_url: &str) -> String {
        resolve_link(self.base_url(), path_or_url)
    }

    /// Establishes an authenticated session
    ///
    /// Fails if credentials are needed but missing, or if the site rejects them.
    async fn ensure_login(&self) -> crate::Result<()>;

    /// Submits the search form and returns the first results page
    async fn open_search(&self, search: &SearchConfig) -> crate::Result<String>;

    /// Returns the results page with the given zero-based index
    async fn open_results_page(&self, page_index: u32) -> crate::Result<String>;

    /// Retrieves a detail page without disturbing the open search
    async fn fetch_detail(&self, url: &str) -> crate::Result<String>;

    /// Downloads a binary asset, retrying transient failures
    async fn download_binary(&self, url: &str) -> crate::Result<Vec<u8>>;
}
