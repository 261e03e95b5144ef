//! In-memory site used by unit tests

use crate::config::SearchConfig;
use crate::session::{PageSession, RetryPolicy};
use crate::{IngestError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Serves canned results pages, detail pages and binaries
///
/// Downloads go through the same [`RetryPolicy`] as the HTTP session, with
/// no delay between attempts.
pub(crate) struct FakeSession {
    base_url: String,
    results_pages: Vec<String>,
    details: HashMap<String, String>,
    binaries: HashMap<String, Vec<u8>>,
    remaining_failures: Mutex<HashMap<String, u32>>,
    reject_login: bool,
    retry: RetryPolicy,
    searches: AtomicUsize,
    downloads: AtomicUsize,
    download_attempts: AtomicUsize,
    fetched: Mutex<Vec<String>>,
    pages_opened: Mutex<Vec<u32>>,
}

impl FakeSession {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            results_pages: Vec::new(),
            details: HashMap::new(),
            binaries: HashMap::new(),
            remaining_failures: Mutex::new(HashMap::new()),
            reject_login: false,
            retry: RetryPolicy::new(3, Duration::ZERO),
            searches: AtomicUsize::new(0),
            downloads: AtomicUsize::new(0),
            download_attempts: AtomicUsize::new(0),
            fetched: Mutex::new(Vec::new()),
            pages_opened: Mutex::new(Vec::new()),
        }
    }

    /// Appends a results page; the first one is returned by `open_search`
    pub fn add_results_page(&mut self, html: impl Into<String>) {
        self.results_pages.push(html.into());
    }

    /// Serves `html` for the absolute detail URL `url`
    pub fn add_detail(&mut self, url: &str, html: impl Into<String>) {
        self.details.insert(url.to_string(), html.into());
    }

    pub fn add_binary(&mut self, url: &str, bytes: &[u8]) {
        self.binaries.insert(url.to_string(), bytes.to_vec());
    }

    /// Makes the next `failures` download attempts of `url` fail
    pub fn fail_binary(&mut self, url: &str, failures: u32) {
        self.binaries.entry(url.to_string()).or_default();
        self.remaining_failures
            .lock()
            .unwrap()
            .insert(url.to_string(), failures);
    }

    pub fn reject_login(&mut self) {
        self.reject_login = true;
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    /// Successful downloads
    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    pub fn download_attempts(&self) -> usize {
        self.download_attempts.load(Ordering::SeqCst)
    }

    /// Detail URLs fetched so far, in order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    /// Results page indices served so far, including the one behind the search
    pub fn pages_opened(&self) -> Vec<u32> {
        self.pages_opened.lock().unwrap().clone()
    }

    fn attempt_download(&self, url: &str) -> std::result::Result<Vec<u8>, String> {
        self.download_attempts.fetch_add(1, Ordering::SeqCst);

        let mut failures = self.remaining_failures.lock().unwrap();
        if let Some(remaining) = failures.get_mut(url) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err("status 503".to_string());
            }
        }

        match self.binaries.get(url) {
            Some(bytes) => {
                self.downloads.fetch_add(1, Ordering::SeqCst);
                Ok(bytes.clone())
            }
            None => Err("status 404".to_string()),
        }
    }
}

#[async_trait]
impl PageSession for FakeSession {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn ensure_login(&self) -> Result<()> {
        if self.reject_login {
            return Err(IngestError::Auth("login rejected".to_string()));
        }
        Ok(())
    }

    async fn open_search(&self, _search: &SearchConfig) -> Result<String> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.open_results_page(0).await
    }

    async fn open_results_page(&self, page_index: u32) -> Result<String> {
        self.pages_opened.lock().unwrap().push(page_index);
        self.results_pages
            .get(page_index as usize)
            .cloned()
            .ok_or_else(|| IngestError::HttpStatus {
                url: format!("{}/?page=results&tabID={}", self.base_url, page_index),
                status: 404,
            })
    }

    async fn fetch_detail(&self, url: &str) -> Result<String> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.details
            .get(url)
            .cloned()
            .ok_or_else(|| IngestError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }

    async fn download_binary(&self, url: &str) -> Result<Vec<u8>> {
        self.retry
            .download(url, || {
                let outcome = self.attempt_download(url);
                async move { outcome }
            })
            .await
    }
}
