//! Crawl coordinator - the ingest run from pre-check to ledger commit
//!
//! A run walks the results pages newest-first and ingests every record it
//! has not seen before, stopping at the first record that is already in the
//! ledger. The ledger is written exactly once, after the traversal; if the
//! run fails before that, the raw content it wrote is removed again so the
//! files on disk keep matching the ledger.

use crate::config::{Config, SearchConfig};
use crate::extract::{detail_links, record_id, total_count};
use crate::integrity::{verify_content_vs_ledger, verify_known_encounter, verify_total_count_bounds};
use crate::session::PageSession;
use crate::state::{CrawlRunState, Traversal};
use crate::storage::{AssetManifestStore, RawContentStore, SeenIdStore};
use crate::url::ensure_absolute;
use std::time::Instant;

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Newly ingested record IDs, in ingestion order
    pub new_ids: Vec<String>,

    /// Whether a record from an earlier run was reached
    pub known_encountered: bool,

    pub pages_visited: u32,

    /// Ledger size before the run
    pub ledger_before: usize,

    /// Ledger size after the run
    pub ledger_after: usize,
}

impl CrawlOutcome {
    pub fn new_count(&self) -> usize {
        self.new_ids.len()
    }
}

/// Main ingest coordinator
///
/// Owns the session and the three stores for the duration of a run.
pub struct Coordinator<S: PageSession> {
    session: S,
    search: SearchConfig,
    max_pages: u32,
    ledger: SeenIdStore,
    content: RawContentStore,
    assets: AssetManifestStore,
}

impl<S: PageSession> Coordinator<S> {
    /// Creates a coordinator
    ///
    /// # Arguments
    ///
    /// * `session` - Access to the listings site
    /// * `search` - Search parameters, submitted once per run
    /// * `max_pages` - Upper bound on results pages visited (at least 1)
    /// * `ledger` - Ledger of already ingested IDs
    /// * `content` - Raw detail page store
    /// * `assets` - Per-record asset store
    pub fn new(
        session: S,
        search: SearchConfig,
        max_pages: u32,
        ledger: SeenIdStore,
        content: RawContentStore,
        assets: AssetManifestStore,
    ) -> Self {
        Self {
            session,
            search,
            max_pages: max_pages.max(1),
            ledger,
            content,
            assets,
        }
    }

    /// Creates a coordinator with the stores and limits from `config`
    pub fn from_config(config: &Config, session: S) -> Self {
        Self::new(
            session,
            config.search.clone(),
            config.crawl.max_pages,
            SeenIdStore::new(&config.storage.ledger_path),
            RawContentStore::new(&config.storage.content_dir),
            AssetManifestStore::new(&config.storage.asset_dir),
        )
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Runs one ingest
    ///
    /// This method:
    /// 1. Checks that raw content and ledger agree
    /// 2. Logs in and submits the search
    /// 3. Walks the results pages until a known record or the page limit
    /// 4. Checks that a known record was reached if the ledger had entries
    /// 5. Writes the ledger and checks content and ledger agree again
    ///
    /// Any failure between the first raw content write and the ledger write
    /// removes the raw content written by this run before returning.
    pub async fn run(&self) -> crate::Result<CrawlOutcome> {
        let start_time = Instant::now();

        let seen = self.ledger.load()?;
        verify_content_vs_ledger(&self.content, &seen)?;
        tracing::info!("Starting ingest with {} known records", seen.len());

        let mut state = CrawlRunState::new(seen);

        if let Err(e) = self.traverse(&mut state).await {
            self.rollback(&state);
            return Err(e);
        }

        if state.has_history() {
            if let Err(e) = verify_known_encounter(state.known_encountered()) {
                self.rollback(&state);
                return Err(e.into());
            }
        }

        if let Err(e) = self.ledger.save(state.seen()) {
            self.rollback(&state);
            return Err(e.into());
        }
        state.commit();

        verify_content_vs_ledger(&self.content, state.seen())?;

        tracing::info!(
            "Ingest completed: {} new records across {} pages in {:?}",
            state.new_ids().len(),
            state.pages_visited(),
            start_time.elapsed()
        );

        Ok(CrawlOutcome {
            new_ids: state.new_ids().to_vec(),
            known_encountered: state.known_encountered(),
            pages_visited: state.pages_visited(),
            ledger_before: state.initial_len(),
            ledger_after: state.seen().len(),
        })
    }

    /// Logs in, opens the search and visits results pages in order
    async fn traverse(&self, state: &mut CrawlRunState) -> crate::Result<()> {
        self.session.ensure_login().await?;
        let mut first_page = Some(self.session.open_search(&self.search).await?);

        for page_index in 0..self.max_pages {
            let html = match first_page.take() {
                Some(html) => html,
                None => self.session.open_results_page(page_index).await?,
            };
            state.visit_page();

            if page_index == 0 {
                let total = total_count(&html)?;
                tracing::info!(
                    "Site reports {} results, ledger holds {}",
                    total,
                    state.seen().len()
                );
                verify_total_count_bounds(total, state.seen())?;
            }

            if let Traversal::StopKnownRecordFound { record_id } =
                self.process_page(state, page_index, &html).await?
            {
                tracing::info!(
                    "Reached known record {} on page {}; stopping",
                    record_id,
                    page_index
                );
                break;
            }
        }

        Ok(())
    }

    /// Processes the detail links of one results page in document order
    async fn process_page(
        &self,
        state: &mut CrawlRunState,
        page_index: u32,
        html: &str,
    ) -> crate::Result<Traversal> {
        let links = ensure_absolute(self.session.base_url(), &detail_links(html));
        tracing::debug!("Page {} lists {} detail links", page_index, links.len());

        if links.is_empty() {
            tracing::warn!("No detail links found on results page {}", page_index);
        }

        for link in &links {
            let traversal = self.process_link(state, link).await?;
            if traversal.should_stop() {
                return Ok(traversal);
            }
        }

        Ok(Traversal::Continue)
    }

    /// Fetches one detail page and ingests it unless its record is known
    async fn process_link(&self, state: &mut CrawlRunState, url: &str) -> crate::Result<Traversal> {
        tracing::debug!("Fetching detail page {}", url);
        let html = self.session.fetch_detail(url).await?;
        let id = record_id(&html)?;

        if state.is_known(&id) {
            return Ok(state.mark_known(&id));
        }

        self.ingest_record(state, &id, &html).await?;
        Ok(Traversal::Continue)
    }

    /// Persists a new record's raw content and assets
    async fn ingest_record(
        &self,
        state: &mut CrawlRunState,
        record_id: &str,
        html: &str,
    ) -> crate::Result<()> {
        self.content.save(record_id, html)?;
        state.track_uncommitted(record_id);

        let manifest = self.assets.reconcile(&self.session, record_id, html).await?;
        state.record_new(record_id);

        tracing::info!("Ingested {} ({} assets)", record_id, manifest.len());
        Ok(())
    }

    /// Removes the raw content written by a run that will not commit
    ///
    /// Assets and manifests stay; the next run reuses them.
    fn rollback(&self, state: &CrawlRunState) {
        let uncommitted = state.uncommitted();
        if uncommitted.is_empty() {
            return;
        }

        tracing::warn!(
            "Run failed; removing raw content for {} uncommitted records",
            uncommitted.len()
        );
        for record_id in uncommitted {
            if let Err(e) = self.content.remove(record_id) {
                tracing::error!("Failed to remove raw content for {}: {}", record_id, e);
            }
        }
    }
}

/// Runs a complete ingest for `config` over `session`
///
/// # Example
///
/// ```no_run
/// use realtrack_ingest::config::load_config;
/// use realtrack_ingest::crawler::run_ingest;
/// use realtrack_ingest::session::HttpSession;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("realtrack.toml"))?;
/// let session = HttpSession::from_config(&config, config.credentials()?)?;
/// let outcome = run_ingest(&config, session).await?;
/// println!("{} new records", outcome.new_count());
/// # Ok(())
/// # }
/// ```
pub async fn run_ingest<S: PageSession>(config: &Config, session: S) -> crate::Result<CrawlOutcome> {
    Coordinator::from_config(config, session).run().await
}
