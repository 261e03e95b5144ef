use crate::storage::SeenIdSet;
use std::fmt;

/// Outcome of processing one link or one results page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Traversal {
    /// Keep walking
    Continue,

    /// A record from an earlier run was reached; everything behind it is
    /// already ingested
    StopKnownRecordFound { record_id: String },
}

impl Traversal {
    pub fn should_stop(&self) -> bool {
        matches!(self, Self::StopKnownRecordFound { .. })
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => write!(f, "continue"),
            Self::StopKnownRecordFound { record_id } => {
                write!(f, "stop at known record {}", record_id)
            }
        }
    }
}

/// Mutable bookkeeping for one run
///
/// `seen` starts as the loaded ledger and gains every record ingested during
/// the run, so a record listed twice is only ingested once.
#[derive(Debug, Clone)]
pub struct CrawlRunState {
    seen: SeenIdSet,
    initial_len: usize,
    new_ids: Vec<String>,
    known_encountered: bool,
    uncommitted: Vec<String>,
    pages_visited: u32,
}

impl CrawlRunState {
    pub fn new(seen: SeenIdSet) -> Self {
        let initial_len = seen.len();
        Self {
            seen,
            initial_len,
            new_ids: Vec::new(),
            known_encountered: false,
            uncommitted: Vec::new(),
            pages_visited: 0,
        }
    }

    pub fn seen(&self) -> &SeenIdSet {
        &self.seen
    }

    /// Ledger size when the run started
    pub fn initial_len(&self) -> usize {
        self.initial_len
    }

    /// Whether the run started from a non-empty ledger
    pub fn has_history(&self) -> bool {
        self.initial_len > 0
    }

    pub fn is_known(&self, record_id: &str) -> bool {
        self.seen.contains(record_id)
    }

    /// Notes that a known record was reached and returns the stop signal
    pub fn mark_known(&mut self, record_id: &str) -> Traversal {
        self.known_encountered = true;
        Traversal::StopKnownRecordFound {
            record_id: record_id.to_string(),
        }
    }

    pub fn known_encountered(&self) -> bool {
        self.known_encountered
    }

    /// Remembers raw content written for `record_id` before the ledger commit
    pub fn track_uncommitted(&mut self, record_id: &str) {
        self.uncommitted.push(record_id.to_string());
    }

    /// Raw content written during this run, in write order
    pub fn uncommitted(&self) -> &[String] {
        &self.uncommitted
    }

    /// Clears the uncommitted list once the ledger has been written
    pub fn commit(&mut self) {
        self.uncommitted.clear();
    }

    /// Adds a fully ingested record to the run's results and to `seen`
    pub fn record_new(&mut self, record_id: &str) {
        self.seen.insert(record_id.to_string());
        self.new_ids.push(record_id.to_string());
    }

    pub fn new_ids(&self) -> &[String] {
        &self.new_ids
    }

    pub fn visit_page(&mut self) {
        self.pages_visited += 1;
    }

    pub fn pages_visited(&self) -> u32 {
        self.pages_visited
    }
}
