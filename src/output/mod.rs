//! Output module for run summaries and ledger statistics
//!
//! This module handles:
//! - The one-line summary printed after every run
//! - Statistics over the persisted ledger, raw content and assets

pub mod stats;

pub use stats::{load_statistics, print_statistics, LedgerStatistics};

use crate::crawler::CrawlOutcome;

/// Formats the line printed at the end of a successful run
pub fn run_summary(outcome: &CrawlOutcome) -> String {
    match outcome.new_count() {
        0 => "No new RealTrack transactions detected".to_string(),
        n => format!("Saved {} new RealTrack transactions", n),
    }
}

/// Prints the run summary to stdout, followed by the new IDs when verbose
pub fn print_run_summary(outcome: &CrawlOutcome, list_ids: bool) {
    println!("{}", run_summary(outcome));

    if list_ids {
        for id in &outcome.new_ids {
            println!("  + {}", id);
        }
    }
}
