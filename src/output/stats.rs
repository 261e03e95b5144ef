//! Statistics over the persisted ingest state
//!
//! Everything is read from disk; nothing here talks to the site.

use crate::config::StorageConfig;
use crate::storage::{AssetManifestStore, RawContentStore, SeenIdStore};

/// Ledger and storage summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerStatistics {
    /// Number of IDs in the ledger
    pub ledger_size: usize,

    /// Number of raw content artifacts on disk
    pub raw_content_count: usize,

    /// Records with an asset manifest
    pub records_with_assets: usize,

    /// Asset entries across all manifests
    pub asset_entries: usize,

    /// Highest ID in the ledger
    pub newest_id: Option<String>,
}

impl LedgerStatistics {
    /// Whether raw content and ledger are in one-to-one correspondence
    pub fn is_consistent(&self) -> bool {
        self.ledger_size == self.raw_content_count
    }
}

/// Loads statistics from the configured storage locations
pub fn load_statistics(config: &StorageConfig) -> crate::Result<LedgerStatistics> {
    let seen = SeenIdStore::new(&config.ledger_path).load()?;
    let raw_content_count = RawContentStore::new(&config.content_dir).count()?;

    let assets = AssetManifestStore::new(&config.asset_dir);
    let record_ids = assets.list_record_ids()?;
    let mut asset_entries = 0;
    for record_id in &record_ids {
        asset_entries += assets.load(record_id)?.len();
    }

    Ok(LedgerStatistics {
        ledger_size: seen.len(),
        raw_content_count,
        records_with_assets: record_ids.len(),
        asset_entries,
        newest_id: seen.iter().next_back().cloned(),
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &LedgerStatistics) {
    println!("=== Ingest Statistics ===\n");

    println!("Ledger:");
    println!("  Ingested records: {}", stats.ledger_size);
    if let Some(newest) = &stats.newest_id {
        println!("  Highest ID: {}", newest);
    }
    println!();

    println!("Storage:");
    println!("  Raw content files: {}", stats.raw_content_count);
    println!("  Records with assets: {}", stats.records_with_assets);
    println!("  Asset files: {}", stats.asset_entries);
    println!();

    if stats.is_consistent() {
        println!("✓ Raw content matches ledger");
    } else {
        println!(
            "✗ Raw content ({}) does not match ledger ({})",
            stats.raw_content_count, stats.ledger_size
        );
    }
}
