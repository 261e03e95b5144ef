//! State carried through a single ingest run
//!
//! - `CrawlRunState`: the ledger as it grows during the run, the new IDs in
//!   ingestion order, and the raw content written but not yet committed
//! - `Traversal`: whether the walk over links and pages should go on

mod run_state;

pub use run_state::{CrawlRunState, Traversal};
