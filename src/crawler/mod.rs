//! Crawler module for the incremental ingest
//!
//! This module contains the run logic, including:
//! - Integrity checks before and after the traversal
//! - Results page traversal with the known-record early stop
//! - Raw content and asset persistence per new record
//! - Rollback of uncommitted raw content on failure

mod coordinator;

pub use coordinator::{run_ingest, Coordinator, CrawlOutcome};
