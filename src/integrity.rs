//! Consistency checks between the ledger, the files on disk and the site
//!
//! Every check either passes silently or fails with its own
//! [`IntegrityError`] variant. None of them repair anything.

use crate::storage::{RawContentStore, SeenIdSet};
use crate::IntegrityError;

/// Ledger size from which the site's total count is compared against it
pub const TOTAL_COUNT_CHECK_THRESHOLD: usize = 200;

/// Largest number of unseen records tolerated behind the ledger
pub const MAX_BACKLOG: u64 = 100;

/// Every ledger entry has exactly one raw-content artifact and vice versa
pub fn verify_content_vs_ledger(content: &RawContentStore, seen: &SeenIdSet) -> crate::Result<()> {
    let persisted = content.count()?;
    if persisted != seen.len() {
        return Err(IntegrityError::ContentLedgerMismatch {
            content: persisted,
            ledger: seen.len(),
        }
        .into());
    }
    Ok(())
}

/// Compares the site's reported result count with the ledger size
///
/// Small ledgers are not checked. Once the ledger holds
/// [`TOTAL_COUNT_CHECK_THRESHOLD`] IDs it may neither exceed the total nor
/// trail it by more than [`MAX_BACKLOG`].
pub fn verify_total_count_bounds(total: u64, seen: &SeenIdSet) -> Result<(), IntegrityError> {
    let seen_count = seen.len();
    if seen_count < TOTAL_COUNT_CHECK_THRESHOLD {
        tracing::debug!(
            "Skipping total count check ({} seen, threshold {})",
            seen_count,
            TOTAL_COUNT_CHECK_THRESHOLD
        );
        return Ok(());
    }

    let seen_total = seen_count as u64;
    if seen_total > total {
        return Err(IntegrityError::SeenExceedsTotal {
            seen: seen_count,
            total,
        });
    }

    let backlog = total - seen_total;
    if backlog > MAX_BACKLOG {
        return Err(IntegrityError::BacklogTooLarge {
            seen: seen_count,
            total,
            backlog,
        });
    }

    Ok(())
}

/// A run that started from a non-empty ledger must have met a known record
pub fn verify_known_encounter(found: bool) -> Result<(), IntegrityError> {
    if found {
        Ok(())
    } else {
        Err(IntegrityError::OrderingBroken)
    }
}
