//! Pattern extraction from RealTrack HTML
//!
//! This module reads the few facts the ingest needs out of raw pages:
//! - detail links on a results page
//! - the total result count reported by the results page
//! - the RT identifier of a detail page
//! - the asset URLs a detail page references
//!
//! Failure to find the identifier or the total count means the site's markup
//! changed, and is reported as an [`ExtractionError`](crate::ExtractionError).

mod assets;
mod links;
mod record;

pub use assets::{asset_urls, ASSET_EXTENSIONS};
pub use links::detail_links;
pub use record::{record_id, total_count, try_record_id};
