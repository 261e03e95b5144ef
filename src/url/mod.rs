//! URL handling module
//!
//! This module turns the relative links found in RealTrack markup into
//! absolute URLs and derives asset file names from URLs.

mod path;
mod resolve;

// Re-export main functions
pub use path::{file_name_from_url, split_extension};
pub use resolve::{ensure_absolute, resolve_link};
