//! Integration tests for the ingest
//!
//! These tests run the real HTTP session against a wiremock server standing
//! in for the listings site, with all state written to temporary directories.

mod common;
mod session_tests;
