use crate::ExtractionError;
use regex::Regex;
use std::sync::LazyLock;

static RECORD_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"RT(\d{5,})").expect("record id pattern is valid"));

static TOTAL_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.pagination\((\d+),").expect("total count pattern is valid"));

/// Extracts the first RT identifier from a detail page
pub fn record_id(html: &str) -> Result<String, ExtractionError> {
    try_record_id(html).ok_or(ExtractionError::MissingRecordId)
}

/// Like [`record_id`], but returns `None` when the page carries no identifier
pub fn try_record_id(html: &str) -> Option<String> {
    RECORD_ID_RE
        .captures(html)
        .map(|caps| format!("RT{}", &caps[1]))
}

/// Returns the total result count embedded in the results page's pagination script
pub fn total_count(html: &str) -> Result<u64, ExtractionError> {
    let caps = TOTAL_COUNT_RE
        .captures(html)
        .ok_or(ExtractionError::MissingTotalCount)?;
    caps[1]
        .parse()
        .map_err(|_| ExtractionError::InvalidTotalCount(caps[1].to_string()))
}
