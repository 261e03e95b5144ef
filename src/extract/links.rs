use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static DETAIL_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href="([^"]*?page=details[^"]*)""#).expect("detail link pattern is valid")
});

/// Returns the detail-page links of a results page, in document order
///
/// `&amp;` in the captured `href` is decoded to `&` before deduplication, so
/// the encoded and plain spellings of the same link collapse into the first
/// one seen.
///
/// # Example
///
/// ```
/// use realtrack_ingest::extract::detail_links;
///
/// let html = r#"<a href="?page=details&amp;id=1">A</a><a href="?page=details&id=1">A</a>"#;
/// assert_eq!(detail_links(html), vec!["?page=details&id=1".to_string()]);
/// ```
pub fn detail_links(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    DETAIL_LINK_RE
        .captures_iter(html)
        .map(|caps| caps[1].replace("&amp;", "&"))
        .filter(|link| seen.insert(link.clone()))
        .collect()
}
