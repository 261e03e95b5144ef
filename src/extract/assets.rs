//! Asset link extraction for detail pages
//!
//! Detail pages reference photos and documents in three ways: shadowbox
//! gallery anchors, plain anchors to files, and anchors whose `onclick`
//! opens the file in a popup. Inline images are collected last.

use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

/// File extensions treated as downloadable assets
pub const ASSET_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".pdf"];

/// Images whose source mentions the site are assets even without a known extension
const SITE_HOST_MARKER: &str = "realtrack";

static WINDOW_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"window\.open\(\s*['"]([^'"]+)['"]"#).expect("window.open pattern is valid")
});

/// Returns the asset URLs referenced by a detail page, ordered and deduplicated
///
/// # Capture Rules
///
/// An `<a>` is captured when any of these hold:
/// - a `rel` token starts with `shadowbox`
/// - its `href` (other than `#`) ends in an asset extension
/// - its `onclick` calls `window.open('…')` on a URL ending in an asset extension
///
/// The `href` wins over the `onclick` target when both exist. Afterwards every
/// `<img src>` ending in an asset extension, or pointing at the site itself, is
/// appended unless already present.
pub fn asset_urls(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    if let Ok(anchor_selector) = Selector::parse("a") {
        for element in document.select(&anchor_selector) {
            let attrs = element.value();
            let href = attrs.attr("href").map(str::trim).unwrap_or_default();
            let onclick = attrs.attr("onclick").map(str::trim).unwrap_or_default();
            let rel = attrs.attr("rel").unwrap_or_default();

            let js_url = WINDOW_OPEN_RE
                .captures(onclick)
                .map(|caps| caps[1].to_string());
            let candidate = (!href.is_empty() && href != "#").then(|| href.to_string());

            let is_shadowbox = rel
                .split_whitespace()
                .any(|token| token.to_lowercase().starts_with("shadowbox"));

            let should_capture = is_shadowbox
                || candidate.as_deref().is_some_and(has_asset_extension)
                || js_url.as_deref().is_some_and(has_asset_extension);

            if !should_capture {
                continue;
            }

            if let Some(url) = candidate.or(js_url) {
                if seen.insert(url.clone()) {
                    urls.push(url);
                }
            }
        }
    }

    if let Ok(img_selector) = Selector::parse("img[src]") {
        for element in document.select(&img_selector) {
            let src = element.value().attr("src").map(str::trim).unwrap_or_default();
            if src.is_empty() {
                continue;
            }
            if !has_asset_extension(src) && !src.to_lowercase().contains(SITE_HOST_MARKER) {
                continue;
            }
            if seen.insert(src.to_string()) {
                urls.push(src.to_string());
            }
        }
    }

    urls
}

fn has_asset_extension(url: &str) -> bool {
    let lower = url.to_lowercase();
    ASSET_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
