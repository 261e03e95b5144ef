use url::Url;

/// Returns the last path component of a URL, if it has a usable one
///
/// The query string and fragment are ignored. A trailing slash is skipped
/// over, so `/docs/plans/` yields `plans`. Dot segments are never returned.
pub fn file_name_from_url(url_str: &str) -> Option<String> {
    let path = match Url::parse(url_str) {
        Ok(url) => url.path().to_string(),
        Err(_) => url_str
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let name = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    match name {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

/// Splits a file name into stem and extension (the extension keeps its dot)
///
/// A leading dot does not start an extension: `.hidden` has no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}
