/// Resolves a link found in site markup against the site's base URL
///
/// # Resolution Rules
///
/// | Link | Result |
/// |------|--------|
/// | `http://…` / `https://…` | unchanged |
/// | `?page=details&id=1` | `base/?page=details&id=1` |
/// | `/files/a.pdf` | `base/files/a.pdf` |
/// | `files/a.pdf` | `base/files/a.pdf` |
///
/// Trailing slashes on the base are trimmed first, so exactly one `/`
/// separates base and link.
///
/// # Examples
///
/// ```
/// use realtrack_ingest::url::resolve_link;
///
/// assert_eq!(
///     resolve_link("https://www.realtrack.com/", "?page=details&id=7"),
///     "https://www.realtrack.com/?page=details&id=7"
/// );
/// ```
pub fn resolve_link(base_url: &str, link: &str) -> String {
    if is_absolute(link) {
        return link.to_string();
    }

    let base = base_url.trim_end_matches('/');
    if link.starts_with('/') {
        format!("{}{}", base, link)
    } else {
        format!("{}/{}", base, link)
    }
}

/// Resolves every link, preserving order
pub fn ensure_absolute<S: AsRef<str>>(base_url: &str, links: &[S]) -> Vec<String> {
    links
        .iter()
        .map(|link| resolve_link(base_url, link.as_ref()))
        .collect()
}

fn is_absolute(link: &str) -> bool {
    let lower = link.get(..8).unwrap_or(link).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
