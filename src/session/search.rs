//! Paths and form fields of the RealTrack search UI

use crate::config::SearchConfig;

pub const SEARCH_FORM_PATH: &str = "/?page=search";
pub const LOGIN_PATH: &str = "/?page=login";
pub const RESULTS_PATH: &str = "/?page=results";

/// Present on every page served to a logged-in user
pub const AUTH_MARKER: &str = "Logout";

/// Present on a results page produced by a successful search
pub const RESULTS_TABLE_MARKER: &str = "resultsTable";

/// Path of the results page with the given zero-based index
pub fn results_page_path(page_index: u32) -> String {
    let delimiter = if RESULTS_PATH.contains('?') { '&' } else { '?' };
    format!("{}{}tabID={}", RESULTS_PATH, delimiter, page_index)
}

/// Builds the search form submission for `config`
///
/// The free-text filters (`sf2`, `sf4`, `sf7`, `sf8`) are always sent empty
/// so nothing sticky from an earlier session narrows the results. The
/// secondary sort is only sent when configured.
pub fn search_form(config: &SearchConfig) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("sf2", String::new()),
        ("sf4", String::new()),
        ("sf7", String::new()),
        ("sf8", String::new()),
        ("sf3", config.property_type.clone()),
        ("sf9", config.per_page.clone()),
        ("sort1", config.sort_primary.clone()),
        ("order1", config.sort_primary_order.clone()),
    ];

    if let Some(secondary) = &config.sort_secondary {
        form.push(("sort2", secondary.clone()));
        form.push(("order2", config.sort_secondary_order.clone()));
    }

    form.extend([
        ("startmo", config.start_month.clone()),
        ("startyr", config.start_year.clone()),
        ("endmo", config.end_month.clone()),
        ("endyr", config.resolved_end_year()),
        ("function", "search".to_string()),
    ]);

    form
}
