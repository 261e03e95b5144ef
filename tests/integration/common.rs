//! Canned site markup and mock helpers shared by the integration tests

use realtrack_ingest::config::{Config, Credentials};
use realtrack_ingest::session::{HttpSession, RetryPolicy, SessionState};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "analyst";
pub const PASSWORD: &str = "hunter2";

pub fn credentials() -> Credentials {
    Credentials {
        username: USERNAME.to_string(),
        password: PASSWORD.to_string(),
    }
}

/// An HTTP session with a short retry delay
pub fn session(server: &MockServer) -> HttpSession {
    HttpSession::new(
        &server.uri(),
        "realtrack-ingest/test",
        Some(credentials()),
        RetryPolicy::new(3, Duration::from_millis(10)),
    )
    .expect("Failed to build session")
}

/// An HTTP session whose cookies are loaded from and saved to `state_path`
pub fn saved_session(server: &MockServer, state_path: &Path) -> HttpSession {
    HttpSession::with_session_state(
        &server.uri(),
        "realtrack-ingest/test",
        Some(credentials()),
        RetryPolicy::new(3, Duration::from_millis(10)),
        SessionState::load(state_path),
    )
    .expect("Failed to build session")
}

/// A config pointing at the mock server and storing everything under `root`
pub fn config(server: &MockServer, root: &Path) -> Config {
    let mut config = Config::default();
    config.site.base_url = server.uri();
    config.site.username = Some(USERNAME.to_string());
    config.site.password = Some(PASSWORD.to_string());
    config.crawl.retry_delay_ms = 10;
    config.search.end_year = Some("2024".to_string());
    config.storage.content_dir = root.join("html").to_string_lossy().into_owned();
    config.storage.asset_dir = root.join("assets").to_string_lossy().into_owned();
    config.storage.ledger_path = root.join("state/seen.json").to_string_lossy().into_owned();
    config.storage.session_state_path = root
        .join("state/session.json")
        .to_string_lossy()
        .into_owned();
    config
}

/// Every file under `root` with its contents, keyed by relative path
pub fn file_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in fs::read_dir(dir).expect("Unreadable directory") {
            let path = entry.expect("Unreadable entry").path();
            if path.is_dir() {
                walk(root, &path, files);
            } else {
                let relative = path.strip_prefix(root).expect("Outside root").to_path_buf();
                files.insert(relative, fs::read(&path).expect("Unreadable file"));
            }
        }
    }

    let mut files = BTreeMap::new();
    walk(root, root, &mut files);
    files
}

pub fn results_page(total: u64, numbers: &[u32]) -> String {
    let rows: String = numbers
        .iter()
        .map(|n| {
            format!(r#"<tr><td><a href="?page=details&amp;rtID={n}">RT{n:05}</a></td></tr>"#)
        })
        .collect();
    format!(
        r#"<html><body><a href="?page=logout">Logout</a>
        <table id="resultsTable">{rows}</table>
        <script>$('#pager').pagination({total}, {{ items_per_page: 50 }});</script>
        </body></html>"#
    )
}

/// A detail page for record `n` linking one photo at `/photos/<n>.jpg`
pub fn detail_page(n: u32) -> String {
    format!(
        r##"<html><body><h1>Transaction RT{n:05}</h1>
        <a href="/photos/{n}.jpg" rel="shadowbox[gallery]">Photo</a>
        <a href="#">Top</a>
        </body></html>"##
    )
}

/// Serves an already authenticated search form
pub async fn mount_authenticated(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("page", "search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><a href="?page=logout">Logout</a><form id="search"></form></body></html>"#,
        ))
        .mount(server)
        .await;
}

/// Answers the search submission with `html`
pub async fn mount_search(server: &MockServer, html: String) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(query_param("page", "results"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

/// Serves results page `index` when requested by tab
pub async fn mount_results_page(server: &MockServer, index: u32, html: String) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("page", "results"))
        .and(query_param("tabID", index.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

/// Serves the detail page of record `n`, expecting `calls` requests in total
pub async fn mount_detail(server: &MockServer, n: u32, calls: u64) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("page", "details"))
        .and(query_param("rtID", n.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(n)))
        .expect(calls)
        .mount(server)
        .await;
}

/// Serves the photo of record `n`, expecting `calls` downloads in total
pub async fn mount_photo(server: &MockServer, n: u32, calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/photos/{n}.jpg")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(format!("jpeg {n}").into_bytes()))
        .expect(calls)
        .mount(server)
        .await;
}
