//! HTTP session tests: login, search, paging and downloads

use crate::common::{self, mount_authenticated, results_page, saved_session, session};
use realtrack_ingest::session::{HttpSession, PageSession, RetryPolicy};
use realtrack_ingest::{ConfigError, ExtractionError, IngestError, SearchConfig};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use tempfile::TempDir;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_login_when_not_authenticated() {
    let mock_server = MockServer::start().await;

    // Anonymous search form
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("page", "search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form>Sign in</form>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Login accepts the configured credentials
    Mock::given(method("POST"))
        .and(path("/"))
        .and(query_param("page", "login"))
        .and(body_string_contains(format!("username={}", common::USERNAME)))
        .and(body_string_contains(format!("password={}", common::PASSWORD)))
        .and(body_string_contains("function=login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<a>Logout</a>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    session(&mock_server)
        .ensure_login()
        .await
        .expect("Login failed");
}

#[tokio::test]
async fn test_existing_session_skips_login() {
    let mock_server = MockServer::start().await;
    mount_authenticated(&mock_server).await;

    Mock::given(method("POST"))
        .and(query_param("page", "login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    session(&mock_server)
        .ensure_login()
        .await
        .expect("Login check failed");
}

#[tokio::test]
async fn test_saved_session_is_reused_by_next_run() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("state/session.json");

    // The search form is authenticated only for the login cookie
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("page", "search"))
        .and(header("cookie", "sid=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<a>Logout</a>"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("page", "search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form>Sign in</form>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Only the first run may log in
    Mock::given(method("POST"))
        .and(path("/"))
        .and(query_param("page", "login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sid=abc123; Path=/")
                .set_body_string("<a>Logout</a>"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let first = saved_session(&mock_server, &state_path);
    first.ensure_login().await.expect("Login failed");
    assert!(state_path.exists());
    assert_eq!(first.session_state().cookie_count(), 1);

    let second = saved_session(&mock_server, &state_path);
    assert_eq!(second.session_state().cookie_count(), 1);
    second
        .ensure_login()
        .await
        .expect("Saved session was not reused");
}

#[tokio::test]
async fn test_rejected_login_saves_nothing() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("session.json");

    Mock::given(method("GET"))
        .and(query_param("page", "search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form>Sign in</form>"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(query_param("page", "login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Invalid username or password"))
        .mount(&mock_server)
        .await;

    let err = saved_session(&mock_server, &state_path)
        .ensure_login()
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::Auth(_)), "got {:?}", err);
    assert!(!state_path.exists());
}

#[tokio::test]
async fn test_rejected_login() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form>Sign in</form>"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(query_param("page", "login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Invalid username or password"))
        .mount(&mock_server)
        .await;

    let err = session(&mock_server).ensure_login().await.unwrap_err();
    assert!(matches!(err, IngestError::Auth(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_login_without_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form>Sign in</form>"))
        .mount(&mock_server)
        .await;

    let session = HttpSession::new(
        &mock_server.uri(),
        "realtrack-ingest/test",
        None,
        RetryPolicy::default(),
    )
    .expect("Failed to build session");

    let err = session.ensure_login().await.unwrap_err();
    assert!(matches!(
        err,
        IngestError::Config(ConfigError::MissingCredentials)
    ));
}

#[tokio::test]
async fn test_search_submission_and_paging() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(query_param("page", "results"))
        .and(body_string_contains("sf3=retailBldg"))
        .and(body_string_contains("sf9=50"))
        .and(body_string_contains("sort1=regDate"))
        .and(body_string_contains("order1=descending"))
        .and(body_string_contains("endyr=2024"))
        .and(body_string_contains("function=search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(120, &[7, 6])))
        .expect(1)
        .mount(&mock_server)
        .await;

    common::mount_results_page(&mock_server, 1, results_page(120, &[5])).await;

    let session = session(&mock_server);
    let search = SearchConfig {
        end_year: Some("2024".to_string()),
        ..SearchConfig::default()
    };

    let first = session.open_search(&search).await.expect("Search failed");
    assert!(first.contains("rtID=7"));

    let second = session
        .open_results_page(1)
        .await
        .expect("Paging failed");
    assert!(second.contains("rtID=5"));
}

#[tokio::test]
async fn test_search_without_results_table() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(query_param("page", "results"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Session expired</p>"))
        .mount(&mock_server)
        .await;

    let err = session(&mock_server)
        .open_search(&SearchConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IngestError::Extraction(ExtractionError::MissingResultsTable)
    ));
}

#[tokio::test]
async fn test_detail_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "details"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = session(&mock_server);
    let url = session.build_absolute_url("?page=details&rtID=9");
    let err = session.fetch_detail(&url).await.unwrap_err();

    assert!(matches!(err, IngestError::HttpStatus { status: 503, .. }));
}

#[tokio::test]
async fn test_download_retries_then_succeeds() {
    let mock_server = MockServer::start().await;

    // Two failures, mounted first so they match first
    Mock::given(method("GET"))
        .and(path("/photos/1.jpg"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/photos/1.jpg"))
        .and(header("referer", mock_server.uri().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg bytes".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = session(&mock_server);
    let url = session.build_absolute_url("/photos/1.jpg");
    let bytes = session.download_binary(&url).await.expect("Download failed");

    assert_eq!(bytes, b"jpeg bytes");
}

#[tokio::test]
async fn test_download_gives_up_after_three_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/photos/1.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&mock_server)
        .await;

    let session = session(&mock_server);
    let url = session.build_absolute_url("/photos/1.jpg");
    let err = session.download_binary(&url).await.unwrap_err();

    match err {
        IngestError::Download {
            url: failed_url,
            attempts,
            reason,
        } => {
            assert_eq!(failed_url, url);
            assert_eq!(attempts, 3);
            assert_eq!(reason, "status 404");
        }
        other => panic!("Expected download error, got {:?}", other),
    }
}
