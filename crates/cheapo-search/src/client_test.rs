use super::*;

fn test_client(base_url: &str) -> SearchClient {
    SearchClient::new(base_url, 30).expect("client construction should not fail")
}

#[test]
fn search_url_appends_to_base_path() {
    let client = test_client("https://geo.example.com/api");
    assert_eq!(
        client.search_url().unwrap().as_str(),
        "https://geo.example.com/api/search"
    );
}

#[test]
fn search_url_strips_trailing_slashes() {
    let client = test_client("https://geo.example.com//");
    assert_eq!(
        client.search_url().unwrap().as_str(),
        "https://geo.example.com/search"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = SearchClient::new("not a url", 30).unwrap_err();
    assert!(matches!(err, SearchError::InvalidBaseUrl { .. }));
}

#[test]
fn with_retry_overrides_defaults() {
    let client = test_client("https://geo.example.com").with_retry(5, 10);
    assert_eq!(client.max_retries, 5);
    assert_eq!(client.backoff_base_ms, 10);
}
