use scan_api::headers::{build_headers, HEADER_ACCEPT, HEADER_CONTENT_TYPE, HEADER_USER_AGENT};
use scan_api::ScanApiConfig;

#[test]
fn header_map_contains_stream_headers() {
    let config = ScanApiConfig::default().insert_header(" X-Request-Source ", " cli ");

    let headers = build_headers(&config);
    assert_eq!(
        headers.get(HEADER_ACCEPT).expect("accept"),
        &"text/event-stream".to_owned()
    );
    assert_eq!(
        headers.get(HEADER_CONTENT_TYPE).expect("content-type"),
        &"application/json".to_owned()
    );
    assert!(headers
        .get(HEADER_USER_AGENT)
        .expect("user-agent")
        .starts_with("repo-scan/"));
    assert_eq!(
        headers.get("x-request-source").expect("custom"),
        &"cli".to_owned()
    );
}

#[test]
fn header_map_prefers_explicit_user_agent() {
    let config = ScanApiConfig::default().with_user_agent("test-agent");
    let headers = build_headers(&config);
    assert_eq!(
        headers.get(HEADER_USER_AGENT).expect("user-agent"),
        &"test-agent".to_string()
    );
}
