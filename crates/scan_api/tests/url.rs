use scan_api::normalize_scan_url;

#[test]
fn url_normalization_keeps_existing_scan_endpoint() {
    assert_eq!(
        normalize_scan_url("https://scanner.example.com/scan_repository/"),
        "https://scanner.example.com/scan_repository"
    );
}

#[test]
fn url_normalization_appends_endpoint_to_generic_base() {
    assert_eq!(
        normalize_scan_url("https://scanner.example.com/api/"),
        "https://scanner.example.com/api/scan_repository"
    );
}

#[test]
fn url_normalization_defaults_blank_input() {
    assert_eq!(
        normalize_scan_url("   "),
        "http://localhost:8000/scan_repository"
    );
}
