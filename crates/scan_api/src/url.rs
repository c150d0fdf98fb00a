/// Default base URL of a locally running scan service.
pub const DEFAULT_SCAN_BASE_URL: &str = "http://localhost:8000";

/// Path of the streaming scan endpoint.
pub const SCAN_ENDPOINT_PATH: &str = "/scan_repository";

/// Normalize a base URL to the scan endpoint.
///
/// Normalization rules:
/// 1) blank input falls back to [`DEFAULT_SCAN_BASE_URL`]
/// 2) keep a URL already ending in `/scan_repository`
/// 3) append `/scan_repository` otherwise
pub fn normalize_scan_url(input: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_SCAN_BASE_URL
    } else {
        input.trim()
    };

    let trimmed = base.trim_end_matches('/');
    if trimmed.ends_with(SCAN_ENDPOINT_PATH) {
        return trimmed.to_string();
    }
    format!("{trimmed}{SCAN_ENDPOINT_PATH}")
}
