use repo_scan::TransportError;
use reqwest::StatusCode;

use scan_api::error::parse_error_message;
use scan_api::ScanApiError;

#[test]
fn parse_error_message_uses_detail_string() {
    let message = parse_error_message(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"detail":"repo not found"}"#,
    );
    assert_eq!(message, "repo not found");
}

#[test]
fn parse_error_message_joins_validation_messages() {
    let body = r#"{"detail":[{"loc":["body","repository_url"],"msg":"field required","type":"value_error.missing"},{"loc":["body"],"msg":"bad token"}]}"#;
    let message = parse_error_message(StatusCode::UNPROCESSABLE_ENTITY, body);
    assert_eq!(message, "field required; bad token");
}

#[test]
fn parse_error_message_falls_back_to_status_description() {
    assert_eq!(
        parse_error_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
        "Internal Server Error"
    );
    assert_eq!(
        parse_error_message(StatusCode::BAD_GATEWAY, "<html>upstream down</html>"),
        "Bad Gateway"
    );
    assert_eq!(
        parse_error_message(StatusCode::NOT_FOUND, r#"{"detail":"  "}"#),
        "Not Found"
    );
}

#[test]
fn status_error_maps_to_transport_status() {
    let error = ScanApiError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "repo not found".to_string(),
    };
    let transport = TransportError::from(error);
    assert_eq!(
        transport,
        TransportError::Status {
            status: 500,
            message: "repo not found".to_string(),
        }
    );
    assert_eq!(transport.detail(), "repo not found");
}
