use repo_scan::TransportError;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanApiError {
    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: &'static str },
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status} {message}")]
    Status { status: StatusCode, message: String },
}

impl From<ScanApiError> for TransportError {
    fn from(error: ScanApiError) -> Self {
        match error {
            ScanApiError::Status { status, message } => Self::Status {
                status: status.as_u16(),
                message,
            },
            ScanApiError::Request(error) if error.is_connect() || error.is_timeout() => {
                Self::Connect(format!("could not reach the scan service: {error}"))
            }
            other => Self::Connect(other.to_string()),
        }
    }
}

/// Failure body shape returned by the scan service.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    pub detail: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorDetail {
    Message(String),
    Validation(Vec<ValidationIssue>),
    Other(Value),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValidationIssue {
    pub msg: Option<String>,
}

impl ErrorDetail {
    fn into_message(self) -> Option<String> {
        match self {
            Self::Message(message) => non_empty(message),
            Self::Validation(issues) => {
                let messages: Vec<String> = issues
                    .into_iter()
                    .filter_map(|issue| issue.msg.and_then(non_empty))
                    .collect();
                non_empty(messages.join("; "))
            }
            Self::Other(_) => None,
        }
    }
}

/// Turn a non-success response into a user-facing message.
///
/// Uses the body's `detail` when present, otherwise the status description.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(|payload| payload.detail)
        .and_then(ErrorDetail::into_message)
        .unwrap_or_else(|| status_message(status))
}

fn status_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(ToString::to_string)
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()))
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
