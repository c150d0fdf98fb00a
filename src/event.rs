//! Typed progress events and the frame parser that produces them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Field prefix that marks an SSE data line.
pub const DATA_PREFIX: &str = "data:";

/// Closed set of event kinds the scan service emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Status,
    Info,
    Error,
    CriticalError,
    Vulnerability,
    Done,
}

impl StatusKind {
    pub const ALL: [StatusKind; 6] = [
        Self::Status,
        Self::Info,
        Self::Error,
        Self::CriticalError,
        Self::Vulnerability,
        Self::Done,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "status" => Self::Status,
            "info" => Self::Info,
            "error" => Self::Error,
            "critical_error" => Self::CriticalError,
            "vulnerability" => Self::Vulnerability,
            "done" => Self::Done,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Info => "info",
            Self::Error => "error",
            Self::CriticalError => "critical_error",
            Self::Vulnerability => "vulnerability",
            Self::Done => "done",
        }
    }

    /// `true` for kinds that seal the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::CriticalError)
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub file: String,
    pub analysis: String,
}

/// Event payload. The shape is fixed by the event kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    Finding(Finding),
}

impl Payload {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Finding(_) => None,
        }
    }

    pub fn as_finding(&self) -> Option<&Finding> {
        match self {
            Self::Finding(finding) => Some(finding),
            Self::Text(_) => None,
        }
    }

    /// Message text, or the file path of a finding.
    pub fn headline(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Finding(finding) => &finding.file,
        }
    }
}

/// Event decoded from a frame, before the session assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEvent {
    pub kind: StatusKind,
    pub payload: Payload,
}

impl ParsedEvent {
    pub fn text(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            payload: Payload::Text(text.into()),
        }
    }

    pub fn finding(file: impl Into<String>, analysis: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Vulnerability,
            payload: Payload::Finding(Finding {
                file: file.into(),
                analysis: analysis.into(),
            }),
        }
    }
}

/// Event accepted into a session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub id: u64,
    pub kind: StatusKind,
    pub payload: Payload,
}

/// Reason a frame was skipped.
#[derive(Debug, Error)]
pub enum Unusable {
    #[error("frame carries no data field")]
    MissingData,
    #[error("frame data is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("frame has no string `type` field")]
    MissingType,
    #[error("unknown event type `{0}`")]
    UnknownKind(String),
    #[error("payload shape does not match event type `{0}`")]
    PayloadMismatch(StatusKind),
}

/// Parse one complete frame into an event.
///
/// Frames that cannot be understood are reported as [`Unusable`] and are
/// expected to be skipped by the caller.
pub fn parse_frame(frame: &str) -> Result<ParsedEvent, Unusable> {
    let data = extract_data_payload(frame).ok_or(Unusable::MissingData)?;
    let value = serde_json::from_str::<Value>(&data).map_err(Unusable::Malformed)?;

    let kind_name = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(Unusable::MissingType)?;
    let kind =
        StatusKind::parse(kind_name).ok_or_else(|| Unusable::UnknownKind(kind_name.to_owned()))?;

    let payload = value
        .get("payload")
        .and_then(|payload| payload_for_kind(kind, payload))
        .ok_or(Unusable::PayloadMismatch(kind))?;

    Ok(ParsedEvent { kind, payload })
}

fn extract_data_payload(frame: &str) -> Option<String> {
    let data_lines: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix(DATA_PREFIX))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect();

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

fn payload_for_kind(kind: StatusKind, payload: &Value) -> Option<Payload> {
    match kind {
        StatusKind::Vulnerability => {
            let file = payload.get("file")?.as_str()?;
            let analysis = payload.get("analysis")?.as_str()?;
            Some(Payload::Finding(Finding {
                file: file.to_owned(),
                analysis: analysis.to_owned(),
            }))
        }
        _ => payload.as_str().map(|text| Payload::Text(text.to_owned())),
    }
}
