//! Session state machine.
//!
//! [`reduce`] is a pure fold: every change to a [`SessionState`] goes through
//! one of the discrete [`SessionInput`]s, so the lifecycle can be exercised
//! without any transport.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::event::{Finding, ParsedEvent, ProgressEvent, StatusKind};

/// Message used when a transport failure carries no usable detail.
pub const GENERIC_TRANSPORT_ERROR: &str =
    "An unexpected error occurred while streaming scan results.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Finished,
    Failed,
    Stopped,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Stopped)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
        }
    }
}

/// Observable state of one scan session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: Phase,
    pub events: Vec<ProgressEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// One step of the session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Start,
    Event(ParsedEvent),
    Stop,
    /// Transport failure with an optional human-readable detail.
    TransportError(Option<String>),
}

pub fn reduce(mut state: SessionState, input: SessionInput) -> SessionState {
    match input {
        SessionInput::Start => SessionState {
            phase: Phase::Running,
            events: Vec::new(),
            error_message: None,
        },
        SessionInput::Event(event) => {
            if state.phase != Phase::Running {
                return state;
            }
            let id = state.events.len() as u64;
            match (event.kind, &event.payload) {
                (StatusKind::Done, _) => state.phase = Phase::Finished,
                (StatusKind::CriticalError, payload) => {
                    state.phase = Phase::Failed;
                    state.error_message = payload.as_text().map(ToOwned::to_owned);
                }
                _ => {}
            }
            state.events.push(ProgressEvent {
                id,
                kind: event.kind,
                payload: event.payload,
            });
            state
        }
        SessionInput::Stop => {
            if state.phase == Phase::Running {
                state.phase = Phase::Stopped;
            }
            state
        }
        SessionInput::TransportError(detail) => {
            if matches!(state.phase, Phase::Idle | Phase::Running) {
                state.phase = Phase::Failed;
                state.error_message = Some(
                    detail
                        .map(|detail| detail.trim().to_owned())
                        .filter(|detail| !detail.is_empty())
                        .unwrap_or_else(|| GENERIC_TRANSPORT_ERROR.to_owned()),
                );
            }
            state
        }
    }
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.events
            .iter()
            .filter_map(|event| event.payload.as_finding())
    }

    /// Text of the most recent `status` event.
    pub fn latest_status(&self) -> Option<&str> {
        self.events
            .iter()
            .rev()
            .find(|event| event.kind == StatusKind::Status)
            .and_then(|event| event.payload.as_text())
    }

    pub fn summary(&self) -> SessionSummary {
        let mut counts = BTreeMap::new();
        for event in &self.events {
            *counts.entry(event.kind.as_str()).or_insert(0usize) += 1;
        }
        SessionSummary {
            phase: self.phase,
            total_events: self.events.len(),
            counts,
        }
    }
}

/// Per-kind event counts for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub phase: Phase,
    pub total_events: usize,
    pub counts: BTreeMap<&'static str, usize>,
}

impl SessionSummary {
    pub fn count(&self, kind: StatusKind) -> usize {
        self.counts.get(kind.as_str()).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{reduce, Phase, SessionInput, SessionState, GENERIC_TRANSPORT_ERROR};
    use crate::event::{ParsedEvent, StatusKind};

    fn running() -> SessionState {
        reduce(SessionState::default(), SessionInput::Start)
    }

    #[test]
    fn start_resets_previous_session() {
        let mut state = running();
        state = reduce(state, SessionInput::Event(ParsedEvent::text(StatusKind::Info, "a")));
        state = reduce(state, SessionInput::TransportError(Some("gone".into())));
        assert_eq!(state.phase, Phase::Failed);

        let state = reduce(state, SessionInput::Start);
        assert_eq!(state, SessionState {
            phase: Phase::Running,
            events: Vec::new(),
            error_message: None,
        });
    }

    #[test]
    fn events_before_start_are_ignored() {
        let state = reduce(
            SessionState::default(),
            SessionInput::Event(ParsedEvent::text(StatusKind::Info, "early")),
        );
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.events.is_empty());
    }

    #[test]
    fn critical_error_fails_with_payload_message() {
        let state = reduce(
            running(),
            SessionInput::Event(ParsedEvent::text(StatusKind::CriticalError, "clone failed")),
        );
        assert_eq!(state.phase, Phase::Failed);
        assert_eq!(state.error_message.as_deref(), Some("clone failed"));
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn stop_is_ignored_once_terminal() {
        let state = reduce(
            running(),
            SessionInput::Event(ParsedEvent::text(StatusKind::Done, "ok")),
        );
        let state = reduce(state, SessionInput::Stop);
        assert_eq!(state.phase, Phase::Finished);
    }

    #[test]
    fn late_transport_error_is_ignored_once_terminal() {
        let finished = reduce(
            running(),
            SessionInput::Event(ParsedEvent::text(StatusKind::Done, "ok")),
        );
        let after = reduce(
            finished.clone(),
            SessionInput::TransportError(Some("connection reset".into())),
        );
        assert_eq!(after, finished);

        let stopped = reduce(running(), SessionInput::Stop);
        let after = reduce(stopped.clone(), SessionInput::TransportError(None));
        assert_eq!(after.phase, Phase::Stopped);
        assert_eq!(after.error_message, None);
        assert_eq!(after, stopped);
    }

    #[test]
    fn transport_error_without_detail_uses_generic_message() {
        let state = reduce(running(), SessionInput::TransportError(Some("   ".into())));
        assert_eq!(state.error_message.as_deref(), Some(GENERIC_TRANSPORT_ERROR));

        let state = reduce(SessionState::default(), SessionInput::TransportError(None));
        assert_eq!(state.phase, Phase::Failed);
        assert_eq!(state.error_message.as_deref(), Some(GENERIC_TRANSPORT_ERROR));
    }

    #[test]
    fn summary_counts_kinds() {
        let mut state = running();
        for event in [
            ParsedEvent::text(StatusKind::Status, "cloning"),
            ParsedEvent::finding("a.py", "xss"),
            ParsedEvent::finding("b.py", "sqli"),
            ParsedEvent::text(StatusKind::Status, "complete"),
        ] {
            state = reduce(state, SessionInput::Event(event));
        }

        let summary = state.summary();
        assert_eq!(summary.total_events, 4);
        assert_eq!(summary.count(StatusKind::Vulnerability), 2);
        assert_eq!(summary.count(StatusKind::Error), 0);
        assert_eq!(state.latest_status(), Some("complete"));
        assert_eq!(
            state.findings().map(|finding| finding.file.as_str()).collect::<Vec<_>>(),
            vec!["a.py", "b.py"]
        );
    }
}
