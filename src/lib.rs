//! Streaming progress ingestion for remote repository scans.
//!
//! A scan service answers one request with a `text/event-stream` body of
//! `data:` frames. This crate turns that byte stream into an ordered log of
//! typed [`ProgressEvent`]s:
//!
//! - [`FrameDecoder`] splits raw chunks into complete frames, carrying partial
//!   frames and split UTF-8 sequences across chunk boundaries.
//! - [`parse_frame`] validates one frame against the closed event schema.
//! - [`reduce`] folds lifecycle inputs into a [`SessionState`].
//! - [`ScanSession`] drives a [`ScanTransport`] through the pipeline and
//!   supports cooperative cancellation.
//!
//! HTTP specifics live in the `scan_api` crate.

pub mod event;
pub mod frame;
pub mod reducer;
pub mod request;
pub mod session;
pub mod transport;

pub use event::{parse_frame, Finding, ParsedEvent, Payload, ProgressEvent, StatusKind, Unusable};
pub use frame::FrameDecoder;
pub use reducer::{reduce, Phase, SessionInput, SessionState, SessionSummary};
pub use request::{RequestError, ScanRequest};
pub use session::{ScanSession, SessionError, SessionRun, StopHandle};
pub use transport::{ChunkStream, ScanTransport, TransportError};
