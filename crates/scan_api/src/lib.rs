//! HTTP transport for the repository scan service.
//!
//! This crate owns request building, failure-body parsing and exposing the
//! streamed response body as raw chunks. Framing, parsing and session state
//! live in `repo_scan`; [`ScanApiClient`] plugs into it through
//! [`repo_scan::ScanTransport`].

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod url;

pub use client::ScanApiClient;
pub use config::ScanApiConfig;
pub use error::ScanApiError;
pub use payload::ScanRequestBody;
pub use url::normalize_scan_url;
