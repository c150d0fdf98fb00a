//! Contract between the session controller and whatever delivers the body.

use std::pin::Pin;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use futures_util::Stream;
use thiserror::Error;

use crate::request::ScanRequest;

/// Response body as a sequence of raw chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request never produced a response.
    #[error("connection failed: {0}")]
    Connect(String),
    /// The service answered with a non-success status before streaming.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    /// The body failed while it was being read.
    #[error("stream read failed: {0}")]
    Read(String),
}

impl TransportError {
    /// Text suitable for showing to the user.
    pub fn detail(&self) -> &str {
        match self {
            Self::Connect(message) | Self::Read(message) => message,
            Self::Status { message, .. } => message,
        }
    }
}

/// Opens the streamed response for a scan request.
pub trait ScanTransport: Send + Sync {
    fn open<'a>(
        &'a self,
        request: &'a ScanRequest,
    ) -> BoxFuture<'a, Result<ChunkStream, TransportError>>;
}

impl<T: ScanTransport + ?Sized> ScanTransport for std::sync::Arc<T> {
    fn open<'a>(
        &'a self,
        request: &'a ScanRequest,
    ) -> BoxFuture<'a, Result<ChunkStream, TransportError>> {
        (**self).open(request)
    }
}
