#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use futures_util::stream;

use repo_scan::{ChunkStream, ScanRequest, ScanTransport, TransportError};

/// One scripted action on the response body.
#[derive(Debug, Clone)]
pub enum Step {
    Chunk(Vec<u8>),
    Delay(Duration),
    Error(TransportError),
    /// Never yields again.
    Pending,
}

#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Stream(Vec<Step>),
    Fail(TransportError),
    /// `open` never resolves.
    Hang,
}

/// In-memory transport that replays the same script on every `open`.
#[derive(Debug)]
pub struct ScriptedTransport {
    response: ScriptedResponse,
    opens: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(response: ScriptedResponse) -> Self {
        Self {
            response,
            opens: AtomicUsize::new(0),
        }
    }

    pub fn chunks<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        Self::new(ScriptedResponse::Stream(
            chunks
                .into_iter()
                .map(|chunk| Step::Chunk(chunk.as_ref().to_vec()))
                .collect(),
        ))
    }

    pub fn steps(steps: Vec<Step>) -> Self {
        Self::new(ScriptedResponse::Stream(steps))
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::Acquire)
    }
}

impl ScanTransport for ScriptedTransport {
    fn open<'a>(
        &'a self,
        _request: &'a ScanRequest,
    ) -> BoxFuture<'a, Result<ChunkStream, TransportError>> {
        Box::pin(async move {
            self.opens.fetch_add(1, Ordering::AcqRel);
            match &self.response {
                ScriptedResponse::Stream(steps) => Ok(scripted_body(steps.clone())),
                ScriptedResponse::Fail(error) => Err(error.clone()),
                ScriptedResponse::Hang => std::future::pending().await,
            }
        })
    }
}

fn scripted_body(steps: Vec<Step>) -> ChunkStream {
    Box::pin(stream::unfold(steps.into_iter(), |mut steps| async move {
        loop {
            match steps.next()? {
                Step::Chunk(bytes) => return Some((Ok(Bytes::from(bytes)), steps)),
                Step::Error(error) => return Some((Err(error), steps)),
                Step::Delay(delay) => tokio::time::sleep(delay).await,
                Step::Pending => std::future::pending::<()>().await,
            }
        }
    }))
}

/// Encode one wire frame the way the scan service does.
pub fn frame(kind: &str, payload: serde_json::Value) -> String {
    let body = serde_json::json!({ "type": kind, "payload": payload });
    format!("data: {body}\n\n")
}

pub fn request() -> ScanRequest {
    ScanRequest::new("https://github.com/acme/widgets").expect("valid repository url")
}
