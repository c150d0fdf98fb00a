use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::event::parse_frame;
use crate::frame::FrameDecoder;
use crate::reducer::{reduce, SessionInput, SessionState};
use crate::request::ScanRequest;
use crate::transport::ScanTransport;

/// Cancellation flag shared between a session and its stop handles.
pub type CancelSignal = Arc<AtomicBool>;

/// Detail reported when the body ends while the session is still running.
pub const STREAM_ENDED_EARLY: &str = "Scan stream ended before completion.";

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a scan session is already running on this controller")]
    AlreadyActive,
}

/// Cloneable handle that requests cooperative cancellation of a session.
#[derive(Debug, Clone)]
pub struct StopHandle {
    cancel: CancelSignal,
}

impl StopHandle {
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::Release);
    }
}

/// Every snapshot emitted during a run plus the sealed final state.
#[derive(Debug, Clone)]
pub struct SessionRun {
    pub snapshots: Vec<SessionState>,
    pub state: SessionState,
}

/// Owns at most one running scan session over a transport.
#[derive(Debug)]
pub struct ScanSession<T> {
    transport: T,
    cancel: CancelSignal,
    active: AtomicBool,
}

impl<T: ScanTransport> ScanSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            cancel: Arc::new(AtomicBool::new(false)),
            active: AtomicBool::new(false),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            cancel: Arc::clone(&self.cancel),
        }
    }

    /// Request cancellation. A stop issued while no session is running is kept
    /// and ends the next session; the flag is cleared when a session ends.
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Run one session to a terminal phase, calling `on_snapshot` after every
    /// observable state change.
    pub async fn start_with_handler<F>(
        &self,
        request: &ScanRequest,
        mut on_snapshot: F,
    ) -> Result<SessionState, SessionError>
    where
        F: FnMut(&SessionState),
    {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionError::AlreadyActive);
        }
        let _active = ActiveGuard {
            active: &self.active,
            cancel: &self.cancel,
        };

        info!(target_repo = request.display_target(), "starting scan session");
        let mut run = Run::new(&mut on_snapshot);
        run.apply(SessionInput::Start);

        let mut stream = match await_or_cancel(self.transport.open(request), &self.cancel).await {
            Err(Cancelled) => return Ok(run.finish(SessionInput::Stop)),
            Ok(Err(error)) => {
                warn!(%error, "scan request failed");
                return Ok(run.finish(SessionInput::TransportError(Some(
                    error.detail().to_owned(),
                ))));
            }
            Ok(Ok(stream)) => stream,
        };

        let mut decoder = FrameDecoder::default();
        let closing = loop {
            let next = match await_or_cancel(stream.next(), &self.cancel).await {
                Ok(next) => next,
                Err(Cancelled) => break Some(SessionInput::Stop),
            };

            match next {
                None => {
                    break Some(SessionInput::TransportError(Some(
                        STREAM_ENDED_EARLY.to_owned(),
                    )))
                }
                Some(Err(error)) if is_cancelled(&self.cancel) => {
                    debug!(%error, "transport aborted after stop request");
                    break Some(SessionInput::Stop);
                }
                Some(Err(error)) => {
                    warn!(%error, "scan stream failed");
                    break Some(SessionInput::TransportError(Some(error.detail().to_owned())));
                }
                Some(Ok(chunk)) => {
                    for frame in decoder.push(&chunk) {
                        match parse_frame(&frame) {
                            Ok(event) => run.apply(SessionInput::Event(event)),
                            Err(reason) => debug!(%reason, "skipping unusable frame"),
                        }
                        if run.state.is_terminal() {
                            break;
                        }
                    }
                    if run.state.is_terminal() {
                        break None;
                    }
                }
            }
        };
        decoder.finish();

        Ok(match closing {
            Some(input) => run.finish(input),
            None => run.finish_sealed(),
        })
    }

    /// Run one session and collect every snapshot it produced.
    pub async fn start(&self, request: &ScanRequest) -> Result<SessionRun, SessionError> {
        let mut snapshots = Vec::new();
        let state = self
            .start_with_handler(request, |state| snapshots.push(state.clone()))
            .await?;
        Ok(SessionRun { snapshots, state })
    }
}

struct ActiveGuard<'a> {
    active: &'a AtomicBool,
    cancel: &'a CancelSignal,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.cancel.store(false, Ordering::Release);
        self.active.store(false, Ordering::Release);
    }
}

/// State owned by one in-flight session.
struct Run<'a, F> {
    state: SessionState,
    on_snapshot: &'a mut F,
}

impl<'a, F> Run<'a, F>
where
    F: FnMut(&SessionState),
{
    fn new(on_snapshot: &'a mut F) -> Self {
        Self {
            state: SessionState::default(),
            on_snapshot,
        }
    }

    fn apply(&mut self, input: SessionInput) {
        let (phase, accepted) = (self.state.phase, self.state.events.len());
        self.state = reduce(std::mem::take(&mut self.state), input);

        if self.state.events.len() != accepted {
            if let Some(event) = self.state.events.last() {
                debug!(
                    event_id = event.id,
                    kind = %event.kind,
                    headline = event.payload.headline(),
                    "accepted event"
                );
            }
        } else if self.state.phase == phase {
            return;
        }
        (self.on_snapshot)(&self.state);
    }

    fn finish(mut self, input: SessionInput) -> SessionState {
        self.apply(input);
        self.finish_sealed()
    }

    fn finish_sealed(self) -> SessionState {
        info!(
            phase = self.state.phase.as_str(),
            events = self.state.events.len(),
            "scan session ended"
        );
        self.state
    }
}

#[derive(Debug)]
struct Cancelled;

fn is_cancelled(cancel: &CancelSignal) -> bool {
    cancel.load(Ordering::Acquire)
}

/// Await `future` while polling the stop flag. The flag is checked before
/// every poll slice, so a stop requested up front never polls `future`.
async fn await_or_cancel<F>(future: F, cancel: &CancelSignal) -> Result<F::Output, Cancelled>
where
    F: Future,
{
    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancel) {
            return Err(Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            return Ok(output);
        }
    }
}
