use std::io::{self, Write};

use repo_scan::{Phase, ProgressEvent, SessionState, StatusKind};
use serde_json::json;

use crate::cli::OutputFormat;

/// Writes newly accepted events as session snapshots arrive.
pub struct Renderer<W: Write> {
    format: OutputFormat,
    out: W,
    printed: usize,
    error: Option<io::Error>,
}

impl<W: Write> Renderer<W> {
    pub fn new(format: OutputFormat, out: W) -> Self {
        Self {
            format,
            out,
            printed: 0,
            error: None,
        }
    }

    /// Print events added since the previous snapshot. The first write error
    /// is kept and reported by [`Renderer::finish`].
    pub fn observe(&mut self, state: &SessionState) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.write_new_events(state) {
            self.error = Some(error);
        }
    }

    pub fn finish(mut self, state: &SessionState) -> io::Result<W> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.write_new_events(state)?;

        match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", summary_line(state))?,
            OutputFormat::Json => {
                let report = json!({
                    "summary": state.summary(),
                    "error_message": state.error_message,
                });
                serde_json::to_writer(&mut self.out, &report)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_new_events(&mut self, state: &SessionState) -> io::Result<()> {
        for event in state.events.iter().skip(self.printed) {
            match self.format {
                OutputFormat::Text => write_text_event(&mut self.out, event)?,
                OutputFormat::Json => {
                    serde_json::to_writer(&mut self.out, event)?;
                    writeln!(self.out)?;
                }
            }
        }
        self.printed = state.events.len();
        self.out.flush()
    }
}

fn write_text_event(out: &mut impl Write, event: &ProgressEvent) -> io::Result<()> {
    writeln!(out, "[{}] {}", event.kind, event.payload.headline())?;
    if let Some(finding) = event.payload.as_finding() {
        for line in finding.analysis.lines() {
            writeln!(out, "    {line}")?;
        }
    }
    Ok(())
}

fn summary_line(state: &SessionState) -> String {
    let summary = state.summary();
    match state.phase {
        Phase::Finished => format!(
            "scan finished: {} events, {} vulnerabilities, {} errors",
            summary.total_events,
            summary.count(StatusKind::Vulnerability),
            summary.count(StatusKind::Error),
        ),
        Phase::Failed => format!(
            "scan failed: {}",
            state.error_message.as_deref().unwrap_or("unknown error")
        ),
        Phase::Stopped => format!(
            "scan stopped: {} events received before cancellation",
            summary.total_events
        ),
        Phase::Idle | Phase::Running => format!("scan {}", state.phase.as_str()),
    }
}
