//! Debounce engine
//!
//! Holds the most recent line and emits it once the input has been quiet
//! for the configured delay, or when the input ends. Every new line
//! replaces the held one and restarts the countdown from zero, so a
//! steady stream faster than the delay produces no output until it stops.

use crate::config::DebounceConfig;
use crate::error::{DebounceError, ReadError};
use crate::reader::{LineReader, ReadCompletion};
use bytes::Bytes;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, Instant};
use tracing::{debug, trace, warn};

/// Held line state
#[derive(Debug, Default)]
enum State {
    /// Nothing to emit, waiting for a line or completion
    #[default]
    Idle,
    /// A line is held and the countdown is running
    Pending { line: Bytes },
}

impl State {
    fn hold(&mut self, line: Bytes) {
        *self = State::Pending { line };
    }

    fn take(&mut self) -> Option<Bytes> {
        match std::mem::take(self) {
            State::Idle => None,
            State::Pending { line } => Some(line),
        }
    }

    fn is_pending(&self) -> bool {
        matches!(self, State::Pending { .. })
    }
}

/// Outcome of a run that ended on input completion
#[derive(Debug, Default)]
pub struct DebounceReport {
    /// Lines delivered by the reader
    pub lines_received: u64,
    /// Flushes that actually wrote a line
    pub lines_emitted: u64,
    /// Set when the input stopped on a read failure instead of a clean close
    pub read_error: Option<ReadError>,
}

/// Debounce engine
pub struct Debouncer {
    config: DebounceConfig,
}

impl Debouncer {
    pub fn new(config: DebounceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DebounceConfig {
        &self.config
    }

    /// Debounce `input` into `output` until the input is exhausted
    ///
    /// Returns once the final flush is done. A write failure aborts the
    /// reader and is returned immediately without further output.
    pub async fn run<R, W>(&self, input: R, output: W) -> Result<DebounceReport, DebounceError>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin,
    {
        let handles = LineReader::new(input, &self.config).spawn();
        let result = self.drive(handles.lines, handles.completion, output).await;

        if result.is_err() {
            handles.task.abort();
        }

        result
    }

    /// Wait loop over already connected reader channels
    ///
    /// Lines are polled before completion, so a completion never
    /// overtakes a line that was handed off ahead of it.
    pub async fn drive<W>(
        &self,
        mut lines: mpsc::Receiver<Bytes>,
        mut completion: oneshot::Receiver<ReadCompletion>,
        mut output: W,
    ) -> Result<DebounceReport, DebounceError>
    where
        W: AsyncWrite + Unpin,
    {
        let delay = self.config.delay;
        let mut state = State::Idle;
        let mut report = DebounceReport::default();
        let mut lines_open = true;

        let countdown = sleep(delay);
        tokio::pin!(countdown);

        loop {
            tokio::select! {
                biased;

                received = lines.recv(), if lines_open => match received {
                    Some(line) => {
                        trace!(bytes = line.len(), "holding line");
                        report.lines_received += 1;
                        state.hold(line);
                        countdown.as_mut().reset(Instant::now() + delay);
                    }
                    // Completion carries the read outcome, keep waiting for it
                    None => lines_open = false,
                },

                done = &mut completion => {
                    match done {
                        Ok(done) => {
                            debug!(lines_read = done.lines_read, "input complete");
                            report.read_error = done.error;
                        }
                        Err(_) => warn!("line reader exited without signalling completion"),
                    }

                    if flush(&mut state, &mut output).await? {
                        report.lines_emitted += 1;
                    }
                    return Ok(report);
                }

                () = &mut countdown, if state.is_pending() => {
                    if flush(&mut state, &mut output).await? {
                        report.lines_emitted += 1;
                    }
                }
            }
        }
    }
}

/// Write the held line, if any, and return to idle
async fn flush<W>(state: &mut State, output: &mut W) -> Result<bool, DebounceError>
where
    W: AsyncWrite + Unpin,
{
    let Some(line) = state.take() else {
        return Ok(false);
    };

    write_line(&line, output)
        .await
        .map_err(DebounceError::Write)?;

    debug!(bytes = line.len(), "flushed held line");
    Ok(true)
}

async fn write_line<W>(line: &[u8], output: &mut W) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    output.write_all(line).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}
