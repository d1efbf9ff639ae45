//! Line reader
//!
//! Splits an async byte stream into lines and hands each one to the
//! debounce engine over a capacity-1 channel, so a slow engine throttles
//! reading instead of lines piling up. Completion is signalled exactly
//! once, after the last line has been handed off.

use crate::config::DebounceConfig;
use crate::error::ReadError;
use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, trace};

/// Completion signal sent once the input is exhausted or failed
#[derive(Debug)]
pub struct ReadCompletion {
    /// Lines handed to the engine
    pub lines_read: u64,

    /// Set when reading stopped on an error rather than end of stream
    pub error: Option<ReadError>,
}

/// Receiving ends of a spawned reader
pub struct ReaderHandles {
    /// Lines in arrival order, terminators removed
    pub lines: mpsc::Receiver<Bytes>,

    /// Fires once after the final line
    pub completion: oneshot::Receiver<ReadCompletion>,

    /// The read loop task
    pub task: JoinHandle<()>,
}

/// Line-oriented reader over any async byte stream
pub struct LineReader<R> {
    input: BufReader<R>,
    max_line_bytes: usize,
    strip_carriage_return: bool,
    buf: Vec<u8>,
}

impl<R> LineReader<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    pub fn new(input: R, config: &DebounceConfig) -> Self {
        Self {
            input: BufReader::new(input),
            max_line_bytes: config.max_line_bytes,
            strip_carriage_return: config.strip_carriage_return,
            buf: Vec::new(),
        }
    }

    /// Start the read loop on a tokio task
    pub fn spawn(self) -> ReaderHandles {
        let (line_tx, lines) = mpsc::channel(1);
        let (done_tx, completion) = oneshot::channel();
        let task = tokio::spawn(self.run(line_tx, done_tx));

        ReaderHandles {
            lines,
            completion,
            task,
        }
    }

    async fn run(mut self, line_tx: mpsc::Sender<Bytes>, done_tx: oneshot::Sender<ReadCompletion>) {
        let mut lines_read = 0u64;

        let error = loop {
            match self.next_line().await {
                Ok(Some(line)) => {
                    trace!(bytes = line.len(), "read line");
                    if line_tx.send(line).await.is_err() {
                        debug!("engine stopped receiving, line reader exiting");
                        break None;
                    }
                    lines_read += 1;
                }
                Ok(None) => break None,
                Err(e) => {
                    error!("error reading from input: {}", e);
                    break Some(e);
                }
            }
        };

        debug!(lines_read, "line reader finished");

        // The engine may already be gone after a fatal write failure
        let _ = done_tx.send(ReadCompletion { lines_read, error });
    }

    /// Read the next line without its terminator
    ///
    /// Returns `Ok(None)` at end of stream. A final line with no trailing
    /// `\n` is still returned. Bytes of a line interrupted by an error are
    /// discarded.
    pub async fn next_line(&mut self) -> Result<Option<Bytes>, ReadError> {
        self.buf.clear();

        // One extra byte leaves room for the `\n` of a line at the limit
        let limit = self.max_line_bytes as u64 + 1;
        let n = (&mut self.input)
            .take(limit)
            .read_until(b'\n', &mut self.buf)
            .await?;

        if n == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        } else if self.buf.len() > self.max_line_bytes {
            return Err(ReadError::LineTooLong {
                limit: self.max_line_bytes,
            });
        }

        if self.strip_carriage_return && self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }

        Ok(Some(Bytes::copy_from_slice(&self.buf)))
    }
}
