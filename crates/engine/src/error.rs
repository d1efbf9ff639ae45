//! Error types for the debounce engine

use std::io;

/// Input stream failure
///
/// Not fatal: the reader reports it, then signals completion as if the
/// stream had ended, and the held line is still flushed.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("read failure: {0}")]
    Io(#[from] io::Error),

    #[error("line exceeds {limit} bytes")]
    LineTooLong { limit: usize },
}

/// Fatal engine failure, returned from [`crate::Debouncer::run`]
#[derive(Debug, thiserror::Error)]
pub enum DebounceError {
    #[error("write failure: {0}")]
    Write(#[source] io::Error),
}

/// Invalid run configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("max line length must be at least 1 byte")]
    ZeroMaxLineBytes,
}
