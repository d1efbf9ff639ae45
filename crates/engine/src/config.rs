//! Debounce run configuration

use crate::error::ConfigError;
use std::time::Duration;

/// Default quiet period before the held line is emitted
pub const DEFAULT_DELAY_MS: u64 = 500;

/// Longest accepted line, excluding its terminator (64 KiB)
pub const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;

/// Settings fixed for the lifetime of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Quiet period after the last line before a flush
    pub delay: Duration,

    /// Lines longer than this are a read failure
    pub max_line_bytes: usize,

    /// Drop a trailing `\r` so CRLF input emits clean lines
    pub strip_carriage_return: bool,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            strip_carriage_return: true,
        }
    }
}

impl DebounceConfig {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    pub fn with_strip_carriage_return(mut self, strip: bool) -> Self {
        self.strip_carriage_return = strip;
        self
    }

    /// Check the settings before the engine starts
    ///
    /// A zero delay is accepted: every line is flushed as soon as the
    /// engine gets around to it, which degenerates to pass-through.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_line_bytes == 0 {
            return Err(ConfigError::ZeroMaxLineBytes);
        }
        Ok(())
    }
}
