//! Process wiring for the `debounce` binary
//!
//! Parses arguments into a [`DebounceConfig`], installs logging on stderr,
//! and runs the engine over stdin and stdout. Exit codes are decided here
//! so that `main` stays the only place the process terminates.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use engine::config::{DEFAULT_DELAY_MS, DEFAULT_MAX_LINE_BYTES};
use engine::{ConfigError, DebounceConfig, DebounceError, DebounceReport, Debouncer};
use std::time::Duration;
use tracing::Level;

/// Invalid arguments or configuration
pub const EXIT_CONFIG: u8 = 1;

/// Output stream rejected a write
pub const EXIT_WRITE: u8 = 2;

const EXAMPLES: &str = "\
Examples:
  tail -F * | debounce -d 100
  yes | head -50000 | debounce";

/// Tail lines from STDIN and output the last line to STDOUT, after receiving nothing for a while
#[derive(Parser, Debug)]
#[command(name = "debounce")]
#[command(author, version, about, long_about = None, after_help = EXAMPLES)]
pub struct Cli {
    /// Delay in milliseconds
    #[arg(short = 'd', long = "delay", value_name = "MS", default_value_t = DEFAULT_DELAY_MS)]
    pub delay_ms: u64,

    /// Longest accepted line in bytes; a longer line ends reading
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_LINE_BYTES)]
    pub max_line_bytes: usize,

    /// Keep a trailing carriage return on each line
    #[arg(long)]
    pub keep_cr: bool,

    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Build and validate the engine configuration
    pub fn config(&self) -> Result<DebounceConfig, ConfigError> {
        let config = DebounceConfig::default()
            .with_delay(Duration::from_millis(self.delay_ms))
            .with_max_line_bytes(self.max_line_bytes)
            .with_strip_carriage_return(!self.keep_cr);

        config.validate()?;
        Ok(config)
    }

    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

/// Install the tracing subscriber
///
/// Logs go to stderr; stdout carries only emitted lines.
pub fn init_tracing(level: Level) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

/// Runtime for the reader task and the engine loop
pub fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to build async runtime")
}

/// Debounce stdin into stdout
pub async fn run(config: DebounceConfig) -> Result<DebounceReport, DebounceError> {
    Debouncer::new(config)
        .run(tokio::io::stdin(), tokio::io::stdout())
        .await
}

/// Exit status for a finished run
///
/// A read failure still counts as a clean finish; it has already been
/// reported on stderr by the reader.
pub fn exit_status(outcome: &Result<DebounceReport, DebounceError>) -> u8 {
    match outcome {
        Ok(_) => 0,
        Err(DebounceError::Write(_)) => EXIT_WRITE,
    }
}
