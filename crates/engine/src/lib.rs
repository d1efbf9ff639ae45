//! Line debouncing for noisy text streams
//!
//! This crate provides:
//! - A line reader that splits an async byte stream into lines
//! - The debounce engine: hold the latest line, emit it once input goes quiet
//! - Typed errors for read and write failures
//! - Run configuration with the defaults of the `debounce` tool

pub mod config;
pub mod debounce;
pub mod error;
pub mod reader;

// Re-exports
pub use config::DebounceConfig;
pub use debounce::{DebounceReport, Debouncer};
pub use error::{ConfigError, DebounceError, ReadError};
pub use reader::{LineReader, ReadCompletion, ReaderHandles};
