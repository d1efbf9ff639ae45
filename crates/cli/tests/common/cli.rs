//! CLI command execution helpers with automatic timing
//!
//! Wraps the `debounce` binary: feeds stdin in scripted steps (writes and
//! pauses), records when stdout first produced data, and enforces a
//! timeout so a hung process fails the test instead of blocking it.

use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// One scripted stdin action
#[derive(Debug, Clone)]
enum Step {
    Write(Vec<u8>),
    Pause(Duration),
}

/// CLI command builder with timing
pub struct DebounceCommand {
    binary_path: PathBuf,
    args: Vec<String>,
    steps: Vec<Step>,
    close_stdout: bool,
    timeout: Duration,
}

impl Default for DebounceCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl DebounceCommand {
    pub fn new() -> Self {
        Self {
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_debounce")),
            args: Vec::new(),
            steps: Vec::new(),
            close_stdout: false,
            timeout: Duration::from_secs(30),
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Queue bytes to write to stdin
    pub fn stdin(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        self.steps.push(Step::Write(data.as_ref().to_vec()));
        self
    }

    /// Queue a pause between stdin writes
    pub fn pause(&mut self, ms: u64) -> &mut Self {
        self.steps.push(Step::Pause(Duration::from_millis(ms)));
        self
    }

    /// Close the read end of stdout before writing anything
    pub fn close_stdout(&mut self) -> &mut Self {
        self.close_stdout = true;
        self
    }

    /// Execute command and return result with timing
    pub fn execute(&self) -> Result<CommandResult> {
        let start = Instant::now();

        let mut child = Command::new(&self.binary_path)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn debounce")?;

        let stdout = child.stdout.take().context("stdout not captured")?;
        let stdout_reader = if self.close_stdout {
            drop(stdout);
            None
        } else {
            Some(thread::spawn(move || read_timed(stdout, start)))
        };

        let mut stderr = child.stderr.take().context("stderr not captured")?;
        let stderr_reader = thread::spawn(move || {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf);
            buf
        });

        let mut stdin = child.stdin.take().context("stdin not captured")?;
        for step in &self.steps {
            match step {
                // The process may already have exited on a fatal error
                Step::Write(bytes) => {
                    if stdin.write_all(bytes).and_then(|_| stdin.flush()).is_err() {
                        break;
                    }
                }
                Step::Pause(duration) => thread::sleep(*duration),
            }
        }
        drop(stdin);
        let stdin_closed_at = start.elapsed();

        let status = loop {
            if let Some(status) = child.try_wait().context("Failed to wait for debounce")? {
                break status;
            }
            if start.elapsed() > self.timeout {
                let _ = child.kill();
                anyhow::bail!("debounce did not exit within {:?}", self.timeout);
            }
            thread::sleep(Duration::from_millis(5));
        };

        let (stdout, stdout_first_at) = match stdout_reader {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow::anyhow!("stdout reader panicked"))?,
            None => (Vec::new(), None),
        };
        let stderr = stderr_reader
            .join()
            .map_err(|_| anyhow::anyhow!("stderr reader panicked"))?;

        Ok(CommandResult {
            stdout,
            stderr,
            exit_code: status.code().unwrap_or(-1),
            duration: start.elapsed(),
            stdout_first_at,
            stdin_closed_at,
        })
    }

    /// Execute and assert success
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stderr
            );
        }

        Ok(result)
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout_str()
            );
        }

        Ok(result)
    }
}

/// Read a stream to the end, noting when the first byte arrived
fn read_timed(mut stream: impl Read, start: Instant) -> (Vec<u8>, Option<Duration>) {
    let mut out = Vec::new();
    let mut first_at = None;
    let mut chunk = [0u8; 8192];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if first_at.is_none() {
                    first_at = Some(start.elapsed());
                }
                out.extend_from_slice(&chunk[..n]);
            }
        }
    }

    (out, first_at)
}

/// Command execution result with timing
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: Vec<u8>,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
    /// When stdout first produced data, relative to spawn
    pub stdout_first_at: Option<Duration>,
    /// When the last stdin step finished and stdin was closed
    pub stdin_closed_at: Duration,
}

impl CommandResult {
    /// Check if command succeeded
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Check if stderr contains text
    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }
}

/// Macro for convenient command construction
///
/// Usage:
/// ```ignore
/// debounce!("-d", "100").stdin("a\nb\n").assert_success()?;
/// ```
#[macro_export]
macro_rules! debounce {
    ($($arg:expr),*) => {{
        let mut cmd = $crate::common::cli::DebounceCommand::new();
        cmd.args(&[$($arg),*]);
        cmd
    }};
}
