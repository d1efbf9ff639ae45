//! debounce - emit the last line of a noisy stream once it goes quiet

use clap::Parser;
use cli_lib::{Cli, EXIT_CONFIG};
use engine::DebounceError;
use std::process::ExitCode;
use tracing::{debug, info};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also land here, on stdout
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_CONFIG)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    cli_lib::init_tracing(cli.log_level());

    let config = match cli.config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error parsing command line args: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    debug!(?config, "starting");

    let runtime = match cli_lib::build_runtime() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = runtime.block_on(cli_lib::run(config));

    // A stdin read can still be blocked after a write failure
    runtime.shutdown_background();

    match &outcome {
        Ok(report) => info!(
            received = report.lines_received,
            emitted = report.lines_emitted,
            "input exhausted"
        ),
        Err(DebounceError::Write(e)) => eprintln!("error writing to stdout: {}", e),
    }

    ExitCode::from(cli_lib::exit_status(&outcome))
}
