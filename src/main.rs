//! # hashcmp CLI
//!
//! Hash files, validate a file against a digest, or compare two inputs.
//!
//! ## Usage
//!
//! ```bash
//! hashcmp release.tar.gz
//! hashcmp release.tar.gz 3a7bd3e2360a3d29eea436fcfb7e44c735d117c42d1c1835420b6b9942dd4f1b
//! hashcmp --json left.bin right.bin
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: success, or the inputs matched
//! - `1`: a validation or comparison did not match
//! - `2`: usage, configuration or runtime error

use std::io::IsTerminal;
use std::process::ExitCode;

use hashcmp::app::{exit_code, run};
use hashcmp::engine::Engine;
use hashcmp::error::HashError;
use hashcmp::logging::setup_tracing;
use hashcmp::registry::Registry;

fn main() -> ExitCode {
    // Install miette's fancy panic and error report handler
    miette::set_panic_hook();
    if let Err(err) = install_report_handler() {
        eprintln!("{err}");
    }
    setup_tracing();

    let result = Registry::global()
        .map_err(HashError::from)
        .and_then(|registry| {
            let engine = Engine::builder(registry).build();
            let stdout = std::io::stdout();
            run(&engine, std::env::args_os(), &mut stdout.lock())
        });

    match result {
        Ok(outcome) if outcome.status() == 0 => exit_code::SUCCESS,
        Ok(_) => exit_code::MISMATCH,
        Err(HashError::InfoRequested(info)) => {
            // --help and --version are rendered by clap itself
            if let Err(err) = info.print() {
                eprintln!("{err}");
                return exit_code::error();
            }
            exit_code::SUCCESS
        }
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            exit_code::error()
        }
    }
}

/// Configure the miette handler based on terminal capabilities.
fn install_report_handler() -> Result<(), miette::InstallError> {
    if std::io::stderr().is_terminal() {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::unicode_nocolor())
                    .with_context_lines(3),
            )
        }))
    } else {
        // Use a simpler handler for non-TTY environments (CI, logs, etc.)
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::none())
                    .with_context_lines(0),
            )
        }))
    }
}
