use std::fmt::Display;

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::conflict::Warning;
use crate::snapshot::OutputMode;

/// Environment variable holding the `tracing` filter directives.
pub const LOG_ENV: &str = "HASHCMP_LOG";

/// User-facing messages on stderr, gated by verbosity and quietness.
#[derive(Clone, Copy, Debug)]
pub struct Logger {
    verbose: u8,
    quiet: bool,
}

impl Logger {
    pub fn new(verbose: u8, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// The logger matching an output mode. Quiet-like modes silence it.
    pub fn for_mode(mode: OutputMode) -> Self {
        match mode {
            OutputMode::Bool | OutputMode::Quiet => Self::new(0, true),
            OutputMode::Verbose => Self::new(1, false),
            OutputMode::Json | OutputMode::Normal => Self::new(0, false),
        }
    }

    /// Whether a message at `level` would be printed.
    pub fn enabled(&self, level: u8) -> bool {
        !self.quiet && self.verbose >= level
    }

    pub fn verbose(&self, level: u8, message: impl Display) {
        if self.enabled(level) {
            eprintln!("{message}");
        }
    }

    /// Surface a conflict warning unless its winner asked for silence.
    pub fn warn(&self, warning: &Warning) {
        if !warning.suppressed {
            eprintln!("warning: {warning}");
        }
    }
}

/// Installs the global `tracing` subscriber, writing to stderr.
///
/// Directives come from [`LOG_ENV`]; without it only warnings are shown.
pub fn setup_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::WARN.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
