//! One invocation from argv to rendered output.

use std::ffi::OsString;
use std::io::Write;

use crate::classify::Classifier;
use crate::commands::{self, Report};
use crate::engine::{Engine, Resolved};
use crate::error::{HashError, Result};
use crate::logging::Logger;
use crate::snapshot::SettingsSnapshot;
use crate::sources::EnvSource;

/// Process exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success, or every comparison matched (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// A validation or comparison did not match (exit code 1).
    pub const MISMATCH: ExitCode = ExitCode::FAILURE;

    /// Usage, configuration or runtime error (exit code 2).
    ///
    /// Note: This is a function rather than a constant because
    /// `ExitCode::from()` is not `const fn`.
    pub fn error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Everything one successful run produced.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub resolved: Resolved,
    pub report: Report,
}

impl Outcome {
    /// 0 when the run succeeded and everything matched, 1 on a mismatch.
    pub fn status(&self) -> u8 {
        if self.report.matched() { 0 } else { 1 }
    }
}

/// Resolve settings, classify the positionals, run the selected mode and
/// render the report to `out`.
///
/// Surfaced conflict warnings and verbose provenance go to stderr.
///
/// # Errors
///
/// Returns the first error from resolution, mode selection, execution or
/// rendering.
pub fn run<E, I, T>(engine: &Engine<'_, E>, tokens: I, out: &mut impl Write) -> Result<Outcome>
where
    E: EnvSource,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let resolved = engine.resolve(tokens)?;
    let snapshot = &resolved.snapshot;
    let mode = snapshot.output_mode();
    let logger = Logger::for_mode(mode);

    for warning in &resolved.warnings {
        logger.warn(warning);
    }
    if let Some(path) = &resolved.config_path {
        logger.verbose(1, format_args!("config file: {}", path.display()));
    }
    log_provenance(&logger, snapshot);

    let report = with_thread_pool(snapshot.threads(), || {
        let classifications = Classifier::new().classify_all(snapshot.positionals());
        let summary = commands::summarize(&classifications);
        logger.verbose(1, format_args!("inputs: {summary}"));
        let selected = commands::select_mode(&classifications)?;
        tracing::debug!(mode = ?selected, "mode selected");
        commands::execute(&selected, snapshot)
    })??;

    commands::render(&report, mode, out)?;
    Ok(Outcome { resolved, report })
}

fn log_provenance(logger: &Logger, snapshot: &SettingsSnapshot) {
    if !logger.enabled(1) {
        return;
    }
    logger.verbose(1, "settings:");
    for (name, setting) in snapshot.iter() {
        logger.verbose(
            1,
            format_args!("  {name} = {} ({})", setting.value, setting.source),
        );
    }
    for resolution in snapshot.resolutions() {
        logger.verbose(
            1,
            format_args!(
                "  {} decided by {}",
                resolution.concern,
                resolution.winner.unwrap_or("defaults")
            ),
        );
    }
}

/// Runs `work` on a dedicated pool of `threads` workers, or on rayon's
/// global pool when `threads` is 0.
fn with_thread_pool<R, F>(threads: usize, work: F) -> Result<R>
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    if threads == 0 {
        return Ok(work());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|source| HashError::ThreadPool { threads, source })?;
    Ok(pool.install(work))
}
