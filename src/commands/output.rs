//! Rendering of reports on stdout, one format per output mode.

use std::io::Write;
use std::path::PathBuf;

use super::Report;
use crate::error::{HashError, Result};
use crate::snapshot::OutputMode;

/// Write `report` to `out` in the format `mode` calls for.
///
/// `Normal` and `Verbose` print the same lines; verbose detail goes to
/// stderr separately. `Quiet` writes nothing.
///
/// # Errors
///
/// Returns [`HashError::Io`] if `out` cannot be written and
/// [`HashError::Serialization`] if JSON rendering fails.
pub fn render(report: &Report, mode: OutputMode, out: &mut impl Write) -> Result<()> {
    match mode {
        OutputMode::Quiet => Ok(()),
        OutputMode::Bool => write_line(out, report.matched()),
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            write_line(out, "")
        }
        OutputMode::Normal | OutputMode::Verbose => render_text(report, out),
    }
}

fn render_text(report: &Report, out: &mut impl Write) -> Result<()> {
    match report {
        Report::Hash { files } => {
            for file in files {
                write_line(
                    out,
                    format_args!("{}  {}", file.digest, file.path.display()),
                )?;
            }
            Ok(())
        }
        Report::Validate(validation) => {
            let verdict = verdict(validation.matched);
            write_line(
                out,
                format_args!(
                    "{verdict} {} ({})",
                    validation.path.display(),
                    validation.algorithm
                ),
            )?;
            if !validation.matched {
                write_line(out, format_args!("  expected: {}", validation.expected))?;
                write_line(out, format_args!("  actual:   {}", validation.actual))?;
            }
            Ok(())
        }
        Report::Compare(comparison) => {
            let verdict = verdict(comparison.matched);
            write_line(
                out,
                format_args!("{verdict} {} {}", comparison.left, comparison.right),
            )?;
            if !comparison.matched && comparison.algorithm.is_some() {
                write_line(out, format_args!("  {}", comparison.left_digest))?;
                write_line(out, format_args!("  {}", comparison.right_digest))?;
            }
            Ok(())
        }
    }
}

fn verdict(matched: bool) -> &'static str {
    if matched { "MATCH" } else { "MISMATCH" }
}

fn write_line(out: &mut impl Write, line: impl std::fmt::Display) -> Result<()> {
    writeln!(out, "{line}").map_err(|source| HashError::Io {
        path: PathBuf::from("<stdout>"),
        source,
    })
}
