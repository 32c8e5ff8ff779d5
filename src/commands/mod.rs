//! Execution paths chosen from the classified positional arguments.
//!
//! `mod.rs` selects the [`Mode`] and dispatches; the work lives in
//! dedicated modules (`hash`, `validate`, `compare`) and rendering in
//! `output`.

use std::path::PathBuf;

use serde::Serialize;

use crate::classify::{ArgumentClassification, ArgumentKind, HashArgument, describe_invalid};
use crate::error::{HashError, Result};
use crate::snapshot::SettingsSnapshot;

pub(crate) mod compare;
pub(crate) mod hash;
pub(crate) mod output;
pub(crate) mod validate;

pub use compare::{Comparison, compare_files, compare_hashes};
pub use hash::{FileDigest, hash_files};
pub use output::render;
pub use validate::{Validation, select_algorithm, validate};


const USAGE_HINT: &str =
    "pass files to hash, a file and a hash to validate, or two inputs to compare";

/// What the invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Print the digest of each file (directories expanded with
    /// `--recursive`).
    Hash(Vec<PathBuf>),
    /// Check one file against an expected digest.
    Validate { file: PathBuf, hash: HashArgument },
    /// Check whether two files have the same digest.
    CompareFiles(PathBuf, PathBuf),
    /// Check whether two digests are the same.
    CompareHashes(HashArgument, HashArgument),
}

/// The outcome of a mode, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Report {
    Hash { files: Vec<FileDigest> },
    Validate(Validation),
    Compare(Comparison),
}

impl Report {
    /// False for a failed validation or comparison.
    pub fn matched(&self) -> bool {
        match self {
            Report::Hash { .. } => true,
            Report::Validate(validation) => validation.matched,
            Report::Compare(comparison) => comparison.matched,
        }
    }
}

/// Choose the execution path for the classified arguments.
///
/// # Errors
///
/// Returns [`HashError::InvalidArguments`] listing every rejected argument,
/// [`HashError::NoInputs`] when there are none, and
/// [`HashError::UnsupportedInputs`] for combinations without a mode.
pub fn select_mode(classifications: &[ArgumentClassification]) -> Result<Mode> {
    if let Some(details) = describe_invalid(classifications) {
        return Err(HashError::InvalidArguments { details });
    }

    let files: Vec<PathBuf> = classifications
        .iter()
        .filter_map(|c| c.path().map(PathBuf::from))
        .collect();
    let hashes: Vec<HashArgument> = classifications
        .iter()
        .filter_map(|c| c.hash().cloned())
        .collect();

    match (files.as_slice(), hashes.as_slice()) {
        ([], []) => Err(HashError::NoInputs),
        ([left, right], []) => Ok(Mode::CompareFiles(left.clone(), right.clone())),
        ([file], [hash]) => Ok(Mode::Validate {
            file: file.clone(),
            hash: hash.clone(),
        }),
        ([], [left, right]) => Ok(Mode::CompareHashes(left.clone(), right.clone())),
        (_, []) => Ok(Mode::Hash(files)),
        (files, hashes) => Err(HashError::UnsupportedInputs {
            message: format!(
                "{} file(s) and {} hash(es); {USAGE_HINT}",
                files.len(),
                hashes.len()
            ),
        }),
    }
}

/// Run `mode` with the resolved settings.
///
/// # Errors
///
/// Propagates hashing, expansion and algorithm-selection errors.
pub fn execute(mode: &Mode, snapshot: &SettingsSnapshot) -> Result<Report> {
    match mode {
        Mode::Hash(paths) => hash_files(paths, snapshot).map(|files| Report::Hash { files }),
        Mode::Validate { file, hash } => validate(file, hash, snapshot).map(Report::Validate),
        Mode::CompareFiles(left, right) => {
            compare_files(left, right, snapshot).map(Report::Compare)
        }
        Mode::CompareHashes(left, right) => Ok(Report::Compare(compare_hashes(left, right))),
    }
}

/// How many arguments of each kind were given, for verbose output.
pub fn summarize(classifications: &[ArgumentClassification]) -> String {
    let (mut files, mut hashes) = (0, 0);
    for classification in classifications {
        match classification.kind {
            ArgumentKind::File(_) => files += 1,
            ArgumentKind::Hash(_) => hashes += 1,
            ArgumentKind::Invalid(_) => {}
        }
    }
    format!("{files} file(s), {hashes} hash(es)")
}
