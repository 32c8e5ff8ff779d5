//! Validate mode: check a file against an expected digest.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::algorithm::Algorithm;
use crate::classify::{HashArgument, describe_candidates};
use crate::error::{HashError, Result};
use crate::hashing::hash_file;
use crate::snapshot::SettingsSnapshot;

/// The result of checking one file against one digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub path: PathBuf,
    pub algorithm: Algorithm,
    pub expected: String,
    pub actual: String,
    pub matched: bool,
}

/// Pick the algorithm for a digest given on the command line.
///
/// An algorithm typed on the command line must be one of the candidates.
/// One set in the environment or the config file is only a preference: it
/// is used when it is a candidate and ignored otherwise. Without a usable
/// choice a single candidate is used as is, and several candidates are an
/// error: the choice is never guessed.
///
/// # Errors
///
/// Returns [`HashError::AlgorithmMismatch`] when the command-line algorithm
/// cannot produce this digest length, and [`HashError::AmbiguousHash`] when
/// nothing narrows several candidates down to one.
pub fn select_algorithm(hash: &HashArgument, snapshot: &SettingsSnapshot) -> Result<Algorithm> {
    let chosen = snapshot.chosen_algorithm();
    match (chosen, hash.candidates.as_slice()) {
        (Some(chosen), candidates) if candidates.contains(&chosen) => Ok(chosen),
        (Some(chosen), _) if snapshot.algorithm_is_explicit() => Err(mismatch(hash, chosen)),
        (_, [only]) => Ok(*only),
        _ => Err(HashError::AmbiguousHash {
            hash: hash.normalized.clone(),
            candidates: describe_candidates(hash),
        }),
    }
}

fn mismatch(hash: &HashArgument, chosen: Algorithm) -> HashError {
    HashError::AlgorithmMismatch {
        hash: hash.normalized.clone(),
        algorithm: chosen.to_string(),
        expected: describe_candidates(hash),
    }
}

/// Hashes `file` and compares it with `hash`.
pub fn validate(
    file: &Path,
    hash: &HashArgument,
    snapshot: &SettingsSnapshot,
) -> Result<Validation> {
    let algorithm = select_algorithm(hash, snapshot)?;
    let actual = hash_file(file, algorithm)?;
    let matched = actual == hash.normalized;

    tracing::debug!(
        file = %file.display(),
        %algorithm,
        matched,
        "validated file"
    );

    Ok(Validation {
        path: file.to_path_buf(),
        algorithm,
        expected: hash.normalized.clone(),
        actual,
        matched,
    })
}
