//! Compare mode: two files, or two digests.

use std::path::Path;

use serde::Serialize;

use super::hash::FileDigest;
use crate::algorithm::Algorithm;
use crate::classify::HashArgument;
use crate::error::Result;
use crate::snapshot::SettingsSnapshot;

/// The result of comparing two inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    /// File paths, or the normalized digests
    pub left: String,
    pub right: String,
    /// Set when files were hashed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<Algorithm>,
    pub left_digest: String,
    pub right_digest: String,
    pub matched: bool,
}

/// Hashes both files with the configured algorithm and compares digests.
pub fn compare_files(left: &Path, right: &Path, snapshot: &SettingsSnapshot) -> Result<Comparison> {
    let algorithm = snapshot.algorithm();
    let (left_digest, right_digest) = rayon::join(
        || FileDigest::compute(left, algorithm),
        || FileDigest::compute(right, algorithm),
    );
    let (left_digest, right_digest) = (left_digest?, right_digest?);

    Ok(Comparison {
        left: left.display().to_string(),
        right: right.display().to_string(),
        algorithm: Some(algorithm),
        matched: left_digest.digest == right_digest.digest,
        left_digest: left_digest.digest,
        right_digest: right_digest.digest,
    })
}

/// Compares two digests by their normalized form.
pub fn compare_hashes(left: &HashArgument, right: &HashArgument) -> Comparison {
    Comparison {
        left: left.normalized.clone(),
        right: right.normalized.clone(),
        algorithm: None,
        left_digest: left.normalized.clone(),
        right_digest: right.normalized.clone(),
        matched: left.normalized == right.normalized,
    }
}
