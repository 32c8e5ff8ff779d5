//! Hash mode: digest every input file.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::algorithm::Algorithm;
use crate::discovery::expand_inputs;
use crate::error::Result;
use crate::hashing::{file_size, hash_file};
use crate::snapshot::SettingsSnapshot;

/// The digest of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDigest {
    pub path: PathBuf,
    pub algorithm: Algorithm,
    pub digest: String,
    pub size: u64,
}

impl FileDigest {
    pub(crate) fn compute(path: &Path, algorithm: Algorithm) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            algorithm,
            digest: hash_file(path, algorithm)?,
            size: file_size(path)?,
        })
    }
}

/// Hashes `paths` with the configured algorithm, in parallel.
///
/// Directories are expanded first; results keep argument order, and
/// within a directory, file-name order.
pub fn hash_files(paths: &[PathBuf], snapshot: &SettingsSnapshot) -> Result<Vec<FileDigest>> {
    let files = expand_inputs(paths, snapshot.recursive(), snapshot.exclude())?;
    let algorithm = snapshot.algorithm();

    tracing::debug!(files = files.len(), %algorithm, "hashing files");

    files
        .par_iter()
        .map(|path| FileDigest::compute(path, algorithm))
        .collect()
}
