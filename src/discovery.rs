//! Expansion of file arguments into the list of files to hash.
//!
//! Regular files pass through unchanged. Directories are walked with
//! `walkdir` when recursion is enabled; entries are visited in file-name
//! order and symbolic links are not followed, so output is deterministic.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::{HashError, Result};

/// Expands `paths` into files, preserving argument order.
///
/// Entries whose file name appears in `exclude` are skipped, together with
/// everything below them. The arguments themselves are never excluded.
///
/// # Errors
///
/// Returns [`HashError::InvalidFileType`] for a directory when `recursive`
/// is false, and [`HashError::Io`] if a directory cannot be read.
pub fn expand_inputs(
    paths: &[PathBuf],
    recursive: bool,
    exclude: &[String],
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        if !recursive {
            return Err(HashError::InvalidFileType {
                path: path.clone(),
                message: "Directories are only hashed with --recursive".to_string(),
            });
        }

        let before = files.len();
        walk(path, exclude, &mut files)?;
        tracing::debug!(
            dir = %path.display(),
            files = files.len() - before,
            "expanded directory"
        );
    }

    Ok(files)
}

fn walk(root: &Path, exclude: &[String], files: &mut Vec<PathBuf>) -> Result<()> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry, exclude));

    for entry in walker {
        let entry = entry.map_err(|err| HashError::Io {
            path: err.path().unwrap_or(root).to_path_buf(),
            source: err.into(),
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(())
}

fn is_excluded(entry: &DirEntry, exclude: &[String]) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| exclude.iter().any(|excluded| excluded == name))
}
