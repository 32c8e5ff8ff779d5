use std::fs::{File, Metadata};
use std::path::Path;

use memmap2::Mmap;
use sha2::Digest;

use crate::algorithm::Algorithm;
use crate::error::{HashError, Result};

/// Computes the digest of a file using memory mapping.
///
/// BLAKE3 uses its built-in rayon parallelism over the mapped bytes; the
/// other algorithms go through the RustCrypto [`Digest`] implementations.
/// Symbolic links are rejected for security reasons.
///
/// # Arguments
///
/// * `path` - Path to the file to hash
/// * `algorithm` - Digest algorithm to apply
///
/// # Returns
///
/// The lowercase hex digest of the file's contents.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The path points to a symbolic link or a directory
/// - Memory mapping fails
pub fn hash_file(path: &Path, algorithm: Algorithm) -> Result<String> {
    let metadata = regular_file_metadata(path)?;

    // Empty files cannot be mapped
    if metadata.len() == 0 {
        return Ok(hash_bytes(&[], algorithm));
    }

    let file = File::open(path).map_err(|source| HashError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mmap = unsafe { Mmap::map(&file) }.map_err(|source| HashError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(hash_bytes(&mmap, algorithm))
}

/// Computes the lowercase hex digest of an in-memory buffer.
pub fn hash_bytes(data: &[u8], algorithm: Algorithm) -> String {
    match algorithm {
        Algorithm::Md5 => digest_hex::<md5::Md5>(data),
        Algorithm::Sha1 => digest_hex::<sha1::Sha1>(data),
        Algorithm::Sha224 => digest_hex::<sha2::Sha224>(data),
        Algorithm::Sha256 => digest_hex::<sha2::Sha256>(data),
        Algorithm::Sha384 => digest_hex::<sha2::Sha384>(data),
        Algorithm::Sha512 => digest_hex::<sha2::Sha512>(data),
        Algorithm::Blake2b => digest_hex::<blake2::Blake2b512>(data),
        Algorithm::Blake3 => {
            let mut hasher = blake3::Hasher::new();
            hasher.update_rayon(data);
            hasher.finalize().to_hex().to_string()
        }
    }
}

fn digest_hex<D: Digest>(data: &[u8]) -> String {
    let mut hasher = D::new();
    hasher.update(data);
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Gets the size of a file in bytes, checking for symbolic links.
///
/// # Errors
///
/// Returns an error if the file cannot be accessed or is not a regular file.
pub fn file_size(path: &Path) -> Result<u64> {
    regular_file_metadata(path).map(|metadata| metadata.len())
}

/// `symlink_metadata` for `path`, rejecting symlinks and directories.
fn regular_file_metadata(path: &Path) -> Result<Metadata> {
    let metadata = std::fs::symlink_metadata(path).map_err(|source| HashError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if metadata.is_symlink() {
        return Err(HashError::InvalidFileType {
            path: path.to_path_buf(),
            message: "Symbolic links are not supported".to_string(),
        });
    }

    if metadata.is_dir() {
        return Err(HashError::InvalidFileType {
            path: path.to_path_buf(),
            message: "Directories are not supported".to_string(),
        });
    }

    Ok(metadata)
}
