//! Positional argument classification.
//!
//! Every free positional argument is sorted into one of three kinds:
//!
//! - **file**: the argument names an existing filesystem entry. This check
//!   always runs first, so a file whose name happens to look like a digest
//!   is still a file
//! - **hash**: a hex string whose length matches one or more supported
//!   algorithms; it is normalized to lowercase and carries every candidate
//! - **invalid**: anything else, with a reason the user can act on
//!
//! Classification never hashes and never picks between candidates; that is
//! left to the command that consumes the result.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::algorithm::{Algorithm, join_names};


/// Existence check used to decide whether an argument names a file.
pub trait PathCheck: Sync {
    fn exists(&self, path: &Path) -> bool;
}

/// Checks the real filesystem. An entry counts when it exists and can be
/// opened: files for reading, directories for listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Filesystem;

impl PathCheck for Filesystem {
    fn exists(&self, path: &Path) -> bool {
        match std::fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => std::fs::read_dir(path).is_ok(),
            Ok(_) => std::fs::File::open(path).is_ok(),
            Err(_) => false,
        }
    }
}

impl<F> PathCheck for F
where
    F: Fn(&Path) -> bool + Sync,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

/// A hex digest given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashArgument {
    /// Lowercase form used for every comparison
    pub normalized: String,
    /// Algorithms whose digest has this length, in [`Algorithm::ALL`] order
    pub candidates: Vec<Algorithm>,
}

impl HashArgument {
    /// More than one algorithm produces digests of this length.
    pub fn is_ambiguous(&self) -> bool {
        self.candidates.len() > 1
    }
}

const NOT_FILE_OR_HASH: &str = "not an existing file, and not a hash";

/// Why an argument is neither a file nor a hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidArgument {
    Empty,
    /// Not hexadecimal; `position` is 1-based and counts characters.
    InvalidCharacters { character: char, position: usize },
    /// Hexadecimal, but no supported algorithm has this digest length.
    WrongLength { length: usize, expected: Vec<usize> },
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidArgument::Empty => f.write_str("empty argument"),
            InvalidArgument::InvalidCharacters {
                character,
                position,
            } => write!(
                f,
                "{NOT_FILE_OR_HASH}: invalid character '{character}' at position {position}"
            ),
            InvalidArgument::WrongLength { length, expected } => {
                let expected = expected
                    .iter()
                    .map(usize::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "{NOT_FILE_OR_HASH}: wrong length ({length} hex characters, \
                     expected one of {expected})"
                )
            }
        }
    }
}

/// The kind an argument was classified as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentKind {
    File(PathBuf),
    Hash(HashArgument),
    Invalid(InvalidArgument),
}

/// One classified positional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentClassification {
    /// The argument exactly as given
    pub original: String,
    pub kind: ArgumentKind,
}

impl ArgumentClassification {
    pub fn path(&self) -> Option<&Path> {
        match &self.kind {
            ArgumentKind::File(path) => Some(path),
            _ => None,
        }
    }

    pub fn hash(&self) -> Option<&HashArgument> {
        match &self.kind {
            ArgumentKind::Hash(hash) => Some(hash),
            _ => None,
        }
    }

    pub fn invalid(&self) -> Option<&InvalidArgument> {
        match &self.kind {
            ArgumentKind::Invalid(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Classifies positional arguments against the supported digest lengths.
#[derive(Debug, Clone)]
pub struct Classifier<P = Filesystem> {
    check: P,
    lengths: BTreeMap<usize, Vec<Algorithm>>,
}

impl Classifier<Filesystem> {
    /// A classifier backed by the real filesystem.
    pub fn new() -> Self {
        Self::with_check(Filesystem)
    }
}

impl Default for Classifier<Filesystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PathCheck> Classifier<P> {
    pub fn with_check(check: P) -> Self {
        let mut lengths: BTreeMap<usize, Vec<Algorithm>> = BTreeMap::new();
        for algorithm in Algorithm::ALL {
            lengths
                .entry(algorithm.hex_len())
                .or_default()
                .push(algorithm);
        }
        Self { check, lengths }
    }

    /// Hex lengths that some supported algorithm produces, ascending.
    pub fn accepted_lengths(&self) -> Vec<usize> {
        self.lengths.keys().copied().collect()
    }

    /// Classify a single argument.
    pub fn classify(&self, arg: &str) -> ArgumentClassification {
        let kind = if !arg.is_empty() && self.check.exists(Path::new(arg)) {
            ArgumentKind::File(PathBuf::from(arg))
        } else {
            match self.parse_hash(arg) {
                Ok(hash) => ArgumentKind::Hash(hash),
                Err(reason) => ArgumentKind::Invalid(reason),
            }
        };

        tracing::trace!(arg, kind = ?kind, "classified argument");
        ArgumentClassification {
            original: arg.to_string(),
            kind,
        }
    }

    /// Classify every argument in parallel, keeping input order.
    pub fn classify_all<S>(&self, args: &[S]) -> Vec<ArgumentClassification>
    where
        S: AsRef<str> + Sync,
    {
        args.par_iter()
            .map(|arg| self.classify(arg.as_ref()))
            .collect()
    }

    fn parse_hash(&self, arg: &str) -> Result<HashArgument, InvalidArgument> {
        if arg.is_empty() {
            return Err(InvalidArgument::Empty);
        }
        let bad = arg
            .chars()
            .enumerate()
            .find(|(_, c)| !c.is_ascii_hexdigit());
        if let Some((index, character)) = bad {
            return Err(InvalidArgument::InvalidCharacters {
                character,
                position: index + 1,
            });
        }

        match self.lengths.get(&arg.len()) {
            Some(candidates) => Ok(HashArgument {
                normalized: arg.to_ascii_lowercase(),
                candidates: candidates.clone(),
            }),
            None => Err(InvalidArgument::WrongLength {
                length: arg.len(),
                expected: self.accepted_lengths(),
            }),
        }
    }
}

/// Render rejected arguments one per line, for
/// [`crate::error::HashError::InvalidArguments`].
pub fn describe_invalid(classifications: &[ArgumentClassification]) -> Option<String> {
    let lines: Vec<String> = classifications
        .iter()
        .filter_map(|c| {
            let reason = c.invalid()?;
            Some(format!("  '{}': {reason}", c.original))
        })
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Candidate list for messages, e.g. `sha512, blake2b`.
pub fn describe_candidates(hash: &HashArgument) -> String {
    join_names(&hash.candidates)
}
