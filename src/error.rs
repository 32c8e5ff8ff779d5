//! Error types for hashcmp.
//!
//! This module defines all error types used throughout hashcmp, using
//! a combination of `thiserror` for ergonomic error definitions and `miette`
//! for rich diagnostic output.
//!
//! # Error Handling Strategy
//!
//! - All errors are variants of [`HashError`]
//! - Each variant carries a diagnostic code and, where the user can act on
//!   it, a help line
//! - Reader errors abort before precedence resolution, so no partially
//!   resolved snapshot is ever observable
//! - Conflict warnings are not errors; see [`crate::conflict::Warning`]
//!
//! # Example
//!
//! ```no_run
//! use hashcmp::error::{HashError, Result};
//!
//! fn require_inputs(inputs: &[String]) -> Result<()> {
//!     if inputs.is_empty() {
//!         return Err(HashError::NoInputs);
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::registry::RegistryError;

/// Error types that can occur in hashcmp operations
#[derive(Error, Debug, Diagnostic)]
pub enum HashError {
    /// A command-line token could not be parsed.
    ///
    /// Raised by the CLI reader for unknown flags, malformed syntax, repeated
    /// single-value flags and values outside an option's domain. The message
    /// always names the offending token.
    #[error("{message}")]
    #[diagnostic(code(hashcmp::usage))]
    Usage {
        /// What was found and what was expected
        message: String,
        /// Accepted values or a usage hint
        #[help]
        help: Option<String>,
    },

    /// `--help` or `--version` was requested.
    ///
    /// Not a failure; `main` prints the rendered text and exits successfully.
    #[error("{0}")]
    #[diagnostic(code(hashcmp::info))]
    InfoRequested(clap::Error),

    /// An environment variable or config-file value could not be coerced to
    /// the option's declared kind.
    #[error("Invalid value in {origin}: {message}")]
    #[diagnostic(
        code(hashcmp::config::invalid_value),
        help("Fix or remove the offending setting and try again.")
    )]
    Config {
        /// The variable or key the value came from
        origin: String,
        /// Description of the coercion failure
        message: String,
    },

    /// The config file exists but could not be read.
    #[error("Failed to read config file '{}'", path.display())]
    #[diagnostic(code(hashcmp::config::read_error))]
    ConfigRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML.
    #[error("Failed to parse config file '{}'", path.display())]
    #[diagnostic(
        code(hashcmp::config::parse_error),
        help("The config file must be a flat TOML table of option names to values.")
    )]
    ConfigParse {
        /// Path to the config file
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// The option registry failed validation while it was being built.
    #[error(transparent)]
    #[diagnostic(code(hashcmp::registry))]
    Registry(#[from] RegistryError),

    /// One or more positional arguments are neither files nor valid hashes.
    #[error("Invalid argument(s):\n{details}")]
    #[diagnostic(
        code(hashcmp::args::invalid),
        help("Arguments must be existing files or hexadecimal digests.")
    )]
    InvalidArguments {
        /// One line per rejected argument
        details: String,
    },

    /// No positional arguments were given.
    #[error("No input files or hashes given")]
    #[diagnostic(
        code(hashcmp::args::none),
        help("Pass files to hash, a file and a digest to validate, or two inputs to compare.")
    )]
    NoInputs,

    /// The combination of positional arguments does not map to a mode.
    #[error("Unsupported combination of inputs: {message}")]
    #[diagnostic(code(hashcmp::args::unsupported))]
    UnsupportedInputs {
        /// Description of what was given
        message: String,
    },

    /// A digest matches more than one supported algorithm and nothing
    /// selected one of them.
    #[error("Hash '{hash}' is ambiguous: it could be {candidates}")]
    #[diagnostic(
        code(hashcmp::hash::ambiguous),
        help("Pass --algorithm with one of the candidate algorithms.")
    )]
    AmbiguousHash {
        /// The normalized digest
        hash: String,
        /// Comma-separated candidate algorithms
        candidates: String,
    },

    /// The configured algorithm cannot produce a digest of the given length.
    #[error("Hash '{hash}' cannot be a {algorithm} digest; its length fits {expected}")]
    #[diagnostic(
        code(hashcmp::hash::algorithm_mismatch),
        help("Pass an --algorithm that produces a digest of this length, or omit it.")
    )]
    AlgorithmMismatch {
        /// The normalized digest
        hash: String,
        /// The configured algorithm
        algorithm: String,
        /// Comma-separated algorithms matching the digest length
        expected: String,
    },

    /// File system I/O error while reading an input.
    #[error("I/O error accessing '{}'", path.display())]
    #[diagnostic(code(hashcmp::io_error))]
    Io {
        /// The path that caused the I/O error
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Attempted to hash something that is not a regular file.
    #[error("Invalid file type for '{}': {message}", path.display())]
    #[diagnostic(
        code(hashcmp::file::invalid_type),
        help("Only regular files can be hashed; pass --recursive to expand directories.")
    )]
    InvalidFileType {
        /// The path of the invalid file
        path: PathBuf,
        /// Description of the file type issue
        message: String,
    },

    /// The rayon thread pool could not be configured.
    #[error("Failed to configure {threads} worker thread(s)")]
    #[diagnostic(code(hashcmp::threads))]
    ThreadPool {
        /// Requested thread count
        threads: usize,
        /// The underlying rayon error
        #[source]
        source: rayon::ThreadPoolBuildError,
    },

    /// JSON output could not be produced.
    #[error("Failed to render JSON output")]
    #[diagnostic(code(hashcmp::output::json))]
    Serialization(#[from] serde_json::Error),
}

impl HashError {
    /// Creates a [`HashError::Usage`] without a help line.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: None,
        }
    }

    /// Creates a [`HashError::Config`] for the given origin.
    pub fn config(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            origin: origin.into(),
            message: message.into(),
        }
    }
}

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, HashError>;
