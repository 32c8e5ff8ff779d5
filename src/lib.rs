//! # hashcmp
//!
//! Hash files, validate a file against a digest, or compare two inputs,
//! with settings resolved from the command line, the environment and a
//! config file.
//!
//! ## Overview
//!
//! Every invocation goes through the same single pass before any file is
//! read:
//!
//! 1. The source readers turn argv, the environment and the config file
//!    into partial layers
//! 2. The precedence resolver merges them per option:
//!    command line > environment > config file > default
//! 3. The conflict matrix settles mutually exclusive output flags, keeping
//!    one winner and a warning for each loser
//! 4. The snapshot is frozen and handed to the commands
//!
//! A value is *explicit* only when it was typed on the command line, even if
//! it equals the default.
//!
//! ## Architecture
//!
//! - [`registry`]: Declarative catalog of options and conflict rules
//! - [`sources`]: CLI, environment and config-file readers
//! - [`resolve`]: Precedence resolution into a draft snapshot
//! - [`conflict`]: The conflict resolution matrix
//! - [`snapshot`]: Draft and frozen settings
//! - [`engine`]: Runs the whole resolution pass
//! - [`classify`]: File / hash / invalid classification of positionals
//! - [`commands`]: Mode selection, hashing, validation, comparison, output
//! - [`error`]: Error types and handling with thiserror + miette
//!
//! Internal modules (not part of the public API):
//! - `discovery`: Recursive directory expansion with walkdir
//! - `hashing`: Memory-mapped file hashing
//!
//! ## Modes
//!
//! ```bash
//! hashcmp file.iso                       # print the digest
//! hashcmp file.iso 9f86d081884c7d65...   # validate against a digest
//! hashcmp a.bin b.bin                    # compare two files
//! hashcmp -r --exclude target src/       # hash a tree
//! ```
//!
//! ## Environment Variables
//!
//! Every option can be set with `HASHCMP_<NAME>`, e.g. `HASHCMP_ALGORITHM`
//! or `HASHCMP_JSON=1`. `HASHCMP_LOG` takes `tracing` filter directives.
//!
//! ## Library Usage
//!
//! ```no_run
//! use hashcmp::engine::{ConfigInput, Engine};
//! use hashcmp::registry::Registry;
//!
//! let engine = Engine::builder(Registry::global()?)
//!     .config(ConfigInput::Disabled)
//!     .build();
//! let resolved = engine.resolve(["hashcmp", "--algorithm=blake3", "file.bin"])?;
//! assert_eq!(resolved.snapshot.algorithm().to_string(), "blake3");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! The crate uses a combination of:
//! - `thiserror` for strongly-typed errors
//! - `miette` for rich diagnostic output in CLI
//!
//! All public functions return `Result` types with descriptive error variants.

pub mod algorithm;
pub mod app;
pub mod classify;
pub mod commands;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod logging;
pub mod registry;
pub mod resolve;
pub mod snapshot;
pub mod sources;

// Internal modules
mod discovery;
mod hashing;
