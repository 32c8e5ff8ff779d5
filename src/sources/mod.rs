//! Source readers.
//!
//! Three independent readers turn raw input into partial value maps keyed by
//! option name:
//!
//! - [`cli::CliReader`] parses command-line tokens (the only source that
//!   marks values explicit) and collects positional arguments
//! - [`env::EnvReader`] reads one variable per option from an [`EnvSource`]
//! - [`file::FileReader`] consumes an already-parsed TOML table
//!
//! Readers never consult each other; the precedence resolver merges their
//! [`Layer`]s.

use std::collections::BTreeMap;

use crate::registry::Value;
use crate::snapshot::Source;

pub mod cli;
pub mod env;
pub mod file;

pub use cli::{CliLayer, CliReader};
pub use env::{EnvReader, EnvSource, ProcessEnv};
pub use file::{FileReader, default_config_path, load_table};

/// A value read by one source, before precedence is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSetting {
    pub value: Value,
    /// Set from the moment of parsing; never inferred later.
    pub explicit: bool,
    /// The flag, variable or key the value came from
    pub origin: String,
}

/// The partial map produced by one source.
#[derive(Debug, Clone)]
pub struct Layer {
    source: Source,
    entries: BTreeMap<&'static str, RawSetting>,
}

impl Layer {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            entries: BTreeMap::new(),
        }
    }

    /// An empty layer, e.g. for a missing config file.
    pub fn empty(source: Source) -> Self {
        Self::new(source)
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn insert(&mut self, name: &'static str, setting: RawSetting) {
        self.entries.insert(name, setting);
    }

    pub fn get(&self, name: &str) -> Option<&RawSetting> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &RawSetting)> {
        self.entries.iter().map(|(name, setting)| (*name, setting))
    }
}
