//! Resolved settings for one invocation.
//!
//! A [`DraftSnapshot`] is produced by the precedence resolver and adjusted
//! by the conflict matrix; [`DraftSnapshot::freeze`] turns it into the
//! read-only [`SettingsSnapshot`] every command consumes. Nothing outside
//! the crate can mutate either.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::algorithm::Algorithm;
use crate::registry::{Value, names};

/// Where an effective value came from, highest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cli,
    Env,
    File,
    Default,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::Cli => "cli",
            Source::Env => "env",
            Source::File => "file",
            Source::Default => "default",
        })
    }
}

/// The effective value of one option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingValue {
    pub value: Value,
    pub source: Source,
    /// True only when the value was read from the command line.
    pub explicit: bool,
}

/// Outcome of one conflict rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictResolution {
    /// The concern the rule governs, e.g. `output-mode`
    pub concern: &'static str,
    /// The member governing the concern, if any member is active
    pub winner: Option<&'static str>,
    /// Explicitly set members that lost to the winner, in priority order
    pub overridden: Vec<&'static str>,
}

/// The mutually exclusive output behaviours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Bool,
    Quiet,
    Json,
    Verbose,
    Normal,
}

/// Settings under construction. Only the resolver and the conflict matrix
/// write to it.
#[derive(Debug, Default)]
pub struct DraftSnapshot {
    settings: BTreeMap<&'static str, SettingValue>,
    positionals: Vec<String>,
    resolutions: Vec<ConflictResolution>,
}

impl DraftSnapshot {
    pub(crate) fn new(positionals: Vec<String>) -> Self {
        Self {
            settings: BTreeMap::new(),
            positionals,
            resolutions: Vec::new(),
        }
    }

    /// Records the effective value for `name`. The first value wins; the
    /// resolver visits each option exactly once.
    pub(crate) fn set(&mut self, name: &'static str, setting: SettingValue) {
        self.settings.entry(name).or_insert(setting);
    }

    pub(crate) fn record(&mut self, resolution: ConflictResolution) {
        self.resolutions.push(resolution);
    }

    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.settings.get(name)
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Finish resolution; the result can no longer change.
    pub fn freeze(self) -> SettingsSnapshot {
        SettingsSnapshot {
            settings: self.settings,
            positionals: self.positionals,
            resolutions: self.resolutions,
        }
    }
}

/// The fully resolved, immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct SettingsSnapshot {
    settings: BTreeMap<&'static str, SettingValue>,
    positionals: Vec<String>,
    resolutions: Vec<ConflictResolution>,
}

impl SettingsSnapshot {
    /// The effective setting for `name`.
    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.settings.get(name)
    }

    /// All settings ordered by option name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &SettingValue)> {
        self.settings.iter().map(|(name, setting)| (*name, setting))
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Free positional arguments in input order.
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// Conflict outcomes in rule registration order.
    pub fn resolutions(&self) -> &[ConflictResolution] {
        &self.resolutions
    }

    /// The outcome of the rule governing `concern`.
    pub fn resolution(&self, concern: &str) -> Option<&ConflictResolution> {
        self.resolutions.iter().find(|r| r.concern == concern)
    }

    /// Boolean value of `name`; `false` when absent.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name)
            .and_then(|setting| setting.value.as_bool())
            .unwrap_or(false)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|setting| setting.value.as_str())
    }

    pub fn integer(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(|setting| setting.value.as_int())
    }

    pub fn list(&self, name: &str) -> &[String] {
        self.get(name)
            .and_then(|setting| setting.value.as_list())
            .unwrap_or(&[])
    }

    /// The configured digest algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.string(names::ALGORITHM)
            .and_then(|name| name.parse().ok())
            .unwrap_or(Algorithm::Sha256)
    }

    /// The configured algorithm, but only when some source other than the
    /// registry default chose it.
    pub fn chosen_algorithm(&self) -> Option<Algorithm> {
        self.get(names::ALGORITHM)
            .filter(|setting| setting.source != Source::Default)
            .map(|_| self.algorithm())
    }

    /// Whether the algorithm was typed on the command line.
    pub fn algorithm_is_explicit(&self) -> bool {
        self.get(names::ALGORITHM)
            .is_some_and(|setting| setting.explicit)
    }

    /// The output mode governing this run, as decided by the output-mode rule.
    pub fn output_mode(&self) -> OutputMode {
        match self
            .resolution(names::OUTPUT_MODE)
            .and_then(|resolution| resolution.winner)
        {
            Some(names::BOOL) => OutputMode::Bool,
            Some(names::QUIET) => OutputMode::Quiet,
            Some(names::JSON) => OutputMode::Json,
            Some(names::VERBOSE) => OutputMode::Verbose,
            _ => OutputMode::Normal,
        }
    }

    pub fn recursive(&self) -> bool {
        self.flag(names::RECURSIVE)
    }

    /// Worker thread count; 0 means one per CPU.
    pub fn threads(&self) -> usize {
        self.integer(names::THREADS)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0)
    }

    pub fn exclude(&self) -> &[String] {
        self.list(names::EXCLUDE)
    }
}
