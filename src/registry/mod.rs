//! The option registry: a declarative catalog of every setting.
//!
//! Each [`OptionSpec`] describes one setting's kind, default, accepted
//! values, environment variable and CLI forms. The source readers, the
//! precedence resolver and the conflict matrix are all generic loops over
//! this table; adding a setting means adding an entry here, never a new
//! branch elsewhere.
//!
//! The process-wide registry is built once, on first use, by
//! [`Registry::global`]. Building validates the table and the registered
//! [`ConflictRule`]s and fails fast on duplicates, invalid defaults or rules
//! that could disagree with each other.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use thiserror::Error;

use crate::algorithm::Algorithm;
use crate::conflict::ConflictRule;


/// Names of the standard options.
pub mod names {
    pub const ALGORITHM: &str = "algorithm";
    pub const BOOL: &str = "bool";
    pub const QUIET: &str = "quiet";
    pub const JSON: &str = "json";
    pub const VERBOSE: &str = "verbose";
    pub const RECURSIVE: &str = "recursive";
    pub const THREADS: &str = "threads";
    pub const EXCLUDE: &str = "exclude";
    pub const CONFIG: &str = "config";

    /// Concern governed by the output-mode conflict rule.
    pub const OUTPUT_MODE: &str = "output-mode";
}

/// Clap id of the positional arguments; no option may use it.
pub const POSITIONAL_ID: &str = "inputs";

/// CLI forms clap claims for `--help` and `--version`.
const RESERVED_LONGS: [&str; 2] = ["help", "version"];
const RESERVED_SHORTS: [char; 2] = ['h', 'V'];

/// The kind of value an option holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Boolean,
    String,
    Enum,
    Integer,
    StringList,
}

impl OptionKind {
    /// Human-readable description used in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            OptionKind::Boolean => "a boolean (true/false)",
            OptionKind::String => "a string",
            OptionKind::Enum => "one of the accepted values",
            OptionKind::Integer => "a non-negative integer",
            OptionKind::StringList => "a list of strings",
        }
    }
}

/// A typed option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Str(String),
    Choice(String),
    Int(u64),
    List(Vec<String>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Choice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<u64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) | Value::Choice(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::List(items) => f.write_str(&items.join(",")),
        }
    }
}

/// Why a raw string could not become a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoerceError {
    /// What was wrong with the raw value
    pub message: String,
    /// Accepted values, for enum options
    pub accepted: Option<&'static [&'static str]>,
}

impl fmt::Display for CoerceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(accepted) = self.accepted {
            write!(f, " (accepted values: {})", accepted.join(", "))?;
        }
        Ok(())
    }
}

/// Declarative description of one configurable setting.
#[derive(Debug, Clone)]
pub struct OptionSpec {
    name: &'static str,
    kind: OptionKind,
    default: Value,
    allowed: &'static [&'static str],
    env: Option<&'static str>,
    long: &'static str,
    short: Option<char>,
    help: &'static str,
    quiet_like: bool,
    file_settable: bool,
}

impl OptionSpec {
    fn new(name: &'static str, kind: OptionKind, default: Value) -> Self {
        Self {
            name,
            kind,
            default,
            allowed: &[],
            env: None,
            long: name,
            short: None,
            help: "",
            quiet_like: false,
            file_settable: true,
        }
    }

    /// A boolean flag defaulting to `false`.
    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, OptionKind::Boolean, Value::Bool(false))
    }

    /// A free-form string.
    pub fn string(name: &'static str, default: &str) -> Self {
        Self::new(name, OptionKind::String, Value::Str(default.to_string()))
    }

    /// One value out of a fixed set.
    pub fn choice(name: &'static str, allowed: &'static [&'static str], default: &str) -> Self {
        let mut spec = Self::new(name, OptionKind::Enum, Value::Choice(default.to_string()));
        spec.allowed = allowed;
        spec
    }

    /// A non-negative integer.
    pub fn integer(name: &'static str, default: u64) -> Self {
        Self::new(name, OptionKind::Integer, Value::Int(default))
    }

    /// A list of strings defaulting to empty.
    pub fn list(name: &'static str) -> Self {
        Self::new(name, OptionKind::StringList, Value::List(Vec::new()))
    }

    /// Set the single-character CLI form.
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Set the environment variable.
    pub fn env(mut self, var: &'static str) -> Self {
        self.env = Some(var);
        self
    }

    /// Set the help text shown by `--help`.
    pub fn help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }

    /// Mark the option as promising minimal output.
    pub fn quiet_like(mut self) -> Self {
        self.quiet_like = true;
        self
    }

    /// Disallow setting the option from the config file.
    pub fn not_in_file(mut self) -> Self {
        self.file_settable = false;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn allowed(&self) -> &'static [&'static str] {
        self.allowed
    }

    pub fn env_var(&self) -> Option<&'static str> {
        self.env
    }

    pub fn long(&self) -> &'static str {
        self.long
    }

    pub fn short_form(&self) -> Option<char> {
        self.short
    }

    pub fn help_text(&self) -> &'static str {
        self.help
    }

    pub fn is_quiet_like(&self) -> bool {
        self.quiet_like
    }

    pub fn is_file_settable(&self) -> bool {
        self.file_settable
    }

    /// Key used in the config file, e.g. `algorithm`.
    pub fn file_key(&self) -> String {
        self.name.replace('-', "_")
    }

    /// Coerce a raw string (from the command line or the environment).
    pub fn parse(&self, raw: &str) -> Result<Value, CoerceError> {
        match self.kind {
            OptionKind::Boolean => parse_bool(raw)
                .map(Value::Bool)
                .ok_or_else(|| self.wrong_kind(raw)),
            OptionKind::String => Ok(Value::Str(raw.to_string())),
            OptionKind::Enum => self.parse_choice(raw),
            OptionKind::Integer => raw
                .trim()
                .parse::<u64>()
                .map(Value::Int)
                .map_err(|_| self.wrong_kind(raw)),
            OptionKind::StringList => Ok(Value::List(split_list(raw))),
        }
    }

    fn wrong_kind(&self, raw: &str) -> CoerceError {
        CoerceError {
            message: format!("expected {}, found '{raw}'", self.kind.describe()),
            accepted: None,
        }
    }

    /// Validate an enum value, folding case to the canonical spelling.
    pub fn parse_choice(&self, raw: &str) -> Result<Value, CoerceError> {
        let lowered = raw.trim().to_ascii_lowercase();
        self.allowed
            .iter()
            .find(|allowed| **allowed == lowered)
            .map(|allowed| Value::Choice((*allowed).to_string()))
            .ok_or_else(|| CoerceError {
                message: format!("invalid value '{raw}'"),
                accepted: Some(self.allowed),
            })
    }

    /// Whether `value` has this option's kind and, for enums, is allowed.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self.kind, value) {
            (OptionKind::Boolean, Value::Bool(_))
            | (OptionKind::String, Value::Str(_))
            | (OptionKind::Integer, Value::Int(_))
            | (OptionKind::StringList, Value::List(_)) => true,
            (OptionKind::Enum, Value::Choice(choice)) => self.allowed.contains(&choice.as_str()),
            _ => false,
        }
    }
}

/// Parses the boolean spellings accepted from the CLI and the environment.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Splits a comma-separated list, dropping empty items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Registry validation failures.
///
/// These indicate a bug in the static option table, not a user mistake.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Option '{0}' is registered twice")]
    DuplicateOption(&'static str),

    #[error("Option '{0}' uses a reserved name")]
    ReservedName(&'static str),

    #[error("CLI form '{flag}' is used by both '{first}' and '{second}'")]
    DuplicateFlag {
        flag: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("Environment variable '{var}' is used by both '{first}' and '{second}'")]
    DuplicateEnv {
        var: &'static str,
        first: &'static str,
        second: &'static str,
    },

    #[error("Option '{0}' is an enum without accepted values")]
    EmptyChoices(&'static str),

    #[error("Default '{default}' is not valid for option '{name}'")]
    InvalidDefault { name: &'static str, default: String },

    #[error("Conflict rule '{0}' needs at least two options")]
    RuleTooSmall(&'static str),

    #[error("Conflict rule '{concern}' names unknown option '{name}'")]
    UnknownRuleMember {
        concern: &'static str,
        name: &'static str,
    },

    #[error("Conflict rule '{concern}' lists option '{name}' more than once")]
    DuplicateRuleMember {
        concern: &'static str,
        name: &'static str,
    },

    #[error("Option '{name}' belongs to both conflict rules '{first}' and '{second}'")]
    OverlappingRules {
        name: &'static str,
        first: &'static str,
        second: &'static str,
    },
}

/// The immutable catalog of options and conflict rules.
#[derive(Debug)]
pub struct Registry {
    options: Vec<OptionSpec>,
    rules: Vec<ConflictRule>,
}

static GLOBAL: LazyLock<Result<Registry, RegistryError>> = LazyLock::new(Registry::standard);

impl Registry {
    /// Creates a new builder for [`Registry`]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The process-wide registry, built and validated on first access.
    pub fn global() -> Result<&'static Registry, RegistryError> {
        GLOBAL.as_ref().map_err(Clone::clone)
    }

    /// Builds the standard hashcmp option table.
    pub fn standard() -> Result<Registry, RegistryError> {
        Registry::builder()
            .option(
                OptionSpec::choice(names::ALGORITHM, &Algorithm::NAMES, "sha256")
                    .short('a')
                    .env("HASHCMP_ALGORITHM")
                    .help("Digest algorithm used for hashing and validation"),
            )
            .option(
                OptionSpec::boolean(names::BOOL)
                    .short('b')
                    .env("HASHCMP_BOOL")
                    .quiet_like()
                    .help("Print only true or false"),
            )
            .option(
                OptionSpec::boolean(names::QUIET)
                    .short('q')
                    .env("HASHCMP_QUIET")
                    .quiet_like()
                    .help("Print nothing; report the result through the exit code"),
            )
            .option(
                OptionSpec::boolean(names::JSON)
                    .short('j')
                    .env("HASHCMP_JSON")
                    .help("Print results as JSON"),
            )
            .option(
                OptionSpec::boolean(names::VERBOSE)
                    .short('v')
                    .env("HASHCMP_VERBOSE")
                    .help("Print settings provenance and extra detail"),
            )
            .option(
                OptionSpec::boolean(names::RECURSIVE)
                    .short('r')
                    .env("HASHCMP_RECURSIVE")
                    .help("Hash every file below directory arguments"),
            )
            .option(
                OptionSpec::integer(names::THREADS, 0)
                    .short('t')
                    .env("HASHCMP_THREADS")
                    .help("Worker threads for hashing (0 = one per CPU)"),
            )
            .option(
                OptionSpec::list(names::EXCLUDE)
                    .short('x')
                    .env("HASHCMP_EXCLUDE")
                    .help("File or directory names to skip when recursing (comma separated)"),
            )
            .option(
                OptionSpec::string(names::CONFIG, "")
                    .short('c')
                    .env("HASHCMP_CONFIG")
                    .not_in_file()
                    .help("Path to the config file"),
            )
            .rule(ConflictRule::new(
                names::OUTPUT_MODE,
                [names::BOOL, names::QUIET, names::JSON, names::VERBOSE],
            ))
            .build()
    }

    /// All options in registration order.
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    /// Look up an option by name.
    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|spec| spec.name == name)
    }

    /// Look up an option by config-file key; `-` and `_` are interchangeable.
    pub fn by_file_key(&self, key: &str) -> Option<&OptionSpec> {
        let key = key.replace('-', "_");
        self.options.iter().find(|spec| spec.file_key() == key)
    }

    /// All conflict rules, in registration order.
    pub fn rules(&self) -> &[ConflictRule] {
        &self.rules
    }
}

/// Builder for [`Registry`]
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    options: Vec<OptionSpec>,
    rules: Vec<ConflictRule>,
}

impl RegistryBuilder {
    /// Register an option
    pub fn option(mut self, spec: OptionSpec) -> Self {
        self.options.push(spec);
        self
    }

    /// Register a conflict rule
    pub fn rule(mut self, rule: ConflictRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Validate and freeze the registry.
    pub fn build(self) -> Result<Registry, RegistryError> {
        self.validate_options()?;
        self.validate_rules()?;
        Ok(Registry {
            options: self.options,
            rules: self.rules,
        })
    }

    fn validate_options(&self) -> Result<(), RegistryError> {
        let mut seen_names = HashSet::new();
        let mut flags: Vec<(String, &'static str)> = Vec::new();
        let mut envs: Vec<(&'static str, &'static str)> = Vec::new();

        for spec in &self.options {
            let reserved_short = spec
                .short
                .is_some_and(|short| RESERVED_SHORTS.contains(&short));
            if spec.name == POSITIONAL_ID || RESERVED_LONGS.contains(&spec.long) || reserved_short {
                return Err(RegistryError::ReservedName(spec.name));
            }
            if !seen_names.insert(spec.name) {
                return Err(RegistryError::DuplicateOption(spec.name));
            }
            if spec.kind == OptionKind::Enum && spec.allowed.is_empty() {
                return Err(RegistryError::EmptyChoices(spec.name));
            }
            if !spec.accepts(&spec.default) {
                return Err(RegistryError::InvalidDefault {
                    name: spec.name,
                    default: spec.default.to_string(),
                });
            }

            let mut forms = vec![format!("--{}", spec.long)];
            if let Some(short) = spec.short {
                forms.push(format!("-{short}"));
            }
            for form in forms {
                if let Some((_, first)) = flags.iter().find(|(flag, _)| *flag == form) {
                    return Err(RegistryError::DuplicateFlag {
                        flag: form,
                        first: *first,
                        second: spec.name,
                    });
                }
                flags.push((form, spec.name));
            }

            if let Some(var) = spec.env {
                if let Some((_, first)) = envs.iter().find(|(existing, _)| *existing == var) {
                    return Err(RegistryError::DuplicateEnv {
                        var,
                        first: *first,
                        second: spec.name,
                    });
                }
                envs.push((var, spec.name));
            }
        }

        Ok(())
    }

    fn validate_rules(&self) -> Result<(), RegistryError> {
        let mut owner: Vec<(&'static str, &'static str)> = Vec::new();

        for rule in &self.rules {
            if rule.members().len() < 2 {
                return Err(RegistryError::RuleTooSmall(rule.concern()));
            }

            let mut in_rule = HashSet::new();
            for &name in rule.members() {
                if !self.options.iter().any(|spec| spec.name == name) {
                    return Err(RegistryError::UnknownRuleMember {
                        concern: rule.concern(),
                        name,
                    });
                }
                if !in_rule.insert(name) {
                    return Err(RegistryError::DuplicateRuleMember {
                        concern: rule.concern(),
                        name,
                    });
                }
                if let Some((_, first)) = owner.iter().find(|(member, _)| *member == name) {
                    return Err(RegistryError::OverlappingRules {
                        name,
                        first: *first,
                        second: rule.concern(),
                    });
                }
                owner.push((name, rule.concern()));
            }
        }

        Ok(())
    }
}
