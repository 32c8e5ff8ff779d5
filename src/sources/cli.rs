//! Command-line source.
//!
//! The clap command is generated from the registry, one argument per
//! option. An option is explicit exactly when clap reports its value source
//! as the command line; the parsed value is never compared to the default.

use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

use super::{Layer, RawSetting};
use crate::error::{HashError, Result};
use crate::registry::{CoerceError, OptionKind, OptionSpec, POSITIONAL_ID, Registry, Value};
use crate::snapshot::Source;

/// What the command line contributed: explicit values plus positionals.
#[derive(Debug, Clone)]
pub struct CliLayer {
    layer: Layer,
    positionals: Vec<String>,
}

impl CliLayer {
    /// Wrap values parsed by another front end. Only entries marked
    /// explicit take CLI precedence.
    pub fn new(layer: Layer, positionals: Vec<String>) -> Self {
        Self { layer, positionals }
    }

    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    /// Free positional tokens in input order.
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    pub fn into_parts(self) -> (Layer, Vec<String>) {
        (self.layer, self.positionals)
    }
}

/// Parses command-line tokens against the registry.
#[derive(Debug, Clone, Copy)]
pub struct CliReader<'r> {
    registry: &'r Registry,
}

impl<'r> CliReader<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// The clap command describing every registered option.
    pub fn command(&self) -> Command {
        let inputs = Arg::new(POSITIONAL_ID)
            .value_name("FILE|HASH")
            .num_args(1..)
            .action(ArgAction::Append)
            .help("Files to hash, or a file and a digest to validate, or two inputs to compare");

        let mut command = Command::new("hashcmp")
            .version(clap::crate_version!())
            .about("Hash files, validate them against a digest, or compare two inputs")
            .arg(inputs);
        for spec in self.registry.options() {
            command = command.arg(arg_for(spec));
        }
        command
    }

    /// Parse `tokens`; the first token is the program name.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Usage`] for unknown flags, malformed syntax and
    /// out-of-domain values, and [`HashError::InfoRequested`] for `--help`
    /// and `--version`.
    pub fn read<I, T>(&self, tokens: I) -> Result<CliLayer>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self
            .command()
            .try_get_matches_from(tokens)
            .map_err(usage_from_clap)?;

        let mut layer = Layer::new(Source::Cli);
        for spec in self.registry.options() {
            if matches.value_source(spec.name()) != Some(ValueSource::CommandLine) {
                continue;
            }
            let value = value_from_matches(spec, &matches)?;
            layer.insert(
                spec.name(),
                RawSetting {
                    value,
                    explicit: true,
                    origin: format!("--{}", spec.long()),
                },
            );
        }

        let positionals = matches
            .get_many::<String>(POSITIONAL_ID)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        Ok(CliLayer {
            layer,
            positionals,
        })
    }
}

fn arg_for(spec: &OptionSpec) -> Arg {
    let mut arg = Arg::new(spec.name())
        .long(spec.long())
        .help(help_for(spec));
    if let Some(short) = spec.short_form() {
        arg = arg.short(short);
    }

    match spec.kind() {
        OptionKind::Boolean => arg
            .value_name("BOOL")
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .action(ArgAction::Set),
        OptionKind::StringList => arg
            .value_name("NAME")
            .value_delimiter(',')
            .action(ArgAction::Append),
        OptionKind::Enum => arg.value_name("NAME").action(ArgAction::Set),
        OptionKind::Integer => arg.value_name("N").action(ArgAction::Set),
        OptionKind::String => arg.value_name("VALUE").action(ArgAction::Set),
    }
}

fn help_for(spec: &OptionSpec) -> String {
    let mut help = spec.help_text().to_string();
    if spec.kind() == OptionKind::Enum {
        help.push_str(&format!(
            " [default: {}] [possible values: {}]",
            spec.default_value(),
            spec.allowed().join(", ")
        ));
    }
    if let Some(var) = spec.env_var() {
        help.push_str(&format!(" [env: {var}]"));
    }
    help
}

fn value_from_matches(spec: &OptionSpec, matches: &ArgMatches) -> Result<Value> {
    if spec.kind() == OptionKind::StringList {
        let items = matches
            .get_many::<String>(spec.name())
            .into_iter()
            .flatten()
            .map(|item| item.trim())
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
        return Ok(Value::List(items));
    }

    let raw = matches
        .get_one::<String>(spec.name())
        .map(String::as_str)
        .unwrap_or_default();
    spec.parse(raw).map_err(|err| invalid_value(spec, raw, err))
}

fn invalid_value(spec: &OptionSpec, raw: &str, err: CoerceError) -> HashError {
    let token = format!("--{}", spec.long());
    match err.accepted {
        Some(accepted) => HashError::Usage {
            message: format!("invalid value '{raw}' for '{token}'"),
            help: Some(format!("accepted values: {}", accepted.join(", "))),
        },
        None => HashError::usage(format!("invalid value for '{token}': {}", err.message)),
    }
}

fn usage_from_clap(err: clap::Error) -> HashError {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => HashError::InfoRequested(err),
        _ => {
            let rendered = err.render().to_string();
            let mut lines = rendered.lines().map(str::trim).filter(|l| !l.is_empty());
            let message = lines
                .next()
                .map(|line| line.trim_start_matches("error:").trim().to_string())
                .unwrap_or_else(|| "invalid command line".to_string());
            let rest: Vec<&str> = lines.filter(|l| !l.starts_with("For more")).collect();
            HashError::Usage {
                message,
                help: (!rest.is_empty()).then(|| rest.join("\n")),
            }
        }
    }
}
