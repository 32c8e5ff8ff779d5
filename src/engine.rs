//! The configuration engine: one pass from raw inputs to a frozen snapshot.
//!
//! The engine runs the source readers, locates and reads the config file,
//! merges the layers with the precedence resolver and applies the conflict
//! matrix. Any reader error aborts the pass before resolution, so callers
//! either get a complete [`SettingsSnapshot`] or an error.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::conflict::{self, Warning};
use crate::error::{HashError, Result};
use crate::registry::{Registry, names};
use crate::resolve::resolve;
use crate::snapshot::{SettingsSnapshot, Source};
use crate::sources::{
    CliLayer, CliReader, EnvReader, EnvSource, FileReader, Layer, ProcessEnv, default_config_path,
    load_table,
};

/// Where the config-file layer comes from.
#[derive(Debug, Clone, Default)]
pub enum ConfigInput {
    /// Use the `config` option, falling back to the default location.
    #[default]
    Discover,
    /// Use an already-parsed table; no file is read.
    Table(toml::Table),
    /// Skip the config file entirely.
    Disabled,
}

/// The result of one resolution pass.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub snapshot: SettingsSnapshot,
    /// Conflict warnings in rule order, including suppressed ones
    pub warnings: Vec<Warning>,
    /// The config file that was consulted, if any
    pub config_path: Option<PathBuf>,
}

/// Resolves settings for one invocation.
#[derive(Debug)]
pub struct Engine<'r, E = ProcessEnv> {
    registry: &'r Registry,
    env: E,
    config: ConfigInput,
}

/// Builder for [`Engine`]
#[derive(Debug)]
pub struct EngineBuilder<'r, E = ProcessEnv> {
    registry: &'r Registry,
    env: E,
    config: ConfigInput,
}

impl<'r> Engine<'r, ProcessEnv> {
    /// Creates a new builder reading the process environment
    pub fn builder(registry: &'r Registry) -> EngineBuilder<'r, ProcessEnv> {
        EngineBuilder {
            registry,
            env: ProcessEnv,
            config: ConfigInput::Discover,
        }
    }
}

impl<'r, E: EnvSource> EngineBuilder<'r, E> {
    /// Read environment variables from `env` instead of the process.
    pub fn env<F: EnvSource>(self, env: F) -> EngineBuilder<'r, F> {
        EngineBuilder {
            registry: self.registry,
            env,
            config: self.config,
        }
    }

    pub fn config(mut self, config: ConfigInput) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Engine<'r, E> {
        Engine {
            registry: self.registry,
            env: self.env,
            config: self.config,
        }
    }
}

impl<E: EnvSource> Engine<'_, E> {
    /// Run the full pipeline over `tokens`; the first token is the program
    /// name.
    ///
    /// # Errors
    ///
    /// Returns the first reader error: [`HashError::Usage`] or
    /// [`HashError::InfoRequested`] from the command line,
    /// [`HashError::Config`] from the environment or the config file, or
    /// [`HashError::ConfigRead`]/[`HashError::ConfigParse`] for the file
    /// itself.
    pub fn resolve<I, T>(&self, tokens: I) -> Result<Resolved>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = CliReader::new(self.registry).read(tokens)?;
        let env = EnvReader::new(self.registry).read(&self.env)?;
        let (file, config_path) = self.file_layer(&cli, &env)?;

        let mut draft = resolve(self.registry, cli, &env, &file);
        let warnings = conflict::apply(self.registry, &mut draft);
        let snapshot = draft.freeze();

        tracing::debug!(
            settings = snapshot.len(),
            positionals = snapshot.positionals().len(),
            warnings = warnings.len(),
            "settings resolved"
        );

        Ok(Resolved {
            snapshot,
            warnings,
            config_path,
        })
    }

    fn file_layer(&self, cli: &CliLayer, env: &Layer) -> Result<(Layer, Option<PathBuf>)> {
        let reader = FileReader::new(self.registry);
        match &self.config {
            ConfigInput::Disabled => Ok((Layer::empty(Source::File), None)),
            ConfigInput::Table(table) => Ok((reader.read(table)?, None)),
            ConfigInput::Discover => {
                let Some(path) = config_path(cli, env) else {
                    return Ok((Layer::empty(Source::File), None));
                };
                let layer = match load_table(&path)? {
                    Some(table) => reader.read(&table).map_err(|err| in_file(err, &path))?,
                    None => Layer::empty(Source::File),
                };
                Ok((layer, Some(path)))
            }
        }
    }
}

/// Point a config error at the file it came from.
fn in_file(err: HashError, path: &Path) -> HashError {
    match err {
        HashError::Config { origin, message } => {
            HashError::config(format!("{origin} of {}", path.display()), message)
        }
        other => other,
    }
}

/// The config file named on the command line or in the environment,
/// otherwise the default location.
fn config_path(cli: &CliLayer, env: &Layer) -> Option<PathBuf> {
    cli.layer()
        .get(names::CONFIG)
        .filter(|raw| raw.explicit)
        .or_else(|| env.get(names::CONFIG))
        .and_then(|raw| raw.value.as_str())
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .or_else(default_config_path)
}
