//! Config-file source.
//!
//! [`load_table`] reads and parses the TOML file; [`FileReader`] turns the
//! parsed table into a [`Layer`]. Keys are option names, with `-` and `_`
//! treated alike.

use std::path::{Path, PathBuf};

use super::{Layer, RawSetting};
use crate::error::{HashError, Result};
use crate::registry::{OptionKind, OptionSpec, Registry, Value, split_list};
use crate::snapshot::Source;

/// The default config file location, e.g. `~/.config/hashcmp/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hashcmp").join("config.toml"))
}

/// Loads and parses a config file.
///
/// A missing file is not an error and yields `None`.
///
/// # Errors
///
/// Returns [`HashError::ConfigRead`] if the file exists but cannot be read,
/// or [`HashError::ConfigParse`] if it is not valid TOML.
pub fn load_table(path: &Path) -> Result<Option<toml::Table>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "config file not found");
            return Ok(None);
        }
        Err(source) => {
            return Err(HashError::ConfigRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    toml::from_str::<toml::Table>(&content)
        .map(Some)
        .map_err(|source| HashError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
}

/// Converts a parsed config table into a layer.
#[derive(Debug, Clone, Copy)]
pub struct FileReader<'r> {
    registry: &'r Registry,
}

impl<'r> FileReader<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Build the file layer from `table`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Config`] naming the key for unknown keys, keys
    /// that cannot be set from a file, and values of the wrong type.
    pub fn read(&self, table: &toml::Table) -> Result<Layer> {
        let mut layer = Layer::new(Source::File);

        for (key, raw) in table {
            let origin = format!("config key '{key}'");
            let spec = self
                .registry
                .by_file_key(key)
                .ok_or_else(|| HashError::config(&origin, format!("unknown option '{key}'")))?;
            if !spec.is_file_settable() {
                return Err(HashError::config(
                    &origin,
                    format!("'{}' cannot be set from the config file", spec.name()),
                ));
            }

            let value = coerce(spec, raw).map_err(|message| HashError::config(&origin, message))?;
            layer.insert(
                spec.name(),
                RawSetting {
                    value,
                    explicit: false,
                    origin: key.clone(),
                },
            );
        }

        Ok(layer)
    }
}

fn coerce(spec: &OptionSpec, raw: &toml::Value) -> std::result::Result<Value, String> {
    let mismatch = || {
        format!(
            "expected {}, found {}",
            spec.kind().describe(),
            raw.type_str()
        )
    };

    match (spec.kind(), raw) {
        (OptionKind::Boolean, toml::Value::Boolean(b)) => Ok(Value::Bool(*b)),
        (OptionKind::String, toml::Value::String(s)) => Ok(Value::Str(s.clone())),
        (OptionKind::Enum, toml::Value::String(s)) => {
            spec.parse_choice(s).map_err(|err| err.to_string())
        }
        (OptionKind::Integer, toml::Value::Integer(n)) => u64::try_from(*n)
            .map(Value::Int)
            .map_err(|_| format!("expected {}, found {n}", spec.kind().describe())),
        (OptionKind::StringList, toml::Value::String(s)) => Ok(Value::List(split_list(s))),
        (OptionKind::StringList, toml::Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(mismatch))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Value::List),
        _ => Err(mismatch()),
    }
}
