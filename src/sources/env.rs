//! Environment source.

use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;

use super::{Layer, RawSetting};
use crate::error::{HashError, Result};
use crate::registry::Registry;
use crate::snapshot::Source;

/// Read access to environment variables.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<OsString>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<OsString> {
        std::env::var_os(name)
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<OsString> {
        self.get(name).map(OsString::from)
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<OsString> {
        self.get(name).map(OsString::from)
    }
}

/// Reads each option's declared variable, once.
#[derive(Debug, Clone, Copy)]
pub struct EnvReader<'r> {
    registry: &'r Registry,
}

impl<'r> EnvReader<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Build the environment layer.
    ///
    /// Unset and blank variables are absent from the result.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Config`] naming the variable when its value is
    /// not UTF-8 or cannot be coerced to the option's kind.
    pub fn read(&self, env: &impl EnvSource) -> Result<Layer> {
        let mut layer = Layer::new(Source::Env);

        for spec in self.registry.options() {
            let Some(var) = spec.env_var() else {
                continue;
            };
            let Some(raw) = env.var(var) else {
                continue;
            };
            let origin = format!("environment variable {var}");
            let raw = raw
                .into_string()
                .map_err(|_| HashError::config(&origin, "value is not valid UTF-8"))?;
            if raw.trim().is_empty() {
                tracing::debug!(var, "ignoring blank environment variable");
                continue;
            }

            let value = spec
                .parse(&raw)
                .map_err(|err| HashError::config(&origin, err.to_string()))?;
            layer.insert(
                spec.name(),
                RawSetting {
                    value,
                    explicit: false,
                    origin: var.to_string(),
                },
            );
        }

        Ok(layer)
    }
}
