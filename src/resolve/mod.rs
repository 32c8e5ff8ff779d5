//! Precedence resolution.
//!
//! Merges the CLI, environment and file layers against the registry
//! defaults, one option at a time:
//!
//! 1. an explicit CLI entry wins (presence, not value, decides)
//! 2. otherwise the environment
//! 3. otherwise the config file
//! 4. otherwise the registry default
//!
//! No I/O happens here and nothing can fail; reader errors have already
//! aborted the run.

use crate::registry::Registry;
use crate::snapshot::{DraftSnapshot, SettingValue, Source};
use crate::sources::{CliLayer, Layer, RawSetting};

#[cfg(test)]
mod tests;

/// Produce one draft snapshot from the three layers.
pub fn resolve(registry: &Registry, cli: CliLayer, env: &Layer, file: &Layer) -> DraftSnapshot {
    let (cli_layer, positionals) = cli.into_parts();
    let mut draft = DraftSnapshot::new(positionals);

    for spec in registry.options() {
        let name = spec.name();
        let setting = match cli_layer.get(name).filter(|raw| raw.explicit) {
            Some(raw) => from_raw(raw, Source::Cli, true),
            None => env
                .get(name)
                .map(|raw| from_raw(raw, Source::Env, false))
                .or_else(|| file.get(name).map(|raw| from_raw(raw, Source::File, false)))
                .unwrap_or_else(|| SettingValue {
                    value: spec.default_value().clone(),
                    source: Source::Default,
                    explicit: false,
                }),
        };

        tracing::trace!(
            option = name,
            source = %setting.source,
            value = %setting.value,
            "resolved"
        );
        draft.set(name, setting);
    }

    draft
}

fn from_raw(raw: &RawSetting, source: Source, explicit: bool) -> SettingValue {
    SettingValue {
        value: raw.value.clone(),
        source,
        explicit,
    }
}
