use proptest::prelude::*;

use super::{ConflictRule, Warning, apply};
use crate::registry::{OptionSpec, Registry, Value, names};
use crate::resolve::resolve;
use crate::snapshot::{DraftSnapshot, OutputMode, Source};
use crate::sources::{CliLayer, Layer, RawSetting};

const MODE_FLAGS: [&str; 4] = [names::BOOL, names::QUIET, names::JSON, names::VERBOSE];

fn layer(source: Source, explicit: bool, entries: &[(&'static str, Value)]) -> Layer {
    let mut layer = Layer::new(source);
    for (name, value) in entries {
        layer.insert(
            *name,
            RawSetting {
                value: value.clone(),
                explicit,
                origin: name.to_string(),
            },
        );
    }
    layer
}

fn draft_with(
    registry: &Registry,
    cli: &[(&'static str, Value)],
    env: &[(&'static str, Value)],
) -> DraftSnapshot {
    resolve(
        registry,
        CliLayer::new(layer(Source::Cli, true, cli), Vec::new()),
        &layer(Source::Env, false, env),
        &Layer::empty(Source::File),
    )
}

fn flags(names: &[&'static str]) -> Vec<(&'static str, Value)> {
    names.iter().map(|n| (*n, Value::Bool(true))).collect()
}

#[test]
fn test_bool_beats_verbose_and_is_silent() {
    let registry = Registry::global().unwrap();
    let mut draft = draft_with(registry, &flags(&[names::VERBOSE, names::BOOL]), &[]);

    let warnings = apply(registry, &mut draft);

    assert_eq!(
        warnings,
        vec![Warning {
            message: "verbose overridden by bool".to_string(),
            suppressed: true,
        }]
    );
    let snapshot = draft.freeze();
    assert_eq!(snapshot.output_mode(), OutputMode::Bool);
    let resolution = snapshot.resolution(names::OUTPUT_MODE).unwrap();
    assert_eq!(resolution.winner, Some(names::BOOL));
    assert_eq!(resolution.overridden, vec![names::VERBOSE]);
}

#[test]
fn test_json_beats_verbose_with_visible_warning() {
    let registry = Registry::global().unwrap();
    let mut draft = draft_with(registry, &flags(&[names::JSON, names::VERBOSE]), &[]);

    let warnings = apply(registry, &mut draft);

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "verbose overridden by json");
    assert!(!warnings[0].suppressed);
    assert_eq!(draft.freeze().output_mode(), OutputMode::Json);
}

#[test]
fn test_all_four_active() {
    let registry = Registry::global().unwrap();
    let mut draft = draft_with(registry, &flags(&MODE_FLAGS), &[]);

    let warnings = apply(registry, &mut draft);

    let messages: Vec<_> = warnings.iter().map(|w| w.message.as_str()).collect();
    assert_eq!(
        messages,
        [
            "quiet overridden by bool",
            "json overridden by bool",
            "verbose overridden by bool",
        ]
    );
    assert!(warnings.iter().all(|w| w.suppressed));
}

#[test]
fn test_single_active_member_has_no_warning() {
    let registry = Registry::global().unwrap();
    let mut draft = draft_with(registry, &flags(&[names::QUIET]), &[]);

    assert!(apply(registry, &mut draft).is_empty());
    assert_eq!(draft.freeze().output_mode(), OutputMode::Quiet);
}

#[test]
fn test_explicit_false_is_not_active() {
    let registry = Registry::global().unwrap();
    let mut draft = draft_with(
        registry,
        &[
            (names::BOOL, Value::Bool(false)),
            (names::VERBOSE, Value::Bool(true)),
        ],
        &[],
    );

    assert!(apply(registry, &mut draft).is_empty());
    assert_eq!(draft.freeze().output_mode(), OutputMode::Verbose);
}

#[test]
fn test_environment_flags_never_warn() {
    let registry = Registry::global().unwrap();
    let mut draft = draft_with(registry, &[], &flags(&[names::JSON, names::QUIET]));

    assert!(apply(registry, &mut draft).is_empty());
    assert_eq!(draft.freeze().output_mode(), OutputMode::Quiet);
}

#[test]
fn test_explicit_member_beats_environment_member() {
    let registry = Registry::global().unwrap();
    let mut draft = draft_with(registry, &flags(&[names::VERBOSE]), &flags(&[names::BOOL]));

    assert!(apply(registry, &mut draft).is_empty());
    assert_eq!(draft.freeze().output_mode(), OutputMode::Verbose);
}

#[test]
fn test_nothing_set_is_normal() {
    let registry = Registry::global().unwrap();
    let mut draft = draft_with(registry, &[], &[]);

    assert!(apply(registry, &mut draft).is_empty());
    let snapshot = draft.freeze();
    assert_eq!(snapshot.output_mode(), OutputMode::Normal);
    let resolution = snapshot.resolution(names::OUTPUT_MODE).unwrap();
    assert_eq!(resolution.winner, None);
}

#[test]
fn test_rule_only_touches_its_members() {
    let registry = Registry::global().unwrap();
    let mut draft = draft_with(
        registry,
        &[
            (names::RECURSIVE, Value::Bool(true)),
            (names::JSON, Value::Bool(true)),
        ],
        &[],
    );

    apply(registry, &mut draft);
    let snapshot = draft.freeze();
    let resolution = snapshot.resolution(names::OUTPUT_MODE).unwrap();
    assert!(!resolution.overridden.contains(&names::RECURSIVE));
    assert!(snapshot.recursive());
}

#[test]
fn test_non_boolean_members_are_active_when_explicit() {
    let registry = Registry::builder()
        .option(OptionSpec::string("format", "text"))
        .option(OptionSpec::boolean("raw").quiet_like())
        .rule(ConflictRule::new("presentation", ["raw", "format"]))
        .build()
        .unwrap();
    let mut draft = draft_with(
        &registry,
        &[
            ("format", Value::Str("text".into())),
            ("raw", Value::Bool(true)),
        ],
        &[],
    );

    let warnings = apply(&registry, &mut draft);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "format overridden by raw");
    assert!(warnings[0].suppressed);
}

proptest! {
    #[test]
    fn prop_one_winner_and_one_warning_per_loser(mask in 0u8..16) {
        let registry = Registry::global().unwrap();
        let active: Vec<&'static str> = MODE_FLAGS
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, name)| *name)
            .collect();

        let mut draft = draft_with(registry, &flags(&active), &[]);
        let warnings = apply(registry, &mut draft);
        let snapshot = draft.freeze();
        let resolution = snapshot.resolution(names::OUTPUT_MODE).unwrap();

        prop_assert_eq!(resolution.winner, active.first().copied());
        prop_assert_eq!(warnings.len(), active.len().saturating_sub(1));
        for (warning, loser) in warnings.iter().zip(active.iter().skip(1)) {
            let starts_with_loser = warning.message.starts_with(loser);
            prop_assert!(starts_with_loser);
            prop_assert!(warning.message.ends_with(active[0]));
        }

        let winner_is_quiet_like =
            matches!(active.first(), Some(&names::BOOL) | Some(&names::QUIET));
        prop_assert!(warnings.iter().all(|w| w.suppressed == winner_is_quiet_like));
    }
}
