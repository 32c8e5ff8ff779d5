use proptest::prelude::*;

use super::resolve;
use crate::registry::{OptionKind, OptionSpec, Registry, Value, names};
use crate::snapshot::Source;
use crate::sources::{CliLayer, Layer, RawSetting};

fn registry() -> &'static Registry {
    Registry::global().unwrap()
}

fn layer(source: Source, explicit: bool, entries: &[(&'static str, Value)]) -> Layer {
    let mut layer = Layer::new(source);
    for (name, value) in entries {
        layer.insert(
            *name,
            RawSetting {
                value: value.clone(),
                explicit,
                origin: format!("test {source}"),
            },
        );
    }
    layer
}

fn cli(entries: &[(&'static str, Value)]) -> CliLayer {
    CliLayer::new(layer(Source::Cli, true, entries), Vec::new())
}

fn choice(s: &str) -> Value {
    Value::Choice(s.to_string())
}

/// A valid value for `spec` that differs from its default.
fn non_default(spec: &OptionSpec) -> Value {
    match spec.kind() {
        OptionKind::Boolean => Value::Bool(true),
        OptionKind::String => Value::Str("elsewhere.toml".into()),
        OptionKind::Enum => spec
            .allowed()
            .iter()
            .find(|allowed| Some(**allowed) != spec.default_value().as_str())
            .map(|allowed| choice(allowed))
            .unwrap(),
        OptionKind::Integer => Value::Int(7),
        OptionKind::StringList => Value::List(vec!["skipme".into()]),
    }
}

#[test]
fn test_cli_beats_env_and_file() {
    let draft = resolve(
        registry(),
        cli(&[(names::ALGORITHM, choice("sha256"))]),
        &layer(Source::Env, false, &[(names::ALGORITHM, choice("md5"))]),
        &layer(Source::File, false, &[(names::ALGORITHM, choice("sha1"))]),
    );

    let setting = draft.get(names::ALGORITHM).unwrap();
    assert_eq!(setting.value, choice("sha256"));
    assert_eq!(setting.source, Source::Cli);
    assert!(setting.explicit);
}

#[test]
fn test_unset_everywhere_uses_default() {
    let draft = resolve(
        registry(),
        cli(&[]),
        &Layer::empty(Source::Env),
        &Layer::empty(Source::File),
    );

    assert_eq!(draft.len(), registry().options().len());
    for spec in registry().options() {
        let setting = draft.get(spec.name()).unwrap();
        assert_eq!(&setting.value, spec.default_value(), "{}", spec.name());
        assert_eq!(setting.source, Source::Default);
        assert!(!setting.explicit);
    }
}

#[test]
fn test_env_beats_file() {
    let draft = resolve(
        registry(),
        cli(&[]),
        &layer(Source::Env, false, &[(names::THREADS, Value::Int(2))]),
        &layer(
            Source::File,
            false,
            &[
                (names::THREADS, Value::Int(8)),
                (names::JSON, Value::Bool(true)),
            ],
        ),
    );

    let threads = draft.get(names::THREADS).unwrap();
    assert_eq!(threads.value, Value::Int(2));
    assert_eq!(threads.source, Source::Env);
    assert!(!threads.explicit);

    let json = draft.get(names::JSON).unwrap();
    assert_eq!(json.source, Source::File);
    assert_eq!(json.value, Value::Bool(true));
}

#[test]
fn test_explicit_default_value_still_wins() {
    for spec in registry().options() {
        let default = spec.default_value().clone();
        let other = non_default(spec);
        let draft = resolve(
            registry(),
            cli(&[(spec.name(), default.clone())]),
            &layer(Source::Env, false, &[(spec.name(), other.clone())]),
            &layer(Source::File, false, &[(spec.name(), other)]),
        );

        let setting = draft.get(spec.name()).unwrap();
        assert_eq!(setting.value, default, "{}", spec.name());
        assert_eq!(setting.source, Source::Cli, "{}", spec.name());
        assert!(setting.explicit);
    }
}

#[test]
fn test_non_explicit_cli_entry_does_not_take_precedence() {
    let cli = CliLayer::new(
        layer(Source::Cli, false, &[(names::VERBOSE, Value::Bool(false))]),
        Vec::new(),
    );
    let draft = resolve(
        registry(),
        cli,
        &layer(Source::Env, false, &[(names::VERBOSE, Value::Bool(true))]),
        &Layer::empty(Source::File),
    );

    let verbose = draft.get(names::VERBOSE).unwrap();
    assert_eq!(verbose.source, Source::Env);
    assert_eq!(verbose.value, Value::Bool(true));
}

#[test]
fn test_positionals_are_carried() {
    let cli = CliLayer::new(Layer::empty(Source::Cli), vec!["b".into(), "a".into()]);
    let snapshot = resolve(
        registry(),
        cli,
        &Layer::empty(Source::Env),
        &Layer::empty(Source::File),
    )
    .freeze();
    assert_eq!(snapshot.positionals(), ["b", "a"]);
}

fn value_for(spec: &OptionSpec) -> BoxedStrategy<Value> {
    match spec.kind() {
        OptionKind::Boolean => any::<bool>().prop_map(Value::Bool).boxed(),
        OptionKind::String => "[a-z/._-]{0,16}".prop_map(Value::Str).boxed(),
        OptionKind::Enum => prop::sample::select(spec.allowed())
            .prop_map(|s| Value::Choice(s.to_string()))
            .boxed(),
        OptionKind::Integer => (0u64..1024).prop_map(Value::Int).boxed(),
        OptionKind::StringList => prop::collection::vec("[a-z.]{1,8}", 0..4)
            .prop_map(Value::List)
            .boxed(),
    }
}

fn option_with_values() -> impl Strategy<Value = (usize, Value, Option<Value>, Option<Value>)> {
    (0..registry().options().len()).prop_flat_map(|index| {
        let spec = &registry().options()[index];
        (
            Just(index),
            value_for(spec),
            prop::option::of(value_for(spec)),
            prop::option::of(value_for(spec)),
        )
    })
}

proptest! {
    #[test]
    fn prop_explicit_cli_value_always_wins(
        (index, cli_value, env_value, file_value) in option_with_values()
    ) {
        let name = registry().options()[index].name();
        let env_entries: Vec<_> = env_value.into_iter().map(|v| (name, v)).collect();
        let file_entries: Vec<_> = file_value.into_iter().map(|v| (name, v)).collect();

        let draft = resolve(
            registry(),
            cli(&[(name, cli_value.clone())]),
            &layer(Source::Env, false, &env_entries),
            &layer(Source::File, false, &file_entries),
        );

        let setting = draft.get(name).unwrap();
        prop_assert_eq!(&setting.value, &cli_value);
        prop_assert_eq!(setting.source, Source::Cli);
        prop_assert!(setting.explicit);
    }

    #[test]
    fn prop_env_wins_over_any_file_content(
        (index, env_value, file_value, _) in option_with_values()
    ) {
        let name = registry().options()[index].name();
        let file_entries: Vec<_> = file_value.into_iter().map(|v| (name, v)).collect();

        let draft = resolve(
            registry(),
            cli(&[]),
            &layer(Source::Env, false, &[(name, env_value.clone())]),
            &layer(Source::File, false, &file_entries),
        );

        let setting = draft.get(name).unwrap();
        prop_assert_eq!(&setting.value, &env_value);
        prop_assert_eq!(setting.source, Source::Env);
        prop_assert!(!setting.explicit);
    }
}
