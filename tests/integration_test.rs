use std::collections::HashMap;

use assert_fs::TempDir;
use assert_fs::prelude::*;
use hashcmp::algorithm::Algorithm;
use hashcmp::app::{Outcome, run};
use hashcmp::classify::{ArgumentKind, Classifier};
use hashcmp::commands::Report;
use hashcmp::engine::{ConfigInput, Engine};
use hashcmp::error::{HashError, Result};
use hashcmp::registry::{Registry, names};
use hashcmp::snapshot::{OutputMode, Source};
use predicates::prelude::*;

const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

/// Helper to run hashcmp through the library with a fake environment.
fn run_with(
    args: &[&str],
    env: &[(&str, &str)],
    config: ConfigInput,
) -> (Result<Outcome>, String) {
    let env: HashMap<String, String> = env
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let engine = Engine::builder(Registry::global().unwrap())
        .env(env)
        .config(config)
        .build();

    let mut out = Vec::new();
    let tokens = std::iter::once("hashcmp").chain(args.iter().copied());
    let result = run(&engine, tokens, &mut out);
    (result, String::from_utf8(out).unwrap())
}

fn hello_file(temp: &TempDir) -> String {
    let file = temp.child("hello.txt");
    file.write_str("hello world").unwrap();
    file.path().to_string_lossy().into_owned()
}

#[test]
fn test_cli_algorithm_beats_env_and_file() {
    let temp = TempDir::new().unwrap();
    let file = hello_file(&temp);
    let config: toml::Table = toml::from_str(r#"algorithm = "sha1""#).unwrap();

    let (result, out) = run_with(
        &["--algorithm=sha256", &file],
        &[("HASHCMP_ALGORITHM", "md5")],
        ConfigInput::Table(config),
    );
    let outcome = result.unwrap();

    let setting = outcome.resolved.snapshot.get(names::ALGORITHM).unwrap();
    assert_eq!(outcome.resolved.snapshot.algorithm(), Algorithm::Sha256);
    assert_eq!(setting.source, Source::Cli);
    assert!(predicate::str::starts_with(HELLO_SHA256).eval(&out));
}

#[test]
fn test_unset_verbose_comes_from_default() {
    let temp = TempDir::new().unwrap();
    let file = hello_file(&temp);

    let (result, _) = run_with(&[&file], &[], ConfigInput::Disabled);
    let outcome = result.unwrap();

    let verbose = outcome.resolved.snapshot.get(names::VERBOSE).unwrap();
    assert_eq!(verbose.value.as_bool(), Some(false));
    assert_eq!(verbose.source, Source::Default);
    assert!(!verbose.explicit);
}

#[test]
fn test_bool_beats_verbose_with_one_silent_warning() {
    let temp = TempDir::new().unwrap();
    let file = hello_file(&temp);

    let (result, out) = run_with(
        &["--verbose", "--bool", "-a", "sha256", &file, HELLO_SHA256],
        &[],
        ConfigInput::Disabled,
    );
    let outcome = result.unwrap();

    assert_eq!(outcome.resolved.snapshot.output_mode(), OutputMode::Bool);
    assert_eq!(outcome.resolved.warnings.len(), 1);
    assert_eq!(
        outcome.resolved.warnings[0].message,
        "verbose overridden by bool"
    );
    assert!(outcome.resolved.warnings[0].suppressed);
    assert_eq!(out, "true\n");
    assert_eq!(outcome.status(), 0);
}

#[test]
fn test_128_hex_argument_needs_disambiguation() {
    let digest = "0123456789abcdef".repeat(8);
    let classification = Classifier::new().classify(&digest);
    match &classification.kind {
        ArgumentKind::Hash(hash) => {
            assert_eq!(hash.candidates, vec![Algorithm::Sha512, Algorithm::Blake2b]);
        }
        other => panic!("unexpected kind: {other:?}"),
    }

    let temp = TempDir::new().unwrap();
    let file = hello_file(&temp);
    let (result, out) = run_with(&[&file, &digest], &[], ConfigInput::Disabled);
    assert!(matches!(result, Err(HashError::AmbiguousHash { .. })));
    assert!(out.is_empty());

    let (result, _) = run_with(
        &["-a", "blake2b", &file, &digest],
        &[],
        ConfigInput::Disabled,
    );
    assert_eq!(result.unwrap().status(), 1);
}

#[test]
fn test_hex_named_file_is_hashed_not_compared() {
    let temp = TempDir::new().unwrap();
    let named = temp.child(HELLO_SHA256);
    named.write_str("hello world").unwrap();
    let path = named.path().to_string_lossy().into_owned();

    assert!(matches!(
        Classifier::new().classify(&path).kind,
        ArgumentKind::File(_)
    ));

    let (result, out) = run_with(&[&path], &[], ConfigInput::Disabled);
    assert!(matches!(result.unwrap().report, Report::Hash { .. }));
    assert!(predicate::str::contains(HELLO_SHA256).count(2).eval(&out));
}

#[test]
fn test_json_mode_and_visible_warning() {
    let temp = TempDir::new().unwrap();
    let file = hello_file(&temp);
    let upper = HELLO_SHA256.to_uppercase();

    let (result, out) = run_with(
        &["--json", "-v", "-a", "sha256", &file, &upper],
        &[],
        ConfigInput::Disabled,
    );
    let outcome = result.unwrap();
    assert!(!outcome.resolved.warnings[0].suppressed);

    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["mode"], "validate");
    assert_eq!(json["algorithm"], "sha256");
    assert_eq!(json["matched"], true);
}

#[test]
fn test_env_output_mode_without_warnings() {
    let temp = TempDir::new().unwrap();
    let left = temp.child("left");
    left.write_str("one").unwrap();
    let right = temp.child("right");
    right.write_str("two").unwrap();
    let (left, right) = (
        left.path().to_string_lossy().into_owned(),
        right.path().to_string_lossy().into_owned(),
    );

    let (result, out) = run_with(
        &[&left, &right],
        &[("HASHCMP_QUIET", "1"), ("HASHCMP_JSON", "true")],
        ConfigInput::Disabled,
    );
    let outcome = result.unwrap();
    assert!(outcome.resolved.warnings.is_empty());
    assert_eq!(outcome.resolved.snapshot.output_mode(), OutputMode::Quiet);
    assert_eq!(outcome.status(), 1);
    assert!(out.is_empty());
}

#[test]
fn test_recursive_hashing_with_config_file_exclude() {
    let temp = TempDir::new().unwrap();
    temp.child("tree/a.txt").write_str("a").unwrap();
    temp.child("tree/skip/b.txt").write_str("b").unwrap();
    let config = temp.child("hashcmp.toml");
    config
        .write_str("recursive = true\nexclude = [\"skip\"]\nalgorithm = \"md5\"\n")
        .unwrap();

    let tree = temp.child("tree").path().to_string_lossy().into_owned();
    let config_arg = format!("--config={}", config.path().display());
    let (result, out) = run_with(&[&config_arg, &tree], &[], ConfigInput::Discover);
    let outcome = result.unwrap();

    match outcome.report {
        Report::Hash { files } => {
            assert_eq!(files.len(), 1);
            assert_eq!(files[0].algorithm, Algorithm::Md5);
        }
        other => panic!("unexpected report: {other:?}"),
    }
    assert!(predicate::str::contains("a.txt").eval(&out));
    assert!(predicate::str::contains("b.txt").not().eval(&out));
}

#[test]
fn test_errors_stop_the_run() {
    let (result, _) = run_with(&[], &[], ConfigInput::Disabled);
    assert!(matches!(result, Err(HashError::NoInputs)));

    let (result, _) = run_with(&["--algorithm=whirlpool", "x"], &[], ConfigInput::Disabled);
    match result {
        Err(HashError::Usage { message, help }) => {
            assert!(message.contains("whirlpool"));
            assert!(help.unwrap().contains("sha256"));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let (result, _) = run_with(
        &["x"],
        &[("HASHCMP_VERBOSE", "maybe")],
        ConfigInput::Disabled,
    );
    assert!(matches!(result, Err(HashError::Config { .. })));

    let (result, _) = run_with(&["--help"], &[], ConfigInput::Disabled);
    assert!(matches!(result, Err(HashError::InfoRequested(_))));
}

#[test]
fn test_threads_setting_uses_dedicated_pool() {
    let temp = TempDir::new().unwrap();
    let file = hello_file(&temp);

    let (result, out) = run_with(&["--threads", "2", &file], &[], ConfigInput::Disabled);
    assert_eq!(result.unwrap().resolved.snapshot.threads(), 2);
    assert!(out.starts_with(HELLO_SHA256));
}
