use std::fs;
use std::path::PathBuf;

use conformant::settings::{ReportFormat, Settings};
use conformant::ConformantError;

fn settings_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("conformant-{}-{}.toml", name, std::process::id()));
    fs::write(&path, contents).expect("write settings file");
    path
}

#[test]
fn defaults_match_the_built_in_settings() {
    let defaults = Settings::default();
    assert_eq!(defaults.seed, 42.0);
    assert_eq!(defaults.sides, 6);
    assert_eq!(defaults.final_square, 25);
    assert_eq!(defaults.max_turns, 1000);
    assert_eq!(defaults.format, ReportFormat::Text);
    assert_eq!(defaults.log, "conformant=info");
}

#[test]
fn file_overrides_defaults() {
    let path = settings_file("override", "sides = 12\nformat = \"json\"\n");
    let settings = Settings::load(Some(path.as_path())).expect("settings load");
    fs::remove_file(&path).ok();
    assert_eq!(settings.sides, 12);
    assert_eq!(settings.format, ReportFormat::Json);
    // untouched keys keep their defaults
    assert_eq!(settings.final_square, 25);
}

#[test]
fn zero_sides_are_rejected() {
    let path = settings_file("zero", "sides = 0\n");
    let result = Settings::load(Some(path.as_path()));
    fs::remove_file(&path).ok();
    assert!(matches!(result, Err(ConformantError::Config(_))));
}

#[test]
fn explicit_file_must_exist() {
    let path = std::env::temp_dir().join("conformant-does-not-exist.toml");
    assert!(matches!(Settings::load(Some(path.as_path())), Err(ConformantError::Config(_))));
}

fn environment(vars: &[(&str, &str)]) -> config::Map<String, String> {
    vars.iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[test]
fn environment_overrides_defaults() {
    let env = environment(&[("CONFORMANT_SEED", "7"), ("CONFORMANT_FINAL_SQUARE", "11")]);
    let settings = Settings::load_with_env(None, Some(env)).expect("settings load");
    assert_eq!(settings.seed, 7.0);
    assert_eq!(settings.final_square, 11);
    assert_eq!(settings.sides, 6);
}

#[test]
fn environment_overrides_the_file() {
    let path = settings_file("layered", "sides = 12\nseed = 3.0\n");
    let env = environment(&[("CONFORMANT_SIDES", "20")]);
    let settings = Settings::load_with_env(Some(path.as_path()), Some(env)).expect("settings load");
    fs::remove_file(&path).ok();
    assert_eq!(settings.sides, 20);
    assert_eq!(settings.seed, 3.0);
}

#[test]
fn variables_without_the_prefix_are_ignored() {
    let env = environment(&[("SEED", "7"), ("OTHER_SIDES", "3")]);
    let settings = Settings::load_with_env(None, Some(env)).expect("settings load");
    assert_eq!(settings.seed, 42.0);
    assert_eq!(settings.sides, 6);
}

#[test]
fn zero_sides_from_the_environment_are_rejected() {
    let env = environment(&[("CONFORMANT_SIDES", "0")]);
    assert!(matches!(
        Settings::load_with_env(None, Some(env)),
        Err(ConformantError::Config(_))
    ));
}

#[test]
fn zero_max_turns_are_rejected() {
    let path = settings_file("no-turns", "max_turns = 0\n");
    let result = Settings::load(Some(path.as_path()));
    fs::remove_file(&path).ok();
    assert!(matches!(result, Err(ConformantError::Config(_))));
}
