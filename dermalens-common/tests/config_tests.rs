//! Configuration resolution and graceful degradation
//!
//! Covers:
//! - Missing config files never fail startup
//! - Priority order: explicit path, environment variable, platform default
//! - Unparseable files are reported instead of silently ignored
//!
//! Tests that manipulate DERMALENS_CONFIG are marked with #[serial] so they
//! do not race each other.

use dermalens_common::config::{resolve_config_path, InsightsConfig, CONFIG_ENV_VAR};
use dermalens_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(content.as_bytes()).expect("write temp config");
    file
}

#[test]
#[serial]
fn test_explicit_path_wins_over_environment() {
    let explicit = write_config("[recommendations]\ntop_per_category = 5\n");
    let from_env = write_config("[recommendations]\ntop_per_category = 9\n");
    env::set_var(CONFIG_ENV_VAR, from_env.path());

    let config = InsightsConfig::load(Some(explicit.path())).unwrap();
    assert_eq!(config.recommendations.top_per_category, 5);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_environment_variable_used_without_explicit_path() {
    let from_env = write_config("[logging]\nlevel = \"debug\"\n");
    env::set_var(CONFIG_ENV_VAR, from_env.path());

    assert_eq!(resolve_config_path(None), Some(from_env.path().to_path_buf()));
    let config = InsightsConfig::load(None).unwrap();
    assert_eq!(config.logging.level, "debug");

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_explicit_file_falls_back_to_defaults() {
    env::remove_var(CONFIG_ENV_VAR);
    let missing = PathBuf::from("/definitely/not/here/dermalens.toml");

    let config = InsightsConfig::load(Some(&missing)).unwrap();
    assert_eq!(config, InsightsConfig::default());
}

#[test]
#[serial]
fn test_blank_environment_variable_is_ignored() {
    env::set_var(CONFIG_ENV_VAR, "   ");
    let resolved = resolve_config_path(None);
    assert_ne!(resolved, Some(PathBuf::from("   ")));
    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_unparseable_file_is_config_error() {
    let broken = write_config("[explanations\nttl_days = ");
    let result = InsightsConfig::load(Some(broken.path()));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_full_file_round_trip() {
    let file = write_config(
        r#"
[logging]
level = "warn"
file = "/tmp/dermalens.log"

[explanations]
ttl_days = 14
generation_timeout_ms = 2500

[recommendations]
top_per_category = 2
"#,
    );
    let config = InsightsConfig::from_file(file.path()).unwrap();
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/dermalens.log")));
    assert_eq!(config.explanations.ttl_days, 14);
    assert_eq!(config.explanations.generation_timeout_ms, 2500);
    assert_eq!(config.recommendations.top_per_category, 2);
}
