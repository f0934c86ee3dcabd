// tests/config_load.rs
//
// Config resolution order: explicit file → defaults, then env overrides.
// Tests touching process env are serialized.

use std::path::PathBuf;

use serial_test::serial;

use review_sentiment_analyzer::config::{
    AnalyzerConfig, ENV_CONFIG_PATH, ENV_LEXICON_PATH, ENV_MAX_REVIEWS, ENV_ROW_POLICY,
    ENV_STEP_SIZE, ENV_TOP_N, ENV_WINDOW_SIZE,
};
use review_sentiment_analyzer::RowPolicy;

fn clear_env() {
    for k in [
        ENV_CONFIG_PATH,
        ENV_LEXICON_PATH,
        ENV_WINDOW_SIZE,
        ENV_STEP_SIZE,
        ENV_MAX_REVIEWS,
        ENV_TOP_N,
        ENV_ROW_POLICY,
    ] {
        std::env::remove_var(k);
    }
}

#[test]
#[serial]
fn explicit_toml_file_is_used() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "window_size = 4\nstep_size = 2\nmax_reviews = 100\n").unwrap();
    std::env::set_var(ENV_CONFIG_PATH, &path);

    let cfg = AnalyzerConfig::load_default().expect("load custom toml");
    assert_eq!(cfg.window_size, 4);
    assert_eq!(cfg.step_size, 2);
    assert_eq!(cfg.max_reviews, 100);
    assert_eq!(cfg.top_n, 10);

    clear_env();
}

#[test]
#[serial]
fn env_overrides_file_values() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.json");
    std::fs::write(&path, r#"{"window_size": 4, "top_n": 3}"#).unwrap();
    std::env::set_var(ENV_CONFIG_PATH, &path);
    std::env::set_var(ENV_WINDOW_SIZE, "6");
    std::env::set_var(ENV_ROW_POLICY, "strict");
    std::env::set_var(ENV_LEXICON_PATH, " lexicons/steam.csv ");

    let cfg = AnalyzerConfig::load_default().expect("load with overrides");
    assert_eq!(cfg.window_size, 6);
    assert_eq!(cfg.top_n, 3);
    assert_eq!(cfg.row_policy, RowPolicy::Strict);
    assert_eq!(cfg.lexicon_path, PathBuf::from("lexicons/steam.csv"));

    clear_env();
}

#[test]
#[serial]
fn unparseable_env_value_is_ignored() {
    clear_env();
    std::env::set_var(ENV_MAX_REVIEWS, "lots");

    let mut cfg = AnalyzerConfig::default();
    cfg.apply_env_overrides();
    assert_eq!(cfg.max_reviews, AnalyzerConfig::default().max_reviews);

    clear_env();
}

#[test]
#[serial]
fn zero_step_from_env_fails_validation() {
    clear_env();
    std::env::set_var(ENV_STEP_SIZE, "0");

    assert!(AnalyzerConfig::load_default().is_err());

    clear_env();
}

#[test]
#[serial]
fn missing_config_path_is_an_error() {
    clear_env();
    std::env::set_var(ENV_CONFIG_PATH, "/definitely/not/here.toml");

    let err = AnalyzerConfig::load_default().unwrap_err();
    assert!(err.to_string().contains(ENV_CONFIG_PATH));

    clear_env();
}

#[test]
#[serial]
fn bundled_config_matches_defaults() {
    clear_env();
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/analyzer.toml");
    let cfg = AnalyzerConfig::load_from(&path).expect("bundled config parses");
    assert_eq!(cfg, AnalyzerConfig::default());
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analyzer.yaml");
    std::fs::write(&path, "window_size: 3").unwrap();
    assert!(AnalyzerConfig::load_from(&path).is_err());
}
