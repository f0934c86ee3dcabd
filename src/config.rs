// src/config.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::batch::DEFAULT_MAX_REVIEWS;
use crate::lexicon::RowPolicy;
use crate::window::WindowParams;

// --- env names & defaults ---
pub const ENV_CONFIG_PATH: &str = "REVIEW_SENTIMENT_CONFIG";
pub const ENV_LEXICON_PATH: &str = "REVIEW_SENTIMENT_LEXICON";
pub const ENV_WINDOW_SIZE: &str = "REVIEW_SENTIMENT_WINDOW";
pub const ENV_STEP_SIZE: &str = "REVIEW_SENTIMENT_STEP";
pub const ENV_MAX_REVIEWS: &str = "REVIEW_SENTIMENT_MAX_REVIEWS";
pub const ENV_TOP_N: &str = "REVIEW_SENTIMENT_TOP_N";
pub const ENV_ROW_POLICY: &str = "REVIEW_SENTIMENT_ROW_POLICY";

pub const DEFAULT_CONFIG_TOML: &str = "config/analyzer.toml";
pub const DEFAULT_CONFIG_JSON: &str = "config/analyzer.json";
pub const DEFAULT_LEXICON_PATH: &str = "data/sentiment_lexicon.csv";
pub const DEFAULT_TOP_N: usize = 10;

/// Runtime settings for the analyzer. Every field has a default, so a config
/// file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub lexicon_path: PathBuf,
    pub window_size: usize,
    pub step_size: usize,
    pub max_reviews: usize,
    pub top_n: usize,
    pub row_policy: RowPolicy,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        let window = WindowParams::default();
        Self {
            lexicon_path: PathBuf::from(DEFAULT_LEXICON_PATH),
            window_size: window.window_size(),
            step_size: window.step(),
            max_reviews: DEFAULT_MAX_REVIEWS,
            top_n: DEFAULT_TOP_N,
            row_policy: RowPolicy::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load from an explicit path. TOML or JSON, chosen by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading analyzer config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = match ext.as_str() {
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("parsing JSON config {}", path.display()))?,
            "toml" => toml::from_str(&content)
                .with_context(|| format!("parsing TOML config {}", path.display()))?,
            other => bail!("unsupported config format {other:?} ({})", path.display()),
        };
        Ok(cfg)
    }

    /// Resolve config using env var + fallbacks, then env overrides:
    /// 1) $REVIEW_SENTIMENT_CONFIG
    /// 2) config/analyzer.toml
    /// 3) config/analyzer.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = Self::load_file_or_default()?;
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    fn load_file_or_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        for candidate in [DEFAULT_CONFIG_TOML, DEFAULT_CONFIG_JSON] {
            let p = PathBuf::from(candidate);
            if p.exists() {
                return Self::load_from(&p);
            }
        }
        Ok(Self::default())
    }

    /// Per-field env overrides. Unparseable values are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(p) = std::env::var(ENV_LEXICON_PATH) {
            if !p.trim().is_empty() {
                self.lexicon_path = PathBuf::from(p.trim());
            }
        }
        override_from_env(ENV_WINDOW_SIZE, &mut self.window_size);
        override_from_env(ENV_STEP_SIZE, &mut self.step_size);
        override_from_env(ENV_MAX_REVIEWS, &mut self.max_reviews);
        override_from_env(ENV_TOP_N, &mut self.top_n);
        override_from_env(ENV_ROW_POLICY, &mut self.row_policy);
    }

    pub fn validate(&self) -> Result<()> {
        self.window_params()?;
        Ok(())
    }

    pub fn window_params(&self) -> Result<WindowParams> {
        Ok(WindowParams::new(self.window_size, self.step_size)?)
    }
}

fn override_from_env<T>(name: &str, slot: &mut T)
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Ok(raw) = std::env::var(name) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(v) => *slot = v,
        Err(e) => tracing::warn!(env = name, value = %raw, error = %e, "ignoring invalid env override"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: AnalyzerConfig = toml::from_str("window_size = 5\nrow_policy = \"strict\"").unwrap();
        assert_eq!(cfg.window_size, 5);
        assert_eq!(cfg.step_size, 1);
        assert_eq!(cfg.row_policy, RowPolicy::Strict);
        assert_eq!(cfg.lexicon_path, PathBuf::from(DEFAULT_LEXICON_PATH));
    }

    #[test]
    fn zero_window_fails_validation() {
        let cfg = AnalyzerConfig {
            window_size: 0,
            ..AnalyzerConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn json_config_parses() {
        let cfg: AnalyzerConfig = serde_json::from_str(r#"{"max_reviews": 50, "top_n": 3}"#).unwrap();
        assert_eq!(cfg.max_reviews, 50);
        assert_eq!(cfg.top_n, 3);
        assert_eq!(cfg.window_size, 3);
    }
}
