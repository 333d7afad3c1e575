//! Flattener configuration, loadable from TOML.
//!
//! ```toml
//! strategy = "combinatorial"
//! undefined_language = "und"
//! fallback_label = "None"
//! first_minted_sequence = 4097
//! regenerate_flow_id = true
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::FlattenError;

/// How programmes with alternatives are expanded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlattenStrategy {
    /// Keep programme ids where possible, bake alternative value sets into
    /// synthesized content/object pairs and label each variant.
    #[default]
    Emission,
    /// Re-number every programme and emit the full product of complementary
    /// choices, referencing alternative value sets as they are.
    Combinatorial,
}

impl FlattenStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlattenStrategy::Emission => "emission",
            FlattenStrategy::Combinatorial => "combinatorial",
        }
    }
}

impl fmt::Display for FlattenStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlattenStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "emission" => Ok(FlattenStrategy::Emission),
            "combinatorial" => Ok(FlattenStrategy::Combinatorial),
            other => Err(format!(
                "unknown strategy {other:?} (expected emission or combinatorial)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlattenConfig {
    pub strategy: FlattenStrategy,
    /// Language written when no content language is defined.
    pub undefined_language: String,
    /// Programme label text used when no group label matches.
    pub fallback_label: String,
    /// Lowest `xw` number minted for programmes, contents and objects.
    pub first_minted_sequence: u64,
    /// Write a fresh flow id when any programme was expanded.
    pub regenerate_flow_id: bool,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            strategy: FlattenStrategy::Emission,
            undefined_language: "und".to_string(),
            fallback_label: "None".to_string(),
            first_minted_sequence: sadm_graph::FIRST_ADM_SEQUENCE,
            regenerate_flow_id: true,
        }
    }
}

impl FlattenConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FlattenError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| FlattenError::ReadConfig {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| FlattenError::ParseConfig {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = FlattenConfig::from_toml_str("").expect("empty config");
        assert_eq!(config, FlattenConfig::default());
        assert_eq!(config.first_minted_sequence, 0x1001);
    }

    #[test]
    fn fields_override_defaults() {
        let config = FlattenConfig::from_toml_str(
            r#"
            strategy = "combinatorial"
            fallback_label = "Unnamed"
            regenerate_flow_id = false
            "#,
        )
        .expect("config");
        assert_eq!(config.strategy, FlattenStrategy::Combinatorial);
        assert_eq!(config.fallback_label, "Unnamed");
        assert_eq!(config.undefined_language, "und");
        assert!(!config.regenerate_flow_id);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FlattenConfig::from_toml_str("strategy = \"emission\"\ncolour = 1").is_err());
        assert!(FlattenConfig::from_toml_str("strategy = \"other\"").is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = FlattenConfig::from_path("/nonexistent/sadm-flatten.toml")
            .expect_err("missing file");
        assert!(matches!(err, FlattenError::ReadConfig { .. }));
    }

    #[test]
    fn strategy_parses_its_own_names() {
        for strategy in [FlattenStrategy::Emission, FlattenStrategy::Combinatorial] {
            assert_eq!(strategy.as_str().parse::<FlattenStrategy>(), Ok(strategy));
        }
    }
}
