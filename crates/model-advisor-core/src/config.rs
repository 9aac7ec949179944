use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};

/// Every tunable constant the recommender uses, in one place.
///
/// Loaded from TOML; any missing key keeps its default, so an empty file is
/// a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub similarity: SimilarityWeights,
    /// Cheaper alternatives must cost at least this fraction of the reference.
    pub cheaper_min_cost_ratio: f64,
    /// Cheaper alternatives must keep at least this fraction of the reference quality.
    pub cheaper_min_quality_ratio: f64,
    /// Default budget headroom for `find_better_performance`, in percent.
    pub max_budget_increase_percent: f64,
    /// Share of monthly tokens assumed to be input; the rest is output.
    pub input_token_share: f64,
    pub default_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityWeights {
    pub context: f64,
    /// Applied per benchmark field present on both models.
    pub benchmark: f64,
    pub tags: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            similarity: SimilarityWeights::default(),
            cheaper_min_cost_ratio: 0.6,
            cheaper_min_quality_ratio: 0.85,
            max_budget_increase_percent: 50.0,
            input_token_share: 0.4,
            default_limit: 5,
        }
    }
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            context: 2.0,
            benchmark: 3.0,
            tags: 2.0,
        }
    }
}

/// Load a scoring config from a TOML file.
pub fn load_config(path: &Path) -> Result<ScoringConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AdvisorError::Io(e.to_string()))?;
    parse_config(&content)
}

/// Parse a scoring config from a TOML string.
pub fn parse_config(toml_str: &str) -> Result<ScoringConfig> {
    let config: ScoringConfig = toml::from_str(toml_str)
        .map_err(|e| AdvisorError::Parse(format!("bad scoring config: {e}")))?;
    if !(0.0..=1.0).contains(&config.input_token_share) {
        return Err(AdvisorError::Parse(format!(
            "input_token_share must be within 0..=1, got {}",
            config.input_token_share
        )));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, ScoringConfig::default());
        assert!((config.input_token_share - 0.4).abs() < 1e-12);
        assert_eq!(config.default_limit, 5);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let toml = r#"
input_token_share = 0.25
default_limit = 3

[similarity]
tags = 5.0
"#;
        let config = parse_config(toml).unwrap();
        assert!((config.input_token_share - 0.25).abs() < 1e-12);
        assert_eq!(config.default_limit, 3);
        assert!((config.similarity.tags - 5.0).abs() < 1e-12);
        assert!((config.similarity.context - 2.0).abs() < 1e-12);
        assert!((config.cheaper_min_cost_ratio - 0.6).abs() < 1e-12);
    }

    #[test]
    fn sample_config_matches_defaults() {
        let config = parse_config(include_str!("../../../data/scoring.toml")).unwrap();
        assert_eq!(config, ScoringConfig::default());
    }

    #[test]
    fn rejects_out_of_range_input_share() {
        let err = parse_config("input_token_share = 1.5").unwrap_err();
        assert!(matches!(err, AdvisorError::Parse(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(parse_config("default_limit = \"five\"").is_err());
    }
}
