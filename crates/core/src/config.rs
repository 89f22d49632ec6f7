//! Scoring configuration.
//!
//! Everything the product left as a tunable lives here: weights, delivery
//! bands, selector thresholds, and the keyword lists behind feedback rules.
//! A config is validated once when loaded; invalid values are fatal at that
//! point and never surface during scoring.

use crate::adaptive::SelectorConfig;
use crate::delivery::DeliveryTargets;
use crate::error::ScoringError;
use crate::lexical::KeywordMatching;
use crate::score::Weights;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Keyword lists and constants behind the recommendation rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub star_keywords: Vec<String>,
    pub example_keywords: Vec<String>,
    pub technical_keywords: Vec<String>,
    /// Nominal speaking rate used for the spoken-time estimate.
    pub nominal_wpm: f64,
    pub max_recommendations: usize,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            star_keywords: to_strings(&[
                "situation",
                "task",
                "action",
                "result",
                "challenge",
                "goal",
                "achieved",
                "impact",
                "outcome",
                "delivered",
                "responsibility",
                "objective",
            ]),
            example_keywords: to_strings(&[
                "example", "case", "project", "worked on", "built", "created", "implemented",
                "developed", "designed", "led", "managed",
            ]),
            technical_keywords: to_strings(&[
                "api",
                "algorithm",
                "database",
                "system",
                "architecture",
                "performance",
                "debug",
                "deploy",
                "scale",
                "cache",
                "index",
                "query",
                "framework",
                "pattern",
                "microservice",
                "cloud",
                "container",
                "orchestration",
                "pipeline",
                "testing",
                "refactor",
            ]),
            nominal_wpm: 140.0,
            max_recommendations: 6,
        }
    }
}

impl FeedbackConfig {
    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.nominal_wpm <= 0.0 {
            return Err(ScoringError::InvalidConfig(
                "nominal_wpm must be positive".to_string(),
            ));
        }
        if self.max_recommendations == 0 {
            return Err(ScoringError::InvalidConfig(
                "max_recommendations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// The full scoring configuration for one deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: Weights,
    pub delivery: DeliveryTargets,
    pub selector: SelectorConfig,
    pub keyword_matching: KeywordMatching,
    /// Answers shorter than this many tokens get floor scores and a
    /// "too brief" recommendation instead of full analysis.
    pub min_answer_words: usize,
    pub feedback: FeedbackConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            delivery: DeliveryTargets::default(),
            selector: SelectorConfig::default(),
            keyword_matching: KeywordMatching::default(),
            min_answer_words: 60,
            feedback: FeedbackConfig::default(),
        }
    }
}

impl ScoringConfig {
    /// Load a configuration document and validate it. Any violation is
    /// `InvalidConfig` and should abort startup.
    pub fn load(path: &Path) -> Result<Self, ScoringError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ScoringError::InvalidConfig(format!(
                "failed to read scoring config {}: {e}",
                path.display()
            ))
        })?;
        let config: ScoringConfig = serde_json::from_str(&raw).map_err(|e| {
            ScoringError::InvalidConfig(format!(
                "failed to parse scoring config {}: {e}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        self.weights.validate()?;
        self.delivery.validate()?;
        self.selector.validate()?;
        self.feedback.validate()?;
        if let KeywordMatching::Fuzzy { threshold } = self.keyword_matching {
            if threshold <= 0 {
                return Err(ScoringError::InvalidConfig(
                    "fuzzy matching threshold must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        ScoringConfig::default().validate().unwrap();
    }

    #[test]
    fn bad_weights_fail_at_load() {
        let mut config = ScoringConfig::default();
        config.weights = Weights {
            lexical: 0.5,
            semantic: 0.5,
            delivery: 0.5,
        };
        assert!(matches!(
            config.validate(),
            Err(ScoringError::InvalidConfig(_))
        ));
    }

    #[test]
    fn loads_partial_document_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{
                "weights": { "lexical": 0.2, "semantic": 0.5, "delivery": 0.3 },
                "min_answer_words": 40,
                "keyword_matching": { "mode": "fuzzy", "threshold": 70 }
            }"#,
        )
        .unwrap();
        let config = ScoringConfig::load(file.path()).unwrap();
        assert_eq!(config.min_answer_words, 40);
        assert_eq!(config.weights.semantic, 0.5);
        assert_eq!(
            config.keyword_matching,
            KeywordMatching::Fuzzy { threshold: 70 }
        );
        // Untouched sections keep their defaults.
        assert_eq!(config.selector, SelectorConfig::default());
    }

    #[test]
    fn malformed_document_fails_with_invalid_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(matches!(
            ScoringConfig::load(file.path()),
            Err(ScoringError::InvalidConfig(_))
        ));
    }
}
