use crate::error::ScoringError;
use serde::{Deserialize, Serialize};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weight triple for combining the three sub-scores. Must sum to 1.0;
/// validated once at configuration load, never at scoring time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub lexical: f64,
    pub semantic: f64,
    pub delivery: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            lexical: 0.25,
            semantic: 0.40,
            delivery: 0.35,
        }
    }
}

impl Weights {
    pub fn validate(&self) -> Result<(), ScoringError> {
        for (name, value) in [
            ("lexical", self.lexical),
            ("semantic", self.semantic),
            ("delivery", self.delivery),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ScoringError::InvalidConfig(format!(
                    "weight {name} must be in [0, 1], got {value}"
                )));
            }
        }
        let sum = self.lexical + self.semantic + self.delivery;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoringError::InvalidConfig(format!(
                "weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}

/// A reviewer's manual correction. Stored alongside the system score, never
/// in place of it; the original stays as the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewerOverride {
    pub combined: f64,
    pub reviewer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The scored outcome for one answer. `combined` is a pure function of the
/// three components and the configured weights: recomputing with the same
/// inputs is bit-identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub lexical: f64,
    pub semantic: f64,
    pub delivery: f64,
    pub combined: f64,
    /// Set when the semantic score came from fallback after an external
    /// dependency failure; downstream consumers treat it with reduced
    /// confidence.
    pub degraded: bool,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_override: Option<ReviewerOverride>,
}

impl ScoreBreakdown {
    /// Attach a reviewer override. The system-generated scores are retained;
    /// only the override becomes authoritative for reporting.
    pub fn apply_override(&mut self, value: ReviewerOverride) -> Result<(), ScoringError> {
        if !(0.0..=1.0).contains(&value.combined) {
            return Err(ScoringError::InvalidInput(format!(
                "override combined score must be in [0, 1], got {}",
                value.combined
            )));
        }
        self.reviewer_override = Some(value);
        Ok(())
    }

    pub fn is_overridden(&self) -> bool {
        self.reviewer_override.is_some()
    }

    /// The combined score that reporting should use: the reviewer override
    /// when present, otherwise the system-generated value.
    pub fn authoritative(&self) -> f64 {
        self.reviewer_override
            .as_ref()
            .map(|o| o.combined)
            .unwrap_or(self.combined)
    }
}

/// Combines sub-scores into a `ScoreBreakdown` under validated weights.
#[derive(Debug, Clone)]
pub struct ScoreAggregator {
    weights: Weights,
}

impl ScoreAggregator {
    pub fn new(weights: Weights) -> Result<Self, ScoringError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn aggregate(
        &self,
        lexical: f64,
        semantic: f64,
        delivery: f64,
        degraded: bool,
        recommendations: Vec<String>,
    ) -> ScoreBreakdown {
        let lexical = lexical.clamp(0.0, 1.0);
        let semantic = semantic.clamp(0.0, 1.0);
        let delivery = delivery.clamp(0.0, 1.0);
        let combined = (self.weights.lexical * lexical
            + self.weights.semantic * semantic
            + self.weights.delivery * delivery)
            .clamp(0.0, 1.0);
        ScoreBreakdown {
            lexical,
            semantic,
            delivery,
            combined,
            degraded,
            recommendations,
            reviewer_override: None,
        }
    }
}
