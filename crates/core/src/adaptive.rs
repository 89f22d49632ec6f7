use crate::error::ScoringError;
use crate::question::Difficulty;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Thresholds driving difficulty transitions. Transitions are evaluated
/// against the rolling mean of the last `window` combined scores, and only
/// once that many answers have been scored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub window: usize,
    pub advance_threshold: f64,
    pub regress_threshold: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            window: 3,
            advance_threshold: 0.75,
            regress_threshold: 0.4,
        }
    }
}

impl SelectorConfig {
    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.window == 0 {
            return Err(ScoringError::InvalidConfig(
                "selector window must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.regress_threshold)
            || !(0.0..=1.0).contains(&self.advance_threshold)
        {
            return Err(ScoringError::InvalidConfig(
                "selector thresholds must be in [0, 1]".to_string(),
            ));
        }
        if self.regress_threshold >= self.advance_threshold {
            return Err(ScoringError::InvalidConfig(format!(
                "regress threshold {} must be below advance threshold {}",
                self.regress_threshold, self.advance_threshold
            )));
        }
        Ok(())
    }
}

/// Direction of the most recent difficulty decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Advancing,
    Holding,
    Regressing,
}

/// Finite-state difficulty selector threaded through one session. State is
/// explicit and lives only for the session unless exported.
#[derive(Debug, Clone)]
pub struct AdaptiveSelector {
    config: SelectorConfig,
    difficulty: Difficulty,
    trend: Trend,
    recent: VecDeque<f64>,
}

impl AdaptiveSelector {
    pub fn new(config: SelectorConfig, initial: Difficulty) -> Self {
        let capacity = config.window;
        Self {
            config,
            difficulty: initial,
            trend: Trend::Holding,
            recent: VecDeque::with_capacity(capacity),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn trend(&self) -> Trend {
        self.trend
    }

    /// Record a finalized combined score and re-evaluate the difficulty.
    /// Returns the (possibly updated) difficulty for the next question.
    pub fn record(&mut self, combined: f64) -> Difficulty {
        if self.recent.len() == self.config.window {
            self.recent.pop_front();
        }
        self.recent.push_back(combined);

        // The rolling window has to fill before the trend is meaningful.
        if self.recent.len() < self.config.window {
            self.trend = Trend::Holding;
            return self.difficulty;
        }

        let average = self.recent.iter().sum::<f64>() / self.recent.len() as f64;
        if average > self.config.advance_threshold {
            self.trend = Trend::Advancing;
            self.difficulty = self.difficulty.advance();
        } else if average < self.config.regress_threshold {
            self.trend = Trend::Regressing;
            self.difficulty = self.difficulty.regress();
        } else {
            self.trend = Trend::Holding;
        }
        self.difficulty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(initial: Difficulty) -> AdaptiveSelector {
        AdaptiveSelector::new(SelectorConfig::default(), initial)
    }

    #[test]
    fn strong_streak_advances_medium_to_hard() {
        let mut s = selector(Difficulty::Medium);
        s.record(0.9);
        s.record(0.85);
        let result = s.record(0.8);
        assert_eq!(result, Difficulty::Hard);
        assert_eq!(s.trend(), Trend::Advancing);
    }

    #[test]
    fn weak_streak_regresses_medium_to_easy() {
        let mut s = selector(Difficulty::Medium);
        s.record(0.3);
        s.record(0.35);
        let result = s.record(0.2);
        assert_eq!(result, Difficulty::Easy);
        assert_eq!(s.trend(), Trend::Regressing);
    }

    #[test]
    fn middling_scores_hold() {
        let mut s = selector(Difficulty::Medium);
        s.record(0.6);
        s.record(0.5);
        assert_eq!(s.record(0.55), Difficulty::Medium);
        assert_eq!(s.trend(), Trend::Holding);
    }

    #[test]
    fn holds_until_window_is_full() {
        let mut s = selector(Difficulty::Medium);
        assert_eq!(s.record(0.95), Difficulty::Medium);
        assert_eq!(s.trend(), Trend::Holding);
        assert_eq!(s.record(0.95), Difficulty::Medium);
        assert_eq!(s.record(0.95), Difficulty::Hard);
    }

    #[test]
    fn difficulty_is_capped_and_floored() {
        let mut s = selector(Difficulty::Hard);
        for _ in 0..5 {
            s.record(0.95);
        }
        assert_eq!(s.difficulty(), Difficulty::Hard);

        let mut s = selector(Difficulty::Easy);
        for _ in 0..5 {
            s.record(0.1);
        }
        assert_eq!(s.difficulty(), Difficulty::Easy);
    }

    #[test]
    fn window_rolls_old_scores_out() {
        let mut s = selector(Difficulty::Medium);
        s.record(0.1);
        s.record(0.9);
        s.record(0.9);
        // Window is now {0.1, 0.9, 0.9}, avg ~0.63: hold.
        assert_eq!(s.difficulty(), Difficulty::Medium);
        // The 0.1 rolls out; {0.9, 0.9, 0.9} advances.
        assert_eq!(s.record(0.9), Difficulty::Hard);
    }

    #[test]
    fn config_validation() {
        assert!(SelectorConfig::default().validate().is_ok());
        let bad = SelectorConfig {
            window: 0,
            ..SelectorConfig::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(ScoringError::InvalidConfig(_))
        ));
        let inverted = SelectorConfig {
            advance_threshold: 0.3,
            regress_threshold: 0.5,
            ..SelectorConfig::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(ScoringError::InvalidConfig(_))
        ));
    }
}
