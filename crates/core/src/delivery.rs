use crate::error::ScoringError;
use crate::transcript::Transcript;
use serde::{Deserialize, Serialize};

/// Raw delivery measurements derived from a transcript. Never stored on its
/// own; recomputed whenever the transcript changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliveryMetrics {
    pub filler_rate: f64,
    pub avg_pause_secs: f64,
    pub words_per_minute: f64,
}

/// Linear-clamp scoring band. Values inside `[ideal_lo, ideal_hi]` score
/// 1.0, degrading linearly to 0.0 at `outer_lo` / `outer_hi`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub outer_lo: f64,
    pub ideal_lo: f64,
    pub ideal_hi: f64,
    pub outer_hi: f64,
}

impl Band {
    pub fn validate(&self, name: &str) -> Result<(), ScoringError> {
        let ordered = self.outer_lo <= self.ideal_lo
            && self.ideal_lo <= self.ideal_hi
            && self.ideal_hi <= self.outer_hi;
        if !ordered {
            return Err(ScoringError::InvalidConfig(format!(
                "band {name} bounds must satisfy outer_lo <= ideal_lo <= ideal_hi <= outer_hi"
            )));
        }
        Ok(())
    }

    pub fn score(&self, value: f64) -> f64 {
        if value >= self.ideal_lo && value <= self.ideal_hi {
            return 1.0;
        }
        if value <= self.outer_lo || value >= self.outer_hi {
            return 0.0;
        }
        if value < self.ideal_lo {
            (value - self.outer_lo) / (self.ideal_lo - self.outer_lo)
        } else {
            (self.outer_hi - value) / (self.outer_hi - self.ideal_hi)
        }
    }
}

/// Target ranges for delivery metrics. The defaults follow conventional
/// interview-coaching guidance: 110-160 wpm, minimal fillers, pauses under
/// a second on average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryTargets {
    /// Inter-token gaps longer than this count as pauses.
    pub pause_threshold_secs: f64,
    pub speaking_rate: Band,
    pub filler_rate: Band,
    pub pause: Band,
}

impl Default for DeliveryTargets {
    fn default() -> Self {
        Self {
            pause_threshold_secs: 0.5,
            speaking_rate: Band {
                outer_lo: 60.0,
                ideal_lo: 110.0,
                ideal_hi: 160.0,
                outer_hi: 220.0,
            },
            filler_rate: Band {
                outer_lo: 0.0,
                ideal_lo: 0.0,
                ideal_hi: 0.03,
                outer_hi: 0.15,
            },
            pause: Band {
                outer_lo: 0.0,
                ideal_lo: 0.0,
                ideal_hi: 0.8,
                outer_hi: 3.0,
            },
        }
    }
}

impl DeliveryTargets {
    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.pause_threshold_secs <= 0.0 {
            return Err(ScoringError::InvalidConfig(
                "pause_threshold_secs must be positive".to_string(),
            ));
        }
        self.speaking_rate.validate("speaking_rate")?;
        self.filler_rate.validate("filler_rate")?;
        self.pause.validate("pause")?;
        Ok(())
    }
}

/// Compute raw delivery metrics from a timestamped transcript.
/// Deterministic given the same transcript and targets.
pub fn analyze(
    transcript: &Transcript,
    targets: &DeliveryTargets,
) -> Result<DeliveryMetrics, ScoringError> {
    if transcript.is_empty() {
        return Err(ScoringError::InvalidInput(
            "cannot analyze delivery of an empty transcript".to_string(),
        ));
    }
    let duration = transcript.duration_secs();
    if duration <= 0.0 {
        return Err(ScoringError::InvalidInput(
            "transcript duration must be positive".to_string(),
        ));
    }

    let total = transcript.len() as f64;
    let filler_rate = transcript.filler_count() as f64 / total;

    let pauses: Vec<f64> = transcript
        .tokens()
        .windows(2)
        .map(|pair| pair[1].start_secs - pair[0].end_secs)
        .filter(|gap| *gap > targets.pause_threshold_secs)
        .collect();
    let avg_pause_secs = if pauses.is_empty() {
        0.0
    } else {
        pauses.iter().sum::<f64>() / pauses.len() as f64
    };

    let words_per_minute = total / (duration / 60.0);

    Ok(DeliveryMetrics {
        filler_rate,
        avg_pause_secs,
        words_per_minute,
    })
}

/// Normalize each metric against its band and average the three into the
/// delivery sub-score, in [0, 1].
pub fn score(metrics: &DeliveryMetrics, targets: &DeliveryTargets) -> f64 {
    let rate = targets.speaking_rate.score(metrics.words_per_minute);
    let filler = targets.filler_rate.score(metrics.filler_rate);
    let pause = targets.pause.score(metrics.avg_pause_secs);
    (rate + filler + pause) / 3.0
}
