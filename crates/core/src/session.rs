use crate::adaptive::{AdaptiveSelector, Trend};
use crate::error::ScoringError;
use crate::question::{Difficulty, Question};
use crate::score::{ReviewerOverride, ScoreBreakdown};
use crate::transcript::Transcript;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One finalized answer: the question as asked, the transcript as recorded,
/// and the breakdown as scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question: Question,
    pub transcript: Transcript,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Open,
    Paused,
    Closed,
}

/// A scored dimension, used for strongest/weakest reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Lexical,
    Semantic,
    Delivery,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Lexical => write!(f, "lexical"),
            Dimension::Semantic => write!(f, "semantic"),
            Dimension::Delivery => write!(f, "delivery"),
        }
    }
}

/// Summary statistics over a session's scored answers. Uses authoritative
/// combined scores (reviewer overrides win for reporting).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub answered: usize,
    pub average_combined: f64,
    pub highest_combined: f64,
    pub lowest_combined: f64,
    pub average_lexical: f64,
    pub average_semantic: f64,
    pub average_delivery: f64,
    pub strongest_dimension: Dimension,
    pub weakest_dimension: Dimension,
}

/// Read-only view of a session handed to the export collaborator. Export
/// never mutates session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub role: String,
    pub status: SessionStatus,
    pub difficulty: Difficulty,
    pub trend: Trend,
    pub answers: Vec<AnswerRecord>,
    pub stats: Option<SessionStats>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

/// Mutable state for one interview session: the ordered answer history plus
/// the difficulty selector. Sessions are independent; nothing here is shared
/// across candidates.
#[derive(Debug)]
pub struct SessionState {
    id: String,
    role: String,
    status: SessionStatus,
    answers: Vec<AnswerRecord>,
    selector: AdaptiveSelector,
}

impl SessionState {
    pub fn new(id: impl Into<String>, role: impl Into<String>, selector: AdaptiveSelector) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            status: SessionStatus::Open,
            answers: Vec::new(),
            selector,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn difficulty(&self) -> Difficulty {
        self.selector.difficulty()
    }

    pub fn trend(&self) -> Trend {
        self.selector.trend()
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// Pausing stops submission of further answers; it does not interrupt
    /// anything already in flight.
    pub fn pause(&mut self) {
        if self.status == SessionStatus::Open {
            self.status = SessionStatus::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.status == SessionStatus::Paused {
            self.status = SessionStatus::Open;
        }
    }

    pub fn close(&mut self) {
        self.status = SessionStatus::Closed;
    }

    /// Record a finalized answer and feed its authoritative combined score
    /// into the difficulty selector. Returns the difficulty for the next
    /// question.
    pub fn record_answer(
        &mut self,
        question: Question,
        transcript: Transcript,
        breakdown: ScoreBreakdown,
    ) -> Result<Difficulty, ScoringError> {
        if self.status != SessionStatus::Open {
            return Err(ScoringError::InvalidInput(format!(
                "session {} is not open for new answers",
                self.id
            )));
        }
        let combined = breakdown.authoritative();
        self.answers.push(AnswerRecord {
            question,
            transcript,
            breakdown,
        });
        Ok(self.selector.record(combined))
    }

    /// Apply a reviewer override to a previously scored answer. The original
    /// breakdown stays in place as the audit trail; the selector is not
    /// rewound for past decisions.
    pub fn override_answer(
        &mut self,
        index: usize,
        value: ReviewerOverride,
    ) -> Result<(), ScoringError> {
        let record = self.answers.get_mut(index).ok_or_else(|| {
            ScoringError::InvalidInput(format!("no answer at index {index} to override"))
        })?;
        record.breakdown.apply_override(value)
    }

    pub fn stats(&self) -> Option<SessionStats> {
        if self.answers.is_empty() {
            return None;
        }
        let n = self.answers.len() as f64;
        let combined: Vec<f64> = self
            .answers
            .iter()
            .map(|a| a.breakdown.authoritative())
            .collect();
        let average_lexical = self.answers.iter().map(|a| a.breakdown.lexical).sum::<f64>() / n;
        let average_semantic = self.answers.iter().map(|a| a.breakdown.semantic).sum::<f64>() / n;
        let average_delivery = self.answers.iter().map(|a| a.breakdown.delivery).sum::<f64>() / n;

        let dims = [
            (Dimension::Lexical, average_lexical),
            (Dimension::Semantic, average_semantic),
            (Dimension::Delivery, average_delivery),
        ];
        let strongest = dims
            .iter()
            .fold(dims[0], |best, d| if d.1 > best.1 { *d } else { best })
            .0;
        let weakest = dims
            .iter()
            .fold(dims[0], |worst, d| if d.1 < worst.1 { *d } else { worst })
            .0;

        Some(SessionStats {
            answered: self.answers.len(),
            average_combined: combined.iter().sum::<f64>() / n,
            highest_combined: combined.iter().fold(f64::MIN, |a, b| a.max(*b)),
            lowest_combined: combined.iter().fold(f64::MAX, |a, b| a.min(*b)),
            average_lexical,
            average_semantic,
            average_delivery,
            strongest_dimension: strongest,
            weakest_dimension: weakest,
        })
    }

    /// Recurring strengths and weaknesses across the session, referencing
    /// 1-based question numbers.
    pub fn strengths_and_weaknesses(&self) -> (Vec<String>, Vec<String>) {
        let mut strengths = Vec::new();
        let mut weaknesses = Vec::new();

        let numbers = |pred: &dyn Fn(&AnswerRecord) -> bool| -> Vec<String> {
            self.answers
                .iter()
                .enumerate()
                .filter(|(_, a)| pred(a))
                .map(|(i, _)| (i + 1).to_string())
                .collect()
        };

        let off_topic = numbers(&|a| a.breakdown.semantic < 0.7);
        if !off_topic.is_empty() {
            weaknesses.push(format!(
                "Stay on topic more closely (questions {})",
                off_topic.join(", ")
            ));
        }
        let thin_coverage = numbers(&|a| a.breakdown.lexical < 0.5);
        if !thin_coverage.is_empty() {
            weaknesses.push(format!(
                "Cover more of the expected key points (questions {})",
                thin_coverage.join(", ")
            ));
        }
        let rough_delivery = numbers(&|a| a.breakdown.delivery < 0.5);
        if !rough_delivery.is_empty() {
            weaknesses.push(format!(
                "Reduce fillers and pauses for smoother delivery (questions {})",
                rough_delivery.join(", ")
            ));
        }

        let high_scores = numbers(&|a| a.breakdown.authoritative() >= 0.85);
        if !high_scores.is_empty() {
            strengths.push(format!(
                "Excellent structured responses (questions {})",
                high_scores.join(", ")
            ));
        }
        if !self.answers.is_empty() && self.answers.iter().all(|a| a.breakdown.semantic >= 0.8) {
            strengths.push("Consistently high relevance across all answers".to_string());
        }

        if strengths.is_empty() {
            strengths.push("Consistent effort shown".to_string());
        }
        if weaknesses.is_empty() {
            weaknesses.push("Continue practicing regularly".to_string());
        }
        (strengths, weaknesses)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let (strengths, weaknesses) = self.strengths_and_weaknesses();
        SessionSnapshot {
            id: self.id.clone(),
            role: self.role.clone(),
            status: self.status,
            difficulty: self.selector.difficulty(),
            trend: self.selector.trend(),
            answers: self.answers.clone(),
            stats: self.stats(),
            strengths,
            weaknesses,
        }
    }
}
