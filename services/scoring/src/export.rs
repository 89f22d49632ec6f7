//! Read-only export surface.
//!
//! Everything here consumes a `SessionSnapshot` and writes a rendering of
//! it; nothing mutates session state. PDF rendering belongs to a separate
//! collaborator and is not done here.

use anyhow::{Context, Result};
use interview_core::session::SessionSnapshot;
use std::fs::File;
use std::path::Path;

/// Serialize the full snapshot as pretty JSON.
pub fn write_json(snapshot: &SessionSnapshot, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create export file {}", path.display()))?;
    serde_json::to_writer_pretty(file, snapshot).context("failed to serialize session snapshot")?;
    Ok(())
}

/// Write the per-answer score history as CSV.
pub fn write_csv(snapshot: &SessionSnapshot, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create export file {}", path.display()))?;
    writer.write_record([
        "answer",
        "question_id",
        "difficulty",
        "lexical",
        "semantic",
        "delivery",
        "combined",
        "authoritative",
        "degraded",
        "overridden",
    ])?;
    for (index, answer) in snapshot.answers.iter().enumerate() {
        writer.write_record([
            (index + 1).to_string(),
            answer.question.id.clone(),
            answer.question.difficulty.to_string(),
            format!("{:.3}", answer.breakdown.lexical),
            format!("{:.3}", answer.breakdown.semantic),
            format!("{:.3}", answer.breakdown.delivery),
            format!("{:.3}", answer.breakdown.combined),
            format!("{:.3}", answer.breakdown.authoritative()),
            answer.breakdown.degraded.to_string(),
            answer.breakdown.is_overridden().to_string(),
        ])?;
    }
    writer.flush().context("failed to flush csv export")?;
    Ok(())
}

/// Render a plain-text summary suitable for copying or saving.
pub fn summary_text(snapshot: &SessionSnapshot) -> String {
    let mut lines = vec![
        "Interview Performance Summary".to_string(),
        "=".repeat(50),
        format!("Session: {}", snapshot.id),
        format!("Role: {}", snapshot.role),
        format!("Final difficulty: {}", snapshot.difficulty),
    ];

    if let Some(stats) = &snapshot.stats {
        lines.push(format!(
            "Overall score: {:.0}/100 across {} answers",
            stats.average_combined * 100.0,
            stats.answered
        ));
        lines.push(format!(
            "Strongest dimension: {} | Weakest: {}",
            stats.strongest_dimension, stats.weakest_dimension
        ));
    } else {
        lines.push("No answers were scored.".to_string());
    }

    lines.push(String::new());
    lines.push("Key strengths:".to_string());
    for strength in &snapshot.strengths {
        lines.push(format!("- {strength}"));
    }

    lines.push(String::new());
    lines.push("Areas to improve:".to_string());
    for weakness in &snapshot.weaknesses {
        lines.push(format!("- {weakness}"));
    }

    lines.join("\n")
}

pub fn write_summary(snapshot: &SessionSnapshot, path: &Path) -> Result<()> {
    std::fs::write(path, summary_text(snapshot))
        .with_context(|| format!("failed to write summary {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_core::adaptive::{AdaptiveSelector, SelectorConfig};
    use interview_core::question::{Difficulty, Question};
    use interview_core::score::{ScoreAggregator, Weights};
    use interview_core::session::SessionState;
    use interview_core::transcript::{Token, Transcript};

    fn snapshot() -> SessionSnapshot {
        let mut session = SessionState::new(
            "session-9",
            "Data Scientist",
            AdaptiveSelector::new(SelectorConfig::default(), Difficulty::Medium),
        );
        let aggregator = ScoreAggregator::new(Weights::default()).unwrap();
        session
            .record_answer(
                Question {
                    id: "ds-1".to_string(),
                    role: "Data Scientist".to_string(),
                    text: "Explain overfitting.".to_string(),
                    difficulty: Difficulty::Medium,
                    keywords: vec!["overfitting".to_string()],
                    model_answer: "Memorizing noise instead of signal.".to_string(),
                    follow_ups: vec![],
                },
                Transcript::new(vec![Token::new("overfitting", 0.0, 0.8)]),
                aggregator.aggregate(0.9, 0.85, 0.7, false, vec![]),
            )
            .unwrap();
        session.snapshot()
    }

    #[test]
    fn json_export_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let snap = snapshot();
        write_json(&snap, &path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        let back: SessionSnapshot = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn csv_export_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        write_csv(&snapshot(), &path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("answer,question_id,difficulty"));
        assert!(lines[1].starts_with("1,ds-1,medium"));
    }

    #[test]
    fn summary_names_session_and_dimensions() {
        let text = summary_text(&snapshot());
        assert!(text.contains("Session: session-9"));
        assert!(text.contains("Role: Data Scientist"));
        assert!(text.contains("Strongest dimension: lexical"));
        assert!(text.contains("Key strengths:"));
    }
}
