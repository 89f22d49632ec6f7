use crate::config::FeedbackConfig;
use crate::transcript::Transcript;

/// Inputs to recommendation generation for one scored answer.
pub struct FeedbackContext<'a> {
    pub transcript: &'a Transcript,
    pub lexical: f64,
    pub semantic: f64,
    pub delivery: f64,
}

/// Generate qualitative recommendations from threshold rules. Rules fire in
/// a fixed order and the list is capped, so the same inputs always produce
/// the same recommendations.
pub fn recommendations(ctx: &FeedbackContext<'_>, config: &FeedbackConfig) -> Vec<String> {
    let text = ctx.transcript.text().to_lowercase();
    let word_count = ctx.transcript.len();
    let filler_count = ctx.transcript.filler_count();
    let mut out = Vec::new();

    out.push(relevance_phrase(ctx.semantic));

    if ctx.lexical < 0.5 {
        out.push("Cover more of the expected key points for this question.".to_string());
    }

    if count_matches(&text, &config.star_keywords) >= 3 {
        out.push(
            "Effective structure: the answer follows a situation-task-action-result shape."
                .to_string(),
        );
    }

    if count_matches(&text, &config.example_keywords) > 0 {
        if word_count > 120 {
            out.push("Strong use of detailed real-world examples.".to_string());
        } else {
            out.push("Appropriate use of examples to support points.".to_string());
        }
    }

    if count_matches(&text, &config.technical_keywords) >= 3 {
        out.push("Good use of domain vocabulary.".to_string());
    }

    out.push(depth_phrase(word_count));
    out.push(filler_phrase(filler_count));

    if ctx.delivery < 0.5 {
        out.push("Reduce filler words and long pauses for smoother delivery.".to_string());
    }

    out.push(format!(
        "Estimated speaking time: {}.",
        speaking_time(word_count, config.nominal_wpm)
    ));

    out.truncate(config.max_recommendations);
    out
}

fn relevance_phrase(semantic: f64) -> String {
    if semantic >= 0.95 {
        "Exceptional relevance, perfectly aligned with the question.".to_string()
    } else if semantic >= 0.88 {
        "Strong relevance with excellent focus on key points.".to_string()
    } else if semantic >= 0.80 {
        "Good relevance and clear connection to the question.".to_string()
    } else if semantic >= 0.65 {
        "Moderate relevance; mostly on track with room for tighter focus.".to_string()
    } else {
        "Limited relevance; consider addressing the question more directly.".to_string()
    }
}

fn depth_phrase(word_count: usize) -> String {
    if word_count >= 180 {
        "Excellent depth and comprehensive coverage.".to_string()
    } else if word_count >= 130 {
        "Solid depth with a good level of detail.".to_string()
    } else if word_count >= 90 {
        "Adequate content; consider expanding with examples.".to_string()
    } else {
        format!("Response length: {word_count} words. Aim for more elaboration.")
    }
}

fn filler_phrase(filler_count: usize) -> String {
    if filler_count == 0 {
        "Excellent fluency with no filler words.".to_string()
    } else if filler_count <= 2 {
        format!("High fluency with minimal fillers ({filler_count}).")
    } else if filler_count <= 6 {
        format!("Moderate filler word usage ({filler_count}); practice confident pauses.")
    } else {
        format!("Significant filler usage ({filler_count}); focus on reducing it for stronger delivery.")
    }
}

/// Count keywords present in the lowercased answer text. Distinct keywords
/// only; repeats of one keyword count once.
fn count_matches(text: &str, keywords: &[String]) -> usize {
    keywords
        .iter()
        .filter(|kw| text.contains(&kw.to_lowercase()))
        .count()
}

fn speaking_time(word_count: usize, nominal_wpm: f64) -> String {
    let minutes = word_count as f64 / nominal_wpm;
    if minutes < 1.0 {
        format!("about {} seconds", (minutes * 60.0).round() as u64)
    } else {
        format!("about {minutes:.1} minutes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedbackConfig;
    use crate::transcript::Token;

    fn transcript_from(words: &[&str], fillers: usize) -> Transcript {
        let tokens = words
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let start = i as f64 * 0.4;
                if i < fillers {
                    Token::filler(*w, start, start + 0.3)
                } else {
                    Token::new(*w, start, start + 0.3)
                }
            })
            .collect();
        Transcript::new(tokens)
    }

    fn ctx<'a>(transcript: &'a Transcript, semantic: f64, delivery: f64) -> FeedbackContext<'a> {
        FeedbackContext {
            transcript,
            lexical: 0.8,
            semantic,
            delivery,
        }
    }

    #[test]
    fn star_structure_needs_three_distinct_keywords() {
        let config = FeedbackConfig::default();
        let with_star = transcript_from(
            &["the", "situation", "was", "bad", "my", "task", "was", "clear", "the", "result", "shipped"],
            0,
        );
        let recs = recommendations(&ctx(&with_star, 0.9, 0.9), &config);
        assert!(recs.iter().any(|r| r.contains("situation-task-action-result")));

        let without = transcript_from(&["the", "situation", "was", "fine"], 0);
        let recs = recommendations(&ctx(&without, 0.9, 0.9), &config);
        assert!(!recs.iter().any(|r| r.contains("situation-task-action-result")));
    }

    #[test]
    fn low_delivery_triggers_filler_recommendation() {
        let config = FeedbackConfig::default();
        let t = transcript_from(&["um", "uh", "well", "so", "like", "anyway", "done"], 6);
        let recs = recommendations(&ctx(&t, 0.7, 0.3), &config);
        assert!(recs
            .iter()
            .any(|r| r.contains("Reduce filler words and long pauses")));
        assert!(recs.iter().any(|r| r.contains("Moderate filler word usage (6)")));
    }

    #[test]
    fn low_semantic_asks_for_directness() {
        let config = FeedbackConfig::default();
        let t = transcript_from(&["completely", "unrelated", "talk"], 0);
        let recs = recommendations(&ctx(&t, 0.2, 0.8), &config);
        assert!(recs.iter().any(|r| r.contains("addressing the question more directly")));
    }

    #[test]
    fn brief_answers_get_word_count_phrase() {
        let config = FeedbackConfig::default();
        let t = transcript_from(&["short", "answer"], 0);
        let recs = recommendations(&ctx(&t, 0.9, 0.9), &config);
        assert!(recs.iter().any(|r| r.contains("Response length: 2 words")));
    }

    #[test]
    fn output_is_capped_and_deterministic() {
        let config = FeedbackConfig::default();
        let words: Vec<&str> = std::iter::repeat("example").take(200).collect();
        let t = transcript_from(&words, 0);
        let a = recommendations(&ctx(&t, 0.9, 0.2), &config);
        let b = recommendations(&ctx(&t, 0.9, 0.2), &config);
        assert_eq!(a, b);
        assert!(a.len() <= config.max_recommendations);
    }

    #[test]
    fn speaking_time_formats_seconds_and_minutes() {
        assert_eq!(speaking_time(70, 140.0), "about 30 seconds");
        assert_eq!(speaking_time(280, 140.0), "about 2.0 minutes");
    }
}
