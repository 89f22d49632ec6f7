use crate::error::ScoringError;
use crate::transcript::Transcript;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};

/// How required keywords are located in the transcript text. `Exact` is
/// case-insensitive substring containment; `Fuzzy` tolerates recognition
/// noise using a skim match score above `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum KeywordMatching {
    Exact,
    Fuzzy { threshold: i64 },
}

impl Default for KeywordMatching {
    fn default() -> Self {
        KeywordMatching::Exact
    }
}

/// Compares a transcript against a question's required keyword set and
/// reports the fraction found, in [0, 1]. No side effects.
pub struct LexicalMatcher {
    mode: KeywordMatching,
    matcher: SkimMatcherV2,
}

impl LexicalMatcher {
    pub fn new(mode: KeywordMatching) -> Self {
        Self {
            mode,
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Fraction of `keywords` present at least once in the transcript.
    /// Fails with `InvalidInput` on an empty keyword set; the caller must
    /// supply a question with a non-empty model answer.
    pub fn coverage(
        &self,
        transcript: &Transcript,
        keywords: &[String],
    ) -> Result<f64, ScoringError> {
        if keywords.is_empty() {
            return Err(ScoringError::InvalidInput(
                "required keyword set is empty".to_string(),
            ));
        }
        let text = transcript.text().to_lowercase();
        let found = keywords
            .iter()
            .filter(|keyword| self.is_present(&text, keyword))
            .count();
        Ok(found as f64 / keywords.len() as f64)
    }

    fn is_present(&self, text: &str, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        match self.mode {
            KeywordMatching::Exact => text.contains(&keyword),
            KeywordMatching::Fuzzy { threshold } => {
                self.matcher.fuzzy_match(text, &keyword).unwrap_or(0) > threshold
            }
        }
    }
}
