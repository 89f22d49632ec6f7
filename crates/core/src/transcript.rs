use serde::{Deserialize, Serialize};

/// A single recognized word with its timing, as produced by the
/// speech-to-text collaborator. Filler tokens ("um", "uh", ...) are marked
/// during transcription, not re-detected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub start_secs: f64,
    pub end_secs: f64,
    #[serde(default)]
    pub filler: bool,
}

impl Token {
    pub fn new(text: impl Into<String>, start_secs: f64, end_secs: f64) -> Self {
        Self {
            text: text.into(),
            start_secs,
            end_secs,
            filler: false,
        }
    }

    pub fn filler(text: impl Into<String>, start_secs: f64, end_secs: f64) -> Self {
        Self {
            text: text.into(),
            start_secs,
            end_secs,
            filler: true,
        }
    }
}

/// An ordered, timestamped token sequence for one recorded answer.
/// Immutable once recorded; everything derived from it (text, duration,
/// delivery metrics) is recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    tokens: Vec<Token>,
}

impl Transcript {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of tokens, fillers included.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn filler_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.filler).count()
    }

    /// Wall-clock span from the first token's start to the last token's end.
    pub fn duration_secs(&self) -> f64 {
        match (self.tokens.first(), self.tokens.last()) {
            (Some(first), Some(last)) => last.end_secs - first.start_secs,
            _ => 0.0,
        }
    }

    /// The plain text of the answer, tokens joined by single spaces.
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
