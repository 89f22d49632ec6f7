//! Speech collaborator seams.
//!
//! The scoring core never talks to audio services directly; it consumes a
//! `Transcript` and emits question text. These traits define the boundary
//! contracts, and the policy functions here implement the retry/fallback
//! rules the collaborators are owed: bounded retries for transcription,
//! text-only fallback for speech synthesis.

use anyhow::Result;
use async_trait::async_trait;
use interview_core::error::ScoringError;
use interview_core::transcript::Transcript;
#[cfg(test)]
use mockall::automock;

/// Produces a transcript from raw answer audio.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<Transcript>;
}

/// Synthesizes spoken audio for a question prompt.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait TextToSpeech: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Retry transcription up to `max_attempts` times, then surface
/// `TranscriptionFailed` to the session controller (which decides whether
/// to allow manual re-recording).
pub async fn transcribe_with_retry<S: SpeechToText + ?Sized>(
    stt: &S,
    audio: &[u8],
    max_attempts: u32,
) -> Result<Transcript, ScoringError> {
    let mut last_error = String::new();
    for attempt in 1..=max_attempts {
        match stt.transcribe(audio).await {
            Ok(transcript) => return Ok(transcript),
            Err(e) => {
                tracing::warn!(attempt, max_attempts, "transcription attempt failed: {e:#}");
                last_error = format!("{e:#}");
            }
        }
    }
    Err(ScoringError::TranscriptionFailed {
        attempts: max_attempts,
        reason: last_error,
    })
}

/// How a question reaches the candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionDelivery {
    Spoken(Vec<u8>),
    TextOnly(String),
}

/// Ask the text-to-speech collaborator to voice a question; on failure the
/// question is delivered as text only. No retry.
pub async fn deliver_question<T: TextToSpeech + ?Sized>(tts: &T, text: &str) -> QuestionDelivery {
    match tts.synthesize(text).await {
        Ok(audio) => QuestionDelivery::Spoken(audio),
        Err(e) => {
            tracing::warn!("text-to-speech failed, falling back to text-only question: {e:#}");
            QuestionDelivery::TextOnly(text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_core::transcript::Token;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn transcript() -> Transcript {
        Transcript::new(vec![Token::new("hello", 0.0, 0.4)])
    }

    #[tokio::test]
    async fn retry_succeeds_after_transient_failure() {
        let mut mock = MockSpeechToText::new();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_mock = calls.clone();
        mock.expect_transcribe().returning(move |_| {
            let n = calls_in_mock.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if n == 0 {
                    Err(anyhow::anyhow!("transient network error"))
                } else {
                    Ok(transcript())
                }
            })
        });

        let result = transcribe_with_retry(&mock, b"audio", 3).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_transcription_failed() {
        let mut mock = MockSpeechToText::new();
        mock.expect_transcribe()
            .times(3)
            .returning(|_| Box::pin(async { Err(anyhow::anyhow!("service unavailable")) }));

        let err = transcribe_with_retry(&mock, b"audio", 3).await.unwrap_err();
        match err {
            ScoringError::TranscriptionFailed { attempts, reason } => {
                assert_eq!(attempts, 3);
                assert!(reason.contains("service unavailable"));
            }
            other => panic!("expected TranscriptionFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn tts_failure_falls_back_to_text() {
        let mut mock = MockTextToSpeech::new();
        mock.expect_synthesize()
            .returning(|_| Box::pin(async { Err(anyhow::anyhow!("voice service down")) }));

        let delivery = deliver_question(&mock, "Tell me about yourself.").await;
        assert_eq!(
            delivery,
            QuestionDelivery::TextOnly("Tell me about yourself.".to_string())
        );
    }

    #[tokio::test]
    async fn tts_success_delivers_audio() {
        let mut mock = MockTextToSpeech::new();
        mock.expect_synthesize()
            .returning(|_| Box::pin(async { Ok(vec![1u8, 2, 3]) }));

        let delivery = deliver_question(&mock, "Next question.").await;
        assert_eq!(delivery, QuestionDelivery::Spoken(vec![1, 2, 3]));
    }
}
