//! The answer-scoring pipeline and its per-session ordering discipline.
//!
//! Scoring one answer is independent work, but within a session answer N+1
//! must not start before answer N's breakdown is finalized: the difficulty
//! selector's rolling window depends on prior results. Each session
//! therefore gets its own worker task fed by an mpsc queue; different
//! sessions' workers run concurrently and share nothing.

use crate::similarity::{semantic_score, SemanticScore, SimilarityScorer};
use interview_core::adaptive::{AdaptiveSelector, Trend};
use interview_core::config::ScoringConfig;
use interview_core::delivery;
use interview_core::error::ScoringError;
use interview_core::feedback::{self, FeedbackContext};
use interview_core::lexical::LexicalMatcher;
use interview_core::question::{Difficulty, Question};
use interview_core::score::{ScoreAggregator, ScoreBreakdown};
use interview_core::session::{SessionSnapshot, SessionState};
use interview_core::transcript::Transcript;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Floor scores for answers under the configured minimum length. Matching
/// the product rule: a too-brief answer is not analyzed, it is floored.
const BRIEF_LEXICAL: f64 = 0.05;
const BRIEF_SEMANTIC: f64 = 0.05;
const BRIEF_DELIVERY: f64 = 0.2;

/// Stateless evaluator for a single answer. Shared across all session
/// workers; holds the validated configuration and the injected similarity
/// capability.
pub struct AnswerScorer {
    config: ScoringConfig,
    matcher: LexicalMatcher,
    aggregator: ScoreAggregator,
    similarity: Option<Arc<dyn SimilarityScorer>>,
    similarity_timeout: Duration,
}

impl AnswerScorer {
    pub fn new(
        config: ScoringConfig,
        similarity: Option<Arc<dyn SimilarityScorer>>,
        similarity_timeout: Duration,
    ) -> Result<Self, ScoringError> {
        config.validate()?;
        let matcher = LexicalMatcher::new(config.keyword_matching);
        let aggregator = ScoreAggregator::new(config.weights)?;
        Ok(Self {
            config,
            matcher,
            aggregator,
            similarity,
            similarity_timeout,
        })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one answer. Only `InvalidInput` (bad question or transcript)
    /// fails; external-service trouble degrades per policy.
    pub async fn score(
        &self,
        session_id: &str,
        answer_index: usize,
        question: &Question,
        transcript: &Transcript,
    ) -> Result<ScoreBreakdown, ScoringError> {
        if transcript.len() < self.config.min_answer_words {
            tracing::info!(
                session_id,
                answer_index,
                words = transcript.len(),
                minimum = self.config.min_answer_words,
                "answer below minimum length, applying floor scores"
            );
            return Ok(self.aggregator.aggregate(
                BRIEF_LEXICAL,
                BRIEF_SEMANTIC,
                BRIEF_DELIVERY,
                false,
                vec![
                    "Response too brief: provide a detailed answer before analysis is meaningful."
                        .to_string(),
                ],
            ));
        }

        let lexical = self
            .matcher
            .coverage(transcript, &question.keywords)
            .map_err(|e| {
                tracing::error!(
                    session_id,
                    answer_index,
                    component = "lexical",
                    error = %e,
                    "lexical matching failed"
                );
                e
            })?;

        let semantic = match &self.similarity {
            Some(scorer) => {
                semantic_score(
                    scorer.as_ref(),
                    self.similarity_timeout,
                    &transcript.text(),
                    &question.model_answer,
                    lexical,
                )
                .await
            }
            // No backend configured: lexical stands in, marked degraded.
            None => SemanticScore {
                value: lexical,
                degraded: true,
            },
        };
        if semantic.degraded {
            tracing::warn!(
                session_id,
                answer_index,
                component = "semantic",
                "semantic score degraded to lexical fallback"
            );
        }

        let metrics = delivery::analyze(transcript, &self.config.delivery).map_err(|e| {
            tracing::error!(
                session_id,
                answer_index,
                component = "delivery",
                error = %e,
                "delivery analysis failed"
            );
            e
        })?;
        let delivery_score = delivery::score(&metrics, &self.config.delivery);

        let recommendations = feedback::recommendations(
            &FeedbackContext {
                transcript,
                lexical,
                semantic: semantic.value,
                delivery: delivery_score,
            },
            &self.config.feedback,
        );

        Ok(self.aggregator.aggregate(
            lexical,
            semantic.value,
            delivery_score,
            semantic.degraded,
            recommendations,
        ))
    }
}

/// The scored outcome plus the session's updated progression state.
#[derive(Debug, Clone)]
pub struct ScoredAnswer {
    pub breakdown: ScoreBreakdown,
    pub difficulty: Difficulty,
    pub trend: Trend,
}

enum SessionCommand {
    Score {
        question: Question,
        transcript: Transcript,
        reply: oneshot::Sender<Result<ScoredAnswer, ScoringError>>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Close {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

/// Cheap handle onto one session's worker queue.
#[derive(Clone)]
pub struct SessionHandle {
    id: String,
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Submit an answer and wait for its finalized breakdown. Requests on
    /// one handle are processed strictly in submission order.
    pub async fn score(
        &self,
        question: Question,
        transcript: Transcript,
    ) -> Result<ScoredAnswer, ScoringError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Score {
                question,
                transcript,
                reply,
            })
            .await
            .map_err(|_| {
                ScoringError::InvalidInput(format!("session {} is no longer running", self.id))
            })?;
        rx.await.map_err(|_| {
            ScoringError::InvalidInput(format!("session {} dropped the request", self.id))
        })?
    }

    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(SessionCommand::Snapshot { reply }).await.ok()?;
        rx.await.ok()
    }

    /// Close the session and return its final snapshot. The worker exits
    /// after replying.
    pub async fn close(&self) -> Option<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(SessionCommand::Close { reply }).await.ok()?;
        rx.await.ok()
    }
}

fn spawn_session(scorer: Arc<AnswerScorer>, mut session: SessionState) -> SessionHandle {
    let (tx, mut rx) = mpsc::channel::<SessionCommand>(16);
    let id = session.id().to_string();
    tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            match command {
                SessionCommand::Score {
                    question,
                    transcript,
                    reply,
                } => {
                    let answer_index = session.answers().len();
                    let result = scorer
                        .score(session.id(), answer_index, &question, &transcript)
                        .await;
                    let outcome = match result {
                        Ok(breakdown) => {
                            match session.record_answer(question, transcript, breakdown.clone()) {
                                Ok(difficulty) => Ok(ScoredAnswer {
                                    breakdown,
                                    difficulty,
                                    trend: session.trend(),
                                }),
                                Err(e) => Err(e),
                            }
                        }
                        Err(e) => {
                            // A failed answer never terminates the session;
                            // the caller decides what to do with it.
                            tracing::error!(
                                session_id = session.id(),
                                answer_index,
                                error = %e,
                                "scoring failed, session continues"
                            );
                            Err(e)
                        }
                    };
                    let _ = reply.send(outcome);
                }
                SessionCommand::Snapshot { reply } => {
                    let _ = reply.send(session.snapshot());
                }
                SessionCommand::Close { reply } => {
                    session.close();
                    let _ = reply.send(session.snapshot());
                    break;
                }
            }
        }
        tracing::debug!(session_id = session.id(), "session worker stopped");
    });
    SessionHandle { id, tx }
}

/// Owns the live sessions. Different sessions score concurrently; each one
/// is a strictly sequential pipeline.
pub struct SessionRegistry {
    scorer: Arc<AnswerScorer>,
    sessions: HashMap<String, SessionHandle>,
}

impl SessionRegistry {
    pub fn new(scorer: Arc<AnswerScorer>) -> Self {
        Self {
            scorer,
            sessions: HashMap::new(),
        }
    }

    /// Open a session at the given starting difficulty and spawn its
    /// worker. Reopening an existing id returns the running handle.
    pub fn open(
        &mut self,
        id: impl Into<String>,
        role: impl Into<String>,
        initial_difficulty: Difficulty,
    ) -> SessionHandle {
        let id = id.into();
        if let Some(existing) = self.sessions.get(&id) {
            return existing.clone();
        }
        let selector = AdaptiveSelector::new(self.scorer.config().selector, initial_difficulty);
        let session = SessionState::new(id.clone(), role, selector);
        let handle = spawn_session(self.scorer.clone(), session);
        self.sessions.insert(id, handle.clone());
        handle
    }

    pub async fn close(&mut self, id: &str) -> Option<SessionSnapshot> {
        let handle = self.sessions.remove(id)?;
        handle.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::MockSimilarityScorer;
    use interview_core::session::SessionStatus;
    use interview_core::transcript::Token;

    fn question() -> Question {
        Question {
            id: "q-1".to_string(),
            role: "Software Engineer".to_string(),
            text: "Describe a caching problem you solved.".to_string(),
            difficulty: Difficulty::Medium,
            keywords: vec!["cache".to_string(), "latency".to_string()],
            model_answer: "We cached hot lookups and cut tail latency.".to_string(),
            follow_ups: vec![],
        }
    }

    /// A fluent answer: `count` tokens, 0.4s each with no long pauses.
    fn long_transcript(count: usize) -> Transcript {
        let tokens = (0..count)
            .map(|i| {
                let start = i as f64 * 0.4;
                let word = match i % 4 {
                    0 => "cache",
                    1 => "latency",
                    2 => "dropped",
                    _ => "sharply",
                };
                Token::new(word, start, start + 0.35)
            })
            .collect();
        Transcript::new(tokens)
    }

    fn test_config() -> ScoringConfig {
        ScoringConfig {
            min_answer_words: 10,
            ..ScoringConfig::default()
        }
    }

    fn scorer_with(mock: MockSimilarityScorer) -> Arc<AnswerScorer> {
        Arc::new(
            AnswerScorer::new(
                test_config(),
                Some(Arc::new(mock)),
                Duration::from_millis(100),
            )
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn scores_a_fluent_answer() {
        let mut mock = MockSimilarityScorer::new();
        mock.expect_similarity()
            .returning(|_, _| Box::pin(async { Ok(0.92) }));
        let scorer = scorer_with(mock);

        let breakdown = scorer
            .score("s-1", 0, &question(), &long_transcript(40))
            .await
            .unwrap();
        assert_eq!(breakdown.lexical, 1.0);
        assert_eq!(breakdown.semantic, 0.92);
        assert!(!breakdown.degraded);
        assert!(breakdown.combined > 0.8);
        assert!(!breakdown.recommendations.is_empty());
    }

    #[tokio::test]
    async fn brief_answer_is_floored_without_calling_similarity() {
        let mut mock = MockSimilarityScorer::new();
        mock.expect_similarity().times(0);
        let scorer = scorer_with(mock);

        let breakdown = scorer
            .score("s-1", 0, &question(), &long_transcript(3))
            .await
            .unwrap();
        assert_eq!(breakdown.lexical, BRIEF_LEXICAL);
        assert!(breakdown
            .recommendations
            .iter()
            .any(|r| r.contains("too brief")));
    }

    #[tokio::test]
    async fn similarity_timeout_degrades_to_lexical() {
        let mut mock = MockSimilarityScorer::new();
        mock.expect_similarity().returning(|_, _| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Ok(0.99)
            })
        });
        let scorer = Arc::new(
            AnswerScorer::new(
                test_config(),
                Some(Arc::new(mock)),
                Duration::from_millis(10),
            )
            .unwrap(),
        );

        let breakdown = scorer
            .score("s-1", 0, &question(), &long_transcript(40))
            .await
            .unwrap();
        assert!(breakdown.degraded);
        assert_eq!(breakdown.semantic, breakdown.lexical);
    }

    #[tokio::test]
    async fn no_backend_configured_is_degraded_lexical() {
        let scorer = Arc::new(
            AnswerScorer::new(test_config(), None, Duration::from_millis(10)).unwrap(),
        );
        let breakdown = scorer
            .score("s-1", 0, &question(), &long_transcript(40))
            .await
            .unwrap();
        assert!(breakdown.degraded);
        assert_eq!(breakdown.semantic, breakdown.lexical);
    }

    #[tokio::test]
    async fn session_worker_orders_answers_and_adapts_difficulty() {
        let mut mock = MockSimilarityScorer::new();
        mock.expect_similarity()
            .returning(|_, _| Box::pin(async { Ok(0.95) }));
        let scorer = scorer_with(mock);

        let mut registry = SessionRegistry::new(scorer);
        let handle = registry.open("s-1", "Software Engineer", Difficulty::Medium);

        for _ in 0..3 {
            let scored = handle
                .score(question(), long_transcript(40))
                .await
                .unwrap();
            assert!(scored.breakdown.combined > 0.75);
        }

        // A mid-session snapshot is read-only and leaves the session open.
        let mid = handle.snapshot().await.unwrap();
        assert_eq!(mid.status, SessionStatus::Open);
        assert_eq!(mid.answers.len(), 3);

        let snapshot = registry.close("s-1").await.unwrap();
        assert_eq!(snapshot.answers.len(), 3);
        assert_eq!(snapshot.difficulty, Difficulty::Hard);
        assert_eq!(snapshot.trend, Trend::Advancing);
        // Answers were recorded in submission order.
        assert!(snapshot
            .answers
            .iter()
            .all(|a| a.question.id == "q-1"));
    }

    #[tokio::test]
    async fn failed_answer_does_not_stop_the_session() {
        let mut mock = MockSimilarityScorer::new();
        mock.expect_similarity()
            .returning(|_, _| Box::pin(async { Ok(0.9) }));
        let scorer = scorer_with(mock);

        let mut registry = SessionRegistry::new(scorer);
        let handle = registry.open("s-2", "Software Engineer", Difficulty::Medium);

        let mut bad_question = question();
        bad_question.keywords.clear();
        let err = handle
            .score(bad_question, long_transcript(40))
            .await
            .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidInput(_)));

        // The session keeps accepting answers afterwards.
        let scored = handle.score(question(), long_transcript(40)).await.unwrap();
        assert!(scored.breakdown.combined > 0.0);

        let snapshot = registry.close("s-2").await.unwrap();
        assert_eq!(snapshot.answers.len(), 1);
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let mut mock = MockSimilarityScorer::new();
        mock.expect_similarity()
            .returning(|_, _| Box::pin(async { Ok(0.95) }));
        let scorer = scorer_with(mock);

        let mut registry = SessionRegistry::new(scorer);
        let strong = registry.open("strong", "Software Engineer", Difficulty::Medium);
        let weak = registry.open("weak", "Software Engineer", Difficulty::Medium);

        // Interleave submissions across the two sessions.
        for _ in 0..3 {
            strong.score(question(), long_transcript(40)).await.unwrap();
            weak.score(question(), long_transcript(3)).await.unwrap();
        }

        let strong_snapshot = registry.close("strong").await.unwrap();
        let weak_snapshot = registry.close("weak").await.unwrap();
        assert_eq!(strong_snapshot.difficulty, Difficulty::Hard);
        assert_eq!(weak_snapshot.difficulty, Difficulty::Easy);
    }
}
