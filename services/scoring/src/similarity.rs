use anyhow::{Context, Result};
use async_trait::async_trait;
use interview_core::error::ScoringError;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Capability interface for semantic similarity between a candidate answer
/// and the model answer. Injected so the pipeline can run against a real
/// embedding backend or a deterministic test double.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait SimilarityScorer: Send + Sync {
    /// Raw similarity for the pair. Implementations may return values
    /// outside [0, 1]; the caller normalizes.
    async fn similarity(&self, answer: &str, model_answer: &str) -> Result<f64>;
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f64>,
}

/// Embedding-API backed similarity: embeds both texts in one request and
/// compares them by cosine similarity.
pub struct EmbeddingClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl EmbeddingClient {
    pub fn new(api_key: String, model: String, endpoint: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            endpoint,
        }
    }

    async fn embed(&self, inputs: &[&str]) -> Result<Vec<Vec<f64>>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": inputs,
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("embedding request failed")?
            .error_for_status()
            .context("embedding request rejected")?
            .json::<EmbeddingResponse>()
            .await
            .context("failed to decode embedding response")?;

        Ok(resp.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl SimilarityScorer for EmbeddingClient {
    async fn similarity(&self, answer: &str, model_answer: &str) -> Result<f64> {
        let embeddings = self.embed(&[answer, model_answer]).await?;
        if embeddings.len() != 2 {
            anyhow::bail!(
                "embedding response contained {} vectors, expected 2",
                embeddings.len()
            );
        }
        Ok(cosine(&embeddings[0], &embeddings[1]))
    }
}

pub(crate) fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// A normalized semantic score, with `degraded` set when the value came
/// from the lexical fallback rather than the external capability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemanticScore {
    pub value: f64,
    pub degraded: bool,
}

/// Run the external similarity call under a bounded timeout. Any failure
/// degrades to the lexical score instead of failing the pipeline.
pub async fn semantic_score<S: SimilarityScorer + ?Sized>(
    scorer: &S,
    timeout: Duration,
    answer: &str,
    model_answer: &str,
    lexical_fallback: f64,
) -> SemanticScore {
    let failure = match tokio::time::timeout(timeout, scorer.similarity(answer, model_answer)).await
    {
        Ok(Ok(raw)) => {
            return SemanticScore {
                value: raw.clamp(0.0, 1.0),
                degraded: false,
            }
        }
        Ok(Err(e)) => ScoringError::ExternalServiceError(format!("{e:#}")),
        Err(_) => ScoringError::ExternalServiceTimeout(timeout),
    };
    tracing::warn!(error = %failure, "semantic similarity unavailable, degrading to lexical score");
    SemanticScore {
        value: lexical_fallback,
        degraded: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![0.3, -0.2, 0.9];
        assert!((cosine(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn successful_call_is_clamped_and_not_degraded() {
        let mut mock = MockSimilarityScorer::new();
        mock.expect_similarity()
            .returning(|_, _| Box::pin(async { Ok(1.4) }));

        let score = semantic_score(&mock, Duration::from_secs(1), "a", "b", 0.2).await;
        assert_eq!(score.value, 1.0);
        assert!(!score.degraded);
    }

    #[tokio::test]
    async fn failed_call_falls_back_to_lexical() {
        let mut mock = MockSimilarityScorer::new();
        mock.expect_similarity()
            .returning(|_, _| Box::pin(async { Err(anyhow::anyhow!("backend down")) }));

        let score = semantic_score(&mock, Duration::from_secs(1), "a", "b", 0.35).await;
        assert_eq!(score.value, 0.35);
        assert!(score.degraded);
    }

    #[tokio::test]
    async fn timed_out_call_falls_back_to_lexical() {
        let mut mock = MockSimilarityScorer::new();
        mock.expect_similarity().returning(|_, _| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(0.99)
            })
        });

        let score = semantic_score(&mock, Duration::from_millis(10), "a", "b", 0.5).await;
        assert_eq!(score.value, 0.5);
        assert!(score.degraded);
    }
}
