use std::time::Duration;

/// Failure taxonomy for the scoring core and its collaborators.
///
/// `InvalidInput` and `InvalidConfig` are caller errors and are never
/// retried. The external-service variants drive fallback and retry policy
/// in the service layer; none of them may terminate a session.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("external service timed out after {0:?}")]
    ExternalServiceTimeout(Duration),
    #[error("external service error: {0}")]
    ExternalServiceError(String),
    #[error("transcription failed after {attempts} attempts: {reason}")]
    TranscriptionFailed { attempts: u32, reason: String },
}
