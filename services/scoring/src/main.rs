mod collaborators;
mod config;
mod export;
mod pipeline;
mod similarity;

use crate::config::{Config, SimilarityProvider};
use crate::pipeline::{AnswerScorer, SessionRegistry};
use crate::similarity::{EmbeddingClient, SimilarityScorer};
use anyhow::{Context, Result};
use clap::Parser;
use interview_core::config::ScoringConfig;
use interview_core::question::{Difficulty, QuestionBank};
use interview_core::transcript::Transcript;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::fmt::time::ChronoLocal;

#[derive(Parser)]
#[command(about = "Score a recorded interview session and export the results")]
struct Cli {
    /// Candidate role to draw questions for
    role: String,
    /// Recorded answers to score: a JSON array of transcripts
    #[arg(long)]
    answers: PathBuf,
    /// Path to the question bank JSON
    #[arg(long, default_value = "assets/questions.json")]
    question_bank: PathBuf,
    /// Scoring configuration JSON; defaults apply when omitted
    #[arg(long)]
    scoring_config: Option<PathBuf>,
    /// Starting difficulty
    #[arg(long, default_value = "medium")]
    difficulty: Difficulty,
    /// Directory to write session exports into
    #[arg(long, default_value = "exports")]
    out_dir: PathBuf,
    /// Seed for reproducible question selection
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load service configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    tracing::info!("Configuration loaded. Starting interview scoring service...");

    // --- 3. Parse Command-Line Arguments ---
    let args = Cli::parse();

    // --- 4. Load Scoring Parameters and Question Bank ---
    let scoring_config = match &args.scoring_config {
        Some(path) => ScoringConfig::load(path).context("Failed to load scoring configuration")?,
        None => ScoringConfig::default(),
    };
    let bank = QuestionBank::load(&args.question_bank).context("Failed to load question bank")?;
    tracing::info!(roles = ?bank.roles(), "Question bank loaded");

    let raw_answers = std::fs::read_to_string(&args.answers)
        .with_context(|| format!("Failed to read answers file {}", args.answers.display()))?;
    let transcripts: Vec<Transcript> =
        serde_json::from_str(&raw_answers).context("Failed to parse answers file")?;
    tracing::info!(count = transcripts.len(), "Recorded answers loaded");

    // --- 5. Initialize the Similarity Backend ---
    let similarity: Option<Arc<dyn SimilarityScorer>> = match config.provider {
        SimilarityProvider::Embedding => {
            let api_key = config
                .embedding_api_key
                .clone()
                .context("embedding provider selected but no API key configured")?;
            Some(Arc::new(EmbeddingClient::new(
                api_key,
                config.embedding_model.clone(),
                config.embedding_endpoint.clone(),
            )))
        }
        SimilarityProvider::Lexical => {
            tracing::warn!("running without a similarity backend; semantic scores will be degraded");
            None
        }
    };
    tracing::debug!(
        similarity_timeout_ms = config.similarity_timeout.as_millis() as u64,
        transcription_attempts = config.transcription_attempts,
        "collaborator policy loaded"
    );

    // --- 6. Run the Session ---
    let scorer = Arc::new(
        AnswerScorer::new(scoring_config, similarity, config.similarity_timeout)
            .context("Failed to build answer scorer")?,
    );
    let mut registry = SessionRegistry::new(scorer);

    let session_id = format!("session-{}", std::process::id());
    let handle = registry.open(session_id.clone(), args.role.clone(), args.difficulty);

    let mut difficulty = args.difficulty;
    let mut asked: Vec<String> = Vec::new();
    for (index, transcript) in transcripts.into_iter().enumerate() {
        let exclude: Vec<&str> = asked.iter().map(String::as_str).collect();
        let question = bank
            .select_one(
                &args.role,
                difficulty,
                &exclude,
                args.seed.map(|s| s + index as u64),
            )
            .context("Failed to select next question")?;
        asked.push(question.id.clone());
        tracing::info!(
            session = handle.id(),
            answer = index + 1,
            question = %question.text,
            %difficulty,
            "Scoring answer"
        );

        match handle.score(question, transcript).await {
            Ok(scored) => {
                difficulty = scored.difficulty;
                tracing::info!(
                    answer = index + 1,
                    combined = scored.breakdown.combined,
                    degraded = scored.breakdown.degraded,
                    next_difficulty = %scored.difficulty,
                    "Answer scored"
                );
            }
            Err(e) => {
                tracing::error!(answer = index + 1, error = %e, "Answer could not be scored");
            }
        }
    }

    // --- 7. Export ---
    let snapshot = registry
        .close(&session_id)
        .await
        .context("Session worker ended before producing a snapshot")?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create export directory {}", args.out_dir.display()))?;
    export::write_json(&snapshot, &args.out_dir.join(format!("{session_id}.json")))?;
    export::write_csv(&snapshot, &args.out_dir.join(format!("{session_id}.csv")))?;
    export::write_summary(&snapshot, &args.out_dir.join(format!("{session_id}.txt")))?;

    println!("{}", export::summary_text(&snapshot));
    tracing::info!(out_dir = %args.out_dir.display(), "Session complete, exports written");
    Ok(())
}
