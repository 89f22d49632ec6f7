use crate::error::ScoringError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Ordered question difficulty. Transitions are clamped: `advance` caps at
/// `Hard`, `regress` floors at `Easy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn advance(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Hard => Difficulty::Hard,
        }
    }

    pub fn regress(self) -> Self {
        match self {
            Difficulty::Hard => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Easy => Difficulty::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ScoringError::InvalidInput(format!(
                "unknown difficulty: {other}"
            ))),
        }
    }
}

/// One published interview question. Immutable once loaded; owned by the
/// question bank, which is read-only from the scoring core's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub role: String,
    pub text: String,
    pub difficulty: Difficulty,
    pub keywords: Vec<String>,
    pub model_answer: String,
    #[serde(default)]
    pub follow_ups: Vec<String>,
}

/// Role-keyed question bank, loaded once at startup from a JSON document.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionBank {
    roles: HashMap<String, Vec<Question>>,
}

impl QuestionBank {
    /// Load and validate a bank file. Malformed entries (missing keywords or
    /// model answer) are rejected here so the lexical matcher never sees an
    /// empty keyword set at scoring time.
    pub fn load(path: &Path) -> Result<Self, ScoringError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ScoringError::InvalidInput(format!(
                "failed to read question bank {}: {e}",
                path.display()
            ))
        })?;
        let mut bank: QuestionBank = serde_json::from_str(&raw).map_err(|e| {
            ScoringError::InvalidInput(format!(
                "failed to parse question bank {}: {e}",
                path.display()
            ))
        })?;
        for (role, questions) in &mut bank.roles {
            if questions.is_empty() {
                return Err(ScoringError::InvalidInput(format!(
                    "question bank has no questions for role {role:?}"
                )));
            }
            for question in questions.iter_mut() {
                question.role = role.clone();
                if question.keywords.is_empty() {
                    return Err(ScoringError::InvalidInput(format!(
                        "question {:?} has an empty keyword set",
                        question.id
                    )));
                }
                if question.model_answer.trim().is_empty() {
                    return Err(ScoringError::InvalidInput(format!(
                        "question {:?} has no model answer",
                        question.id
                    )));
                }
            }
        }
        Ok(bank)
    }

    pub fn roles(&self) -> Vec<&str> {
        let mut roles: Vec<&str> = self.roles.keys().map(String::as_str).collect();
        roles.sort_unstable();
        roles
    }

    pub fn questions_for(&self, role: &str) -> Option<&[Question]> {
        self.roles.get(role).map(Vec::as_slice)
    }

    /// Pick one question for a role at the given difficulty, skipping ids in
    /// `exclude`. Falls back to the whole role pool when nothing matches the
    /// difficulty. `seed` makes the pick reproducible for tests.
    pub fn select_one(
        &self,
        role: &str,
        difficulty: Difficulty,
        exclude: &[&str],
        seed: Option<u64>,
    ) -> Result<Question, ScoringError> {
        let pool = self.roles.get(role).ok_or_else(|| {
            ScoringError::InvalidInput(format!("no questions for role {role:?}"))
        })?;
        let fresh: Vec<&Question> = pool
            .iter()
            .filter(|q| !exclude.contains(&q.id.as_str()))
            .collect();
        if fresh.is_empty() {
            return Err(ScoringError::InvalidInput(format!(
                "question bank exhausted for role {role:?}"
            )));
        }
        let at_level: Vec<&Question> = fresh
            .iter()
            .copied()
            .filter(|q| q.difficulty == difficulty)
            .collect();
        let candidates = if at_level.is_empty() {
            tracing::warn!(role, %difficulty, "no unused questions at difficulty, widening to role pool");
            &fresh
        } else {
            &at_level
        };
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let picked = candidates
            .choose(&mut rng)
            .expect("candidate pool checked non-empty");
        Ok((*picked).clone())
    }

    /// Sample up to `count` distinct questions for a role. When the pool is
    /// smaller than `count` the whole pool is returned.
    pub fn select(
        &self,
        role: &str,
        count: usize,
        seed: Option<u64>,
    ) -> Result<Vec<Question>, ScoringError> {
        let pool = self.roles.get(role).ok_or_else(|| {
            ScoringError::InvalidInput(format!("no questions for role {role:?}"))
        })?;
        if pool.len() < count {
            tracing::warn!(
                role,
                available = pool.len(),
                requested = count,
                "question bank smaller than requested sample"
            );
            return Ok(pool.clone());
        }
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Ok(pool
            .choose_multiple(&mut rng, count)
            .cloned()
            .collect())
    }
}
