//! Evaluation data model.
//!
//! A candidate tweet is scored once per category; the scores of one
//! evaluator call form an [`Evaluation`]. Scores are integers in
//! `MIN_SCORE..=MAX_SCORE` and an evaluation is never empty. Both invariants
//! are enforced at construction, so every `Evaluation` that reaches the
//! search loop is well-formed.
//!
//! Raw model output is turned into an `Evaluation` by [`repair`], which
//! substitutes defaults instead of failing.

pub mod repair;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SCORE, MAX_SCORE, MIN_SCORE, REASONING_MISSING};
use crate::errors::ScoreError;

// ---------------------------------------------------------------------------
// Category score
// ---------------------------------------------------------------------------

/// The score one category received, with the evaluator's justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CategoryScoreData", into = "CategoryScoreData")]
pub struct CategoryScore {
    category: String,
    reasoning: String,
    score: u32,
}

/// Unchecked wire form of [`CategoryScore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CategoryScoreData {
    category: String,
    #[serde(default)]
    reasoning: String,
    score: i64,
}

impl CategoryScore {
    /// Create a category score.
    ///
    /// Empty reasoning is replaced by a placeholder. Scores outside
    /// `MIN_SCORE..=MAX_SCORE` are rejected; callers substitute
    /// [`CategoryScore::with_default_score`] on error.
    pub fn new(
        category: impl Into<String>,
        reasoning: impl Into<String>,
        score: i64,
    ) -> Result<Self, ScoreError> {
        let category = category.into();
        if category.trim().is_empty() {
            return Err(ScoreError::EmptyCategory);
        }
        if score < i64::from(MIN_SCORE) || score > i64::from(MAX_SCORE) {
            return Err(ScoreError::OutOfRange {
                score,
                min: MIN_SCORE,
                max: MAX_SCORE,
            });
        }

        let reasoning = reasoning.into();
        let reasoning = if reasoning.trim().is_empty() {
            REASONING_MISSING.to_string()
        } else {
            reasoning
        };

        Ok(Self {
            category,
            reasoning,
            score: score as u32,
        })
    }

    /// A mid-range score with a placeholder reasoning string.
    pub fn with_default_score(category: impl Into<String>, reasoning: impl Into<String>) -> Self {
        let reasoning = reasoning.into();
        Self {
            category: category.into(),
            reasoning: if reasoning.trim().is_empty() {
                REASONING_MISSING.to_string()
            } else {
                reasoning
            },
            score: DEFAULT_SCORE,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn score(&self) -> u32 {
        self.score
    }
}

impl TryFrom<CategoryScoreData> for CategoryScore {
    type Error = ScoreError;

    fn try_from(data: CategoryScoreData) -> Result<Self, Self::Error> {
        Self::new(data.category, data.reasoning, data.score)
    }
}

impl From<CategoryScore> for CategoryScoreData {
    fn from(score: CategoryScore) -> Self {
        Self {
            category: score.category,
            reasoning: score.reasoning,
            score: i64::from(score.score),
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Per-category scores for one candidate, in category order.
///
/// Candidates are compared by [`Evaluation::total`] only: the sum of the
/// category scores, unweighted. [`Evaluation::average`] exists for display
/// and is never used to accept or reject a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EvaluationData", into = "EvaluationData")]
pub struct Evaluation {
    scores: Vec<CategoryScore>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EvaluationData {
    evaluations: Vec<CategoryScore>,
}

impl Evaluation {
    /// Create an evaluation. Fails if `scores` is empty.
    pub fn new(scores: Vec<CategoryScore>) -> Result<Self, ScoreError> {
        if scores.is_empty() {
            return Err(ScoreError::EmptyEvaluation);
        }
        Ok(Self { scores })
    }

    /// One default-score entry per category, all sharing `reasoning`.
    pub fn with_default_scores(
        categories: &[String],
        reasoning: &str,
    ) -> Result<Self, ScoreError> {
        Self::new(
            categories
                .iter()
                .map(|c| CategoryScore::with_default_score(c.as_str(), reasoning))
                .collect(),
        )
    }

    pub fn scores(&self) -> &[CategoryScore] {
        &self.scores
    }

    /// Just the integer scores, in category order.
    pub fn category_scores(&self) -> Vec<u32> {
        self.scores.iter().map(CategoryScore::score).collect()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Sum of all category scores. The sole comparison metric.
    pub fn total(&self) -> u32 {
        self.scores.iter().map(CategoryScore::score).sum()
    }

    /// `total / count`, for display.
    pub fn average(&self) -> f64 {
        f64::from(self.total()) / self.scores.len() as f64
    }

    /// Strictly better: a higher total. Ties are not improvements.
    pub fn is_better_than(&self, other: &Evaluation) -> bool {
        self.total() > other.total()
    }
}

impl TryFrom<EvaluationData> for Evaluation {
    type Error = ScoreError;

    fn try_from(data: EvaluationData) -> Result<Self, Self::Error> {
        Self::new(data.evaluations)
    }
}

impl From<Evaluation> for EvaluationData {
    fn from(evaluation: Evaluation) -> Self {
        Self {
            evaluations: evaluation.scores,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
