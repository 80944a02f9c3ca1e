//! Hill-climbing search over candidate tweets.
//!
//! [`HillClimbingSearch`] owns the generate → evaluate → compare → emit
//! cycle. [`HillClimbingSearch::run`] returns a [`SearchRun`], a lazy,
//! single-pass iterator: each call to `next` performs exactly one round of
//! collaborator calls and yields its [`IterationRecord`]. Nothing is
//! computed ahead of the consumer, so a consumer that stops pulling has
//! cancelled the run.
//!
//! # State machine
//!
//! ```text
//! Initializing ──first record──▶ Iterating ──┬─▶ Terminated(PatienceExhausted)
//!      │                          ▲    │      ├─▶ Terminated(MaxIterationsReached)
//!      │                          └────┘      └─▶ Terminated(UserCancelled)
//!      └──fatal error──▶ Terminated(InitialFailure)
//! ```
//!
//! The first candidate is always accepted. After that a candidate replaces
//! the best only when its [`Evaluation::total`] is strictly greater; ties
//! count against patience. Generator or evaluator failures after the first
//! round are absorbed as non-improving rounds.

pub mod collaborators;
pub mod feedback;
#[cfg(test)]
pub(crate) mod testing;

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use collaborators::{Evaluator, Generator};

use crate::constants::{REASONING_PARSING_ERROR, TWEET_MAX_LENGTH, TWEET_TRUNCATION_SUFFIX};
use crate::errors::{
    ConfigurationError, EvaluationError, GenerationError, InvalidInputError, SearchError,
};
use crate::evaluation::Evaluation;
use crate::utilities::text::truncate_tweet;
use feedback::format_evaluation_for_generator;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// What the generator was given in one round. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorInputs {
    pub original_text: String,
    pub current_tweet: String,
    /// The best evaluation rendered by [`format_evaluation_for_generator`].
    pub feedback: String,
}

/// What the evaluator was given in one round. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorInputs {
    pub original_text: String,
    pub current_best_tweet: String,
    /// Empty when generation failed before anything could be evaluated.
    pub candidate_text: String,
    pub categories: Vec<String>,
}

/// The outcome of one round, yielded by [`SearchRun`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 0-based round number.
    pub iteration: usize,
    /// The new candidate if it was accepted, otherwise the unchanged best.
    pub candidate_text: String,
    /// The evaluation obtained this round, even when the candidate was
    /// rejected. After an absorbed failure this is the best evaluation.
    pub evaluation: Evaluation,
    pub is_improvement: bool,
    /// Consecutive non-improving rounds, after this round's decision.
    pub patience_counter: usize,
    pub generator_inputs: GeneratorInputs,
    pub evaluator_inputs: EvaluatorInputs,
    /// The absorbed collaborator error, if this round failed.
    pub failure: Option<String>,
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// `patience` consecutive rounds without improvement.
    PatienceExhausted,
    /// `max_iterations` records were emitted.
    MaxIterationsReached,
    /// The consumer called [`SearchRun::cancel`].
    UserCancelled,
    /// The first generation or evaluation failed; the error was yielded.
    InitialFailure,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PatienceExhausted => write!(f, "patience exhausted"),
            Self::MaxIterationsReached => write!(f, "max iterations reached"),
            Self::UserCancelled => write!(f, "cancelled"),
            Self::InitialFailure => write!(f, "initial candidate failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Initializing,
    Iterating,
    Terminated(StopReason),
}

// ---------------------------------------------------------------------------
// HillClimbingSearch
// ---------------------------------------------------------------------------

/// Configured search over one category list. Holds no per-run state, so a
/// single instance can serve any number of sequential runs.
#[derive(Debug, Clone)]
pub struct HillClimbingSearch<G, E> {
    generator: G,
    evaluator: E,
    categories: Vec<String>,
    max_iterations: usize,
    patience: usize,
    max_length: usize,
    truncation_suffix: String,
}

impl<G: Generator, E: Evaluator> HillClimbingSearch<G, E> {
    /// Create a search.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError`] if `categories` is empty or contains a blank
    /// entry, or if `max_iterations` or `patience` is zero.
    pub fn new(
        generator: G,
        evaluator: E,
        categories: Vec<String>,
        max_iterations: usize,
        patience: usize,
    ) -> Result<Self, ConfigurationError> {
        if categories.is_empty() {
            return Err(ConfigurationError::EmptyCategories);
        }
        if let Some(index) = categories.iter().position(|c| c.trim().is_empty()) {
            return Err(ConfigurationError::BlankCategory { index });
        }
        if max_iterations == 0 {
            return Err(ConfigurationError::InvalidMaxIterations);
        }
        if patience == 0 {
            return Err(ConfigurationError::InvalidPatience);
        }

        Ok(Self {
            generator,
            evaluator,
            categories,
            max_iterations,
            patience,
            max_length: TWEET_MAX_LENGTH,
            truncation_suffix: TWEET_TRUNCATION_SUFFIX.to_string(),
        })
    }

    /// Bound candidates to `max_length` characters instead of 280.
    pub fn with_length_limit(
        mut self,
        max_length: usize,
        suffix: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        let suffix = suffix.into();
        if max_length <= suffix.chars().count() {
            return Err(ConfigurationError::InvalidLengthLimit { max_length, suffix });
        }
        self.max_length = max_length;
        self.truncation_suffix = suffix;
        Ok(self)
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn patience(&self) -> usize {
        self.patience
    }

    /// Start optimising `original_text`.
    ///
    /// No collaborator is called until the returned run is pulled.
    ///
    /// # Errors
    ///
    /// [`InvalidInputError`] if `original_text` is blank.
    pub fn run(&self, original_text: &str) -> Result<SearchRun<'_, G, E>, InvalidInputError> {
        if original_text.trim().is_empty() {
            return Err(InvalidInputError);
        }

        let run_id = Uuid::new_v4();
        log::debug!(
            "[run {}] starting: categories={}, max_iterations={}, patience={}",
            run_id,
            self.categories.len(),
            self.max_iterations,
            self.patience
        );

        Ok(SearchRun {
            search: self,
            original_text: original_text.to_string(),
            run_id,
            state: None,
            status: SearchStatus::Initializing,
        })
    }

    /// Generate and bound one candidate.
    fn generate_candidate(
        &self,
        original_text: &str,
        current_tweet: &str,
        previous_evaluation: Option<&Evaluation>,
    ) -> Result<String, GenerationError> {
        let raw = self
            .generator
            .generate(original_text, current_tweet, previous_evaluation)?;
        let candidate = truncate_tweet(&raw, self.max_length, &self.truncation_suffix);
        if candidate.is_empty() {
            return Err(GenerationError::EmptyCandidate);
        }
        Ok(candidate)
    }

    /// Evaluate one candidate, repairing a score list of the wrong length.
    fn evaluate_candidate(
        &self,
        original_text: &str,
        current_best_tweet: &str,
        candidate_text: &str,
    ) -> Result<Evaluation, SearchError> {
        let evaluation = self.evaluator.evaluate(
            original_text,
            current_best_tweet,
            candidate_text,
            &self.categories,
        )?;

        if evaluation.len() == self.categories.len() {
            return Ok(evaluation);
        }

        log::warn!(
            "Evaluator returned {} scores for {} categories, substituting defaults",
            evaluation.len(),
            self.categories.len()
        );
        // Categories are non-empty by construction, so this cannot fail.
        Evaluation::with_default_scores(&self.categories, REASONING_PARSING_ERROR)
            .map_err(|e| EvaluationError::Other(e.to_string()).into())
    }
}

// ---------------------------------------------------------------------------
// SearchRun
// ---------------------------------------------------------------------------

/// Best-so-far state of one run. Candidate and evaluation change together.
#[derive(Debug, Clone)]
struct SearchState {
    best_candidate: String,
    best_evaluation: Evaluation,
    patience_counter: usize,
    iteration_index: usize,
}

/// Inputs and outcome of one round of collaborator calls.
struct Attempt {
    generator_inputs: GeneratorInputs,
    evaluator_inputs: EvaluatorInputs,
    outcome: Result<(String, Evaluation), SearchError>,
}

/// A lazy, single-pass run of a [`HillClimbingSearch`].
///
/// Yields at most `max_iterations` items. The first item is `Err` only if
/// the initial round failed, and then it is also the last. Every later item
/// is `Ok`.
#[derive(Debug)]
pub struct SearchRun<'a, G, E> {
    search: &'a HillClimbingSearch<G, E>,
    original_text: String,
    run_id: Uuid,
    state: Option<SearchState>,
    status: SearchStatus,
}

impl<'a, G: Generator, E: Evaluator> SearchRun<'a, G, E> {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    /// The best candidate so far, once the first round has succeeded.
    pub fn best_candidate(&self) -> Option<&str> {
        self.state.as_ref().map(|s| s.best_candidate.as_str())
    }

    /// The evaluation of [`SearchRun::best_candidate`].
    pub fn best_evaluation(&self) -> Option<&Evaluation> {
        self.state.as_ref().map(|s| &s.best_evaluation)
    }

    pub fn iterations_completed(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.iteration_index)
    }

    /// Stop the run. Later calls to `next` return `None`.
    pub fn cancel(&mut self) {
        if !matches!(self.status, SearchStatus::Terminated(_)) {
            log::info!("[run {}] cancelled by consumer", self.run_id);
            self.status = SearchStatus::Terminated(StopReason::UserCancelled);
        }
    }

    fn attempt(&self, current_best: &str, previous_evaluation: Option<&Evaluation>) -> Attempt {
        let search = self.search;
        let generator_inputs = GeneratorInputs {
            original_text: self.original_text.clone(),
            current_tweet: current_best.to_string(),
            feedback: format_evaluation_for_generator(previous_evaluation),
        };
        let mut evaluator_inputs = EvaluatorInputs {
            original_text: self.original_text.clone(),
            current_best_tweet: current_best.to_string(),
            candidate_text: String::new(),
            categories: search.categories.clone(),
        };

        let outcome = search
            .generate_candidate(&self.original_text, current_best, previous_evaluation)
            .map_err(SearchError::from)
            .and_then(|candidate| {
                evaluator_inputs.candidate_text = candidate.clone();
                search
                    .evaluate_candidate(&self.original_text, current_best, &candidate)
                    .map(|evaluation| (candidate, evaluation))
            });

        Attempt {
            generator_inputs,
            evaluator_inputs,
            outcome,
        }
    }

    fn initial_step(&mut self) -> Result<IterationRecord, SearchError> {
        let attempt = self.attempt("", None);
        let (candidate, evaluation) = match attempt.outcome {
            Ok(pair) => pair,
            Err(err) => {
                log::warn!("[run {}] initial candidate failed: {}", self.run_id, err);
                self.status = SearchStatus::Terminated(StopReason::InitialFailure);
                return Err(err);
            }
        };

        log::info!(
            "[run {}] iteration 0: initial candidate scored {}",
            self.run_id,
            evaluation.total()
        );

        let state = SearchState {
            best_candidate: candidate.clone(),
            best_evaluation: evaluation.clone(),
            patience_counter: 0,
            iteration_index: 1,
        };
        let record = IterationRecord {
            iteration: 0,
            candidate_text: candidate,
            evaluation,
            is_improvement: true,
            patience_counter: 0,
            generator_inputs: attempt.generator_inputs,
            evaluator_inputs: attempt.evaluator_inputs,
            failure: None,
        };

        self.status = self.next_status(&state);
        self.state = Some(state);
        Ok(record)
    }

    fn improvement_step(&mut self, mut state: SearchState) -> IterationRecord {
        let iteration = state.iteration_index;
        let attempt = self.attempt(&state.best_candidate, Some(&state.best_evaluation));

        let (candidate_text, evaluation, is_improvement, failure) = match attempt.outcome {
            Ok((candidate, evaluation)) if evaluation.is_better_than(&state.best_evaluation) => {
                log::info!(
                    "[run {}] iteration {}: improved {} -> {}",
                    self.run_id,
                    iteration,
                    state.best_evaluation.total(),
                    evaluation.total()
                );
                state.best_candidate = candidate.clone();
                state.best_evaluation = evaluation.clone();
                state.patience_counter = 0;
                (candidate, evaluation, true, None)
            }
            Ok((_, evaluation)) => {
                state.patience_counter += 1;
                log::debug!(
                    "[run {}] iteration {}: {} does not beat {} (patience {}/{})",
                    self.run_id,
                    iteration,
                    evaluation.total(),
                    state.best_evaluation.total(),
                    state.patience_counter,
                    self.search.patience
                );
                (state.best_candidate.clone(), evaluation, false, None)
            }
            Err(err) => {
                state.patience_counter += 1;
                log::warn!(
                    "[run {}] iteration {} failed, counting as no improvement: {}",
                    self.run_id,
                    iteration,
                    err
                );
                (
                    state.best_candidate.clone(),
                    state.best_evaluation.clone(),
                    false,
                    Some(err.to_string()),
                )
            }
        };

        state.iteration_index += 1;
        let record = IterationRecord {
            iteration,
            candidate_text,
            evaluation,
            is_improvement,
            patience_counter: state.patience_counter,
            generator_inputs: attempt.generator_inputs,
            evaluator_inputs: attempt.evaluator_inputs,
            failure,
        };

        self.status = self.next_status(&state);
        self.state = Some(state);
        record
    }

    /// Patience is checked before the iteration cap.
    fn next_status(&self, state: &SearchState) -> SearchStatus {
        let status = if state.patience_counter >= self.search.patience {
            SearchStatus::Terminated(StopReason::PatienceExhausted)
        } else if state.iteration_index >= self.search.max_iterations {
            SearchStatus::Terminated(StopReason::MaxIterationsReached)
        } else {
            SearchStatus::Iterating
        };

        if let SearchStatus::Terminated(reason) = status {
            log::info!(
                "[run {}] finished after {} iterations ({}), best total {}",
                self.run_id,
                state.iteration_index,
                reason,
                state.best_evaluation.total()
            );
        }
        status
    }
}

impl<'a, G: Generator, E: Evaluator> Iterator for SearchRun<'a, G, E> {
    type Item = Result<IterationRecord, SearchError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.status {
            SearchStatus::Terminated(_) => None,
            SearchStatus::Initializing => Some(self.initial_step()),
            SearchStatus::Iterating => {
                let state = self.state.take()?;
                Some(Ok(self.improvement_step(state)))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.status {
            SearchStatus::Terminated(_) => (0, Some(0)),
            _ => (
                0,
                Some(self.search.max_iterations - self.iterations_completed()),
            ),
        }
    }
}

impl<'a, G: Generator, E: Evaluator> FusedIterator for SearchRun<'a, G, E> {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
