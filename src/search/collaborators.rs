//! The two capabilities the search drives.
//!
//! Implementations include the LLM-backed adapters in [`crate::adapters`]
//! and scripted mocks in tests. Timeouts and retries belong to the
//! implementation; the search never layers its own over them.

use crate::errors::{EvaluationError, GenerationError};
use crate::evaluation::Evaluation;

/// Produces candidate tweets.
pub trait Generator {
    /// Write a candidate for `original_text`.
    ///
    /// On the first call `current_tweet` is empty and `previous_evaluation`
    /// is `None`. Afterwards they hold the current best tweet and its full
    /// per-category evaluation, reasoning included.
    fn generate(
        &self,
        original_text: &str,
        current_tweet: &str,
        previous_evaluation: Option<&Evaluation>,
    ) -> Result<String, GenerationError>;
}

/// Scores candidate tweets against a fixed list of categories.
pub trait Evaluator {
    /// Score `candidate_text`, one entry per category in `categories` order.
    ///
    /// `current_best_tweet` is empty on the first call.
    fn evaluate(
        &self,
        original_text: &str,
        current_best_tweet: &str,
        candidate_text: &str,
        categories: &[String],
    ) -> Result<Evaluation, EvaluationError>;
}

impl<G: Generator + ?Sized> Generator for &G {
    fn generate(
        &self,
        original_text: &str,
        current_tweet: &str,
        previous_evaluation: Option<&Evaluation>,
    ) -> Result<String, GenerationError> {
        (**self).generate(original_text, current_tweet, previous_evaluation)
    }
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    fn generate(
        &self,
        original_text: &str,
        current_tweet: &str,
        previous_evaluation: Option<&Evaluation>,
    ) -> Result<String, GenerationError> {
        (**self).generate(original_text, current_tweet, previous_evaluation)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn evaluate(
        &self,
        original_text: &str,
        current_best_tweet: &str,
        candidate_text: &str,
        categories: &[String],
    ) -> Result<Evaluation, EvaluationError> {
        (**self).evaluate(original_text, current_best_tweet, candidate_text, categories)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(
        &self,
        original_text: &str,
        current_best_tweet: &str,
        candidate_text: &str,
        categories: &[String],
    ) -> Result<Evaluation, EvaluationError> {
        (**self).evaluate(original_text, current_best_tweet, candidate_text, categories)
    }
}
