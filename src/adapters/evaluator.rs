//! Tweet evaluation through an LLM.

use std::sync::Arc;

use super::prompts::build_evaluator_messages;
use crate::errors::EvaluationError;
use crate::evaluation::repair::parse_evaluation;
use crate::evaluation::Evaluation;
use crate::llms::BaseLLM;
use crate::search::Evaluator;

/// An [`Evaluator`] that asks an LLM for JSON scores.
///
/// Only transport and provider failures are errors. Whatever text the model
/// returns is repaired into one score per requested category.
#[derive(Debug, Clone)]
pub struct LlmTweetEvaluator {
    llm: Arc<dyn BaseLLM>,
}

impl LlmTweetEvaluator {
    pub fn new(llm: Arc<dyn BaseLLM>) -> Self {
        Self { llm }
    }
}

impl Evaluator for LlmTweetEvaluator {
    fn evaluate(
        &self,
        original_text: &str,
        current_best_tweet: &str,
        candidate_text: &str,
        categories: &[String],
    ) -> Result<Evaluation, EvaluationError> {
        let messages =
            build_evaluator_messages(original_text, current_best_tweet, candidate_text, categories);
        let reply = self.llm.call(messages)?;
        let evaluation = parse_evaluation(categories, &reply)
            .map_err(|e| EvaluationError::Other(e.to_string()))?;
        log::debug!(
            "Evaluated candidate with {}: scores={:?}, total={}",
            self.llm.model(),
            evaluation.category_scores(),
            evaluation.total()
        );
        Ok(evaluation)
    }
}
