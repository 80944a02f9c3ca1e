//! Tweet generation through an LLM.

use std::sync::Arc;

use super::prompts::{build_generator_messages, clean_generated_tweet};
use crate::errors::GenerationError;
use crate::evaluation::Evaluation;
use crate::llms::BaseLLM;
use crate::search::Generator;

/// A [`Generator`] that asks an LLM for each candidate.
///
/// The reply is cleaned of fences, labels and quotes; bounding to the
/// tweet length happens in the search.
#[derive(Debug, Clone)]
pub struct LlmTweetGenerator {
    llm: Arc<dyn BaseLLM>,
}

impl LlmTweetGenerator {
    pub fn new(llm: Arc<dyn BaseLLM>) -> Self {
        Self { llm }
    }

    pub fn llm(&self) -> &Arc<dyn BaseLLM> {
        &self.llm
    }
}

impl Generator for LlmTweetGenerator {
    fn generate(
        &self,
        original_text: &str,
        current_tweet: &str,
        previous_evaluation: Option<&Evaluation>,
    ) -> Result<String, GenerationError> {
        let messages = build_generator_messages(original_text, current_tweet, previous_evaluation);
        let reply = self.llm.call(messages)?;
        let tweet = clean_generated_tweet(&reply);
        log::debug!(
            "Generated candidate ({} chars) with {}",
            tweet.chars().count(),
            self.llm.model()
        );
        Ok(tweet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fake::FakeLLM;
    use crate::evaluation::CategoryScore;

    #[test]
    fn test_generate_first_candidate() {
        let llm = Arc::new(FakeLLM::replying(&["\"Rust 2.0 is here!\""]));
        let generator = LlmTweetGenerator::new(llm.clone());

        let tweet = generator.generate("Rust 2.0 ships today", "", None).unwrap();
        assert_eq!(tweet, "Rust 2.0 is here!");

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0][1].content.contains("Rust 2.0 ships today"));
    }

    #[test]
    fn test_generate_passes_feedback() {
        let llm = Arc::new(FakeLLM::replying(&["better"]));
        let generator = LlmTweetGenerator::new(llm.clone());
        let evaluation =
            Evaluation::new(vec![CategoryScore::new("Clarity", "wordy", 3).unwrap()]).unwrap();

        generator
            .generate("original", "current best", Some(&evaluation))
            .unwrap();
        let prompt = &llm.requests()[0][1].content;
        assert!(prompt.contains("current best"));
        assert!(prompt.contains("Clarity (Score: 3/9): wordy"));
    }

    #[test]
    fn test_llm_failure_is_a_generation_error() {
        let generator = LlmTweetGenerator::new(Arc::new(FakeLLM::failing("boom")));
        let err = generator.generate("original", "", None).unwrap_err();
        assert!(matches!(err, GenerationError::Llm(_)));
        assert!(err.to_string().contains("boom"));
    }
}
