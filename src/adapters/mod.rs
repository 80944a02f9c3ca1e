//! LLM-backed implementations of the search collaborators.
//!
//! [`LlmTweetGenerator`] and [`LlmTweetEvaluator`] wrap any [`BaseLLM`]
//! (usually the same shared instance) and translate between the search's
//! typed inputs and chat messages.
//!
//! [`BaseLLM`]: crate::llms::BaseLLM

pub mod evaluator;
pub mod generator;
pub mod prompts;

pub use evaluator::LlmTweetEvaluator;
pub use generator::LlmTweetGenerator;
