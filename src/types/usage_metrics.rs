//! Token usage counters reported by LLM providers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cumulative token usage of one provider instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetrics {
    pub total_tokens: i64,
    pub prompt_tokens: i64,
    pub cached_prompt_tokens: i64,
    pub completion_tokens: i64,
    pub successful_requests: i64,
}

impl UsageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_usage_metrics(&mut self, other: &UsageMetrics) {
        self.total_tokens += other.total_tokens;
        self.prompt_tokens += other.prompt_tokens;
        self.cached_prompt_tokens += other.cached_prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.successful_requests += other.successful_requests;
    }
}

impl fmt::Display for UsageMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requests, {} tokens ({} prompt, {} completion)",
            self.successful_requests, self.total_tokens, self.prompt_tokens, self.completion_tokens
        )
    }
}
