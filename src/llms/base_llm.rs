//! Base LLM trait and shared provider state.
//!
//! Every provider implements the async [`BaseLLM::acall`]; the blocking
//! [`BaseLLM::call`] drives it on a private current-thread runtime so the
//! single-threaded search loop can use any provider without an executor of
//! its own.

use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::LlmError;
use crate::types::usage_metrics::UsageMetrics;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Request timeout applied when a provider is not given one.
pub const DEFAULT_TIMEOUT_SECS: f64 = 120.0;

/// Retries after the first attempt on transport errors, 429 and 5xx.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A single chat message in the OpenAI-compatible `{role, content}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LLMMessage {
    pub role: String,
    pub content: String,
}

impl LLMMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// BaseLLM trait
// ---------------------------------------------------------------------------

/// A chat-completion backend.
///
/// Implementations own their transport concerns: timeouts, retries and
/// credential checks all happen inside `acall`.
#[async_trait]
pub trait BaseLLM: Send + Sync + fmt::Debug {
    /// Model identifier as the provider expects it (no provider prefix).
    fn model(&self) -> &str;

    fn temperature(&self) -> Option<f64>;

    /// Provider name, e.g. `"openrouter"`.
    fn provider(&self) -> &str;

    /// Send `messages` and return the assistant's text.
    async fn acall(&self, messages: Vec<LLMMessage>) -> Result<String, LlmError>;

    /// Blocking wrapper around [`BaseLLM::acall`].
    ///
    /// Must not be called from inside an async runtime.
    fn call(&self, messages: Vec<LLMMessage>) -> Result<String, LlmError> {
        log::debug!(
            "{}.call: model={}, messages={}",
            self.provider(),
            self.model(),
            messages.len()
        );
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        rt.block_on(self.acall(messages))
    }

    /// Token usage accumulated over every successful call.
    fn get_token_usage_summary(&self) -> UsageMetrics;
}

// ---------------------------------------------------------------------------
// BaseLLMState
// ---------------------------------------------------------------------------

/// Fields and helpers shared by the concrete providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseLLMState {
    pub model: String,
    pub temperature: Option<f64>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub provider: String,
    pub max_tokens: Option<u32>,
    /// Request timeout in seconds.
    pub timeout: f64,
    pub max_retries: u32,
    #[serde(skip)]
    token_usage: Arc<Mutex<UsageMetrics>>,
}

impl BaseLLMState {
    pub fn new(model: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            api_key: None,
            base_url: None,
            provider: provider.into(),
            max_tokens: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            token_usage: Arc::new(Mutex::new(UsageMetrics::default())),
        }
    }

    /// Record one successful request from a provider `usage` object.
    ///
    /// Understands OpenAI-style (`prompt_tokens`/`completion_tokens`) and
    /// Ollama-style (`prompt_eval_count`/`eval_count`) field names.
    pub fn track_token_usage(&self, usage: &Value) {
        let field = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| usage.get(*name).and_then(Value::as_i64))
                .unwrap_or(0)
        };
        let prompt_tokens = field(&["prompt_tokens", "prompt_eval_count", "input_tokens"]);
        let completion_tokens = field(&["completion_tokens", "eval_count", "output_tokens"]);
        let cached_tokens = usage
            .get("prompt_tokens_details")
            .and_then(|d| d.get("cached_tokens"))
            .and_then(Value::as_i64)
            .unwrap_or(0);

        log::debug!(
            "{} token usage: prompt={}, completion={}, cached={}",
            self.provider,
            prompt_tokens,
            completion_tokens,
            cached_tokens
        );

        if let Ok(mut metrics) = self.token_usage.lock() {
            metrics.add_usage_metrics(&UsageMetrics {
                total_tokens: prompt_tokens + completion_tokens,
                prompt_tokens,
                cached_prompt_tokens: cached_tokens,
                completion_tokens,
                successful_requests: 1,
            });
        }
    }

    pub fn get_token_usage_summary(&self) -> UsageMetrics {
        self.token_usage
            .lock()
            .map(|metrics| metrics.clone())
            .unwrap_or_default()
    }

    /// Split `"provider/model"` into its parts. The model part may itself
    /// contain slashes (`openrouter/anthropic/claude-sonnet-4.5`).
    pub fn split_provider(model: &str) -> Option<(&str, &str)> {
        model
            .split_once('/')
            .filter(|(provider, rest)| !provider.is_empty() && !rest.is_empty())
    }
}
