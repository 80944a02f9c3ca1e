//! Ollama provider for locally served models.
//!
//! Uses the non-streaming `/api/chat` endpoint. No credentials are needed;
//! the server address comes from `OLLAMA_BASE_URL` or defaults to
//! `http://localhost:11434`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::post_json_with_retries;
use crate::constants::{OLLAMA_API_BASE, LLM_MAX_TOKENS, LLM_TEMPERATURE};
use crate::errors::LlmError;
use crate::llms::base_llm::{BaseLLM, BaseLLMState, LLMMessage};
use crate::types::usage_metrics::UsageMetrics;

const PROVIDER: &str = "ollama";
const DISPLAY_NAME: &str = "Ollama";

pub const OLLAMA_BASE_URL_ENV: &str = "OLLAMA_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaCompletion {
    #[serde(flatten)]
    pub state: BaseLLMState,
}

impl OllamaCompletion {
    /// Create a provider for `model` (without the `ollama/` prefix).
    pub fn new(model: impl Into<String>, base_url: Option<String>) -> Self {
        let mut state = BaseLLMState::new(model, PROVIDER);
        state.base_url = base_url.or_else(|| std::env::var(OLLAMA_BASE_URL_ENV).ok());
        state.temperature = Some(LLM_TEMPERATURE);
        state.max_tokens = Some(LLM_MAX_TOKENS);
        Self { state }
    }

    pub fn api_base_url(&self) -> &str {
        self.state
            .base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(OLLAMA_API_BASE)
            .trim_end_matches('/')
    }

    pub fn build_request_body(&self, messages: &[LLMMessage]) -> Value {
        let mut options = serde_json::Map::new();
        if let Some(temp) = self.state.temperature {
            options.insert("temperature".into(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = self.state.max_tokens {
            options.insert("num_predict".into(), serde_json::json!(max_tokens));
        }

        serde_json::json!({
            "model": self.state.model,
            "messages": messages,
            "stream": false,
            "options": options,
        })
    }

    /// Pull the assistant text out of an `/api/chat` reply.
    pub fn parse_response(&self, response: &Value) -> Result<String, LlmError> {
        if let Some(error) = response.get("error").and_then(Value::as_str) {
            return Err(LlmError::InvalidResponse {
                provider: DISPLAY_NAME,
                message: error.to_string(),
            });
        }

        let content = response
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| LlmError::InvalidResponse {
                provider: DISPLAY_NAME,
                message: "no message content in response".to_string(),
            })?;

        self.state.track_token_usage(response);
        Ok(content.to_string())
    }
}

#[async_trait]
impl BaseLLM for OllamaCompletion {
    fn model(&self) -> &str {
        &self.state.model
    }

    fn temperature(&self) -> Option<f64> {
        self.state.temperature
    }

    fn provider(&self) -> &str {
        PROVIDER
    }

    async fn acall(&self, messages: Vec<LLMMessage>) -> Result<String, LlmError> {
        log::debug!(
            "OllamaCompletion.acall: model={}, messages={}",
            self.state.model,
            messages.len()
        );

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let endpoint = format!("{}/api/chat", self.api_base_url());
        let response = post_json_with_retries(
            DISPLAY_NAME,
            &endpoint,
            headers,
            &self.build_request_body(&messages),
            self.state.timeout,
            self.state.max_retries,
        )
        .await?;

        self.parse_response(&response)
    }

    fn get_token_usage_summary(&self) -> UsageMetrics {
        self.state.get_token_usage_summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_explicit_base_url_wins() {
        let llm = OllamaCompletion::new("gemma3:4b", Some("http://gpu-box:11434/".into()));
        assert_eq!(llm.api_base_url(), "http://gpu-box:11434");
        assert_eq!(llm.provider(), "ollama");
        assert_eq!(llm.model(), "gemma3:4b");
    }

    #[test]
    fn test_request_body() {
        let llm = OllamaCompletion::new("gemma3:4b", Some(OLLAMA_API_BASE.into()));
        let body = llm.build_request_body(&[LLMMessage::user("hello")]);
        assert_eq!(body["stream"], false);
        assert_eq!(body["model"], "gemma3:4b");
        assert_eq!(body["options"]["num_predict"], 4096);
        assert_eq!(body["messages"][0]["content"], "hello");
    }

    #[test]
    fn test_parse_response() {
        let llm = OllamaCompletion::new("gemma3:4b", Some(OLLAMA_API_BASE.into()));
        let reply = json!({
            "model": "gemma3:4b",
            "message": {"role": "assistant", "content": "short and sweet"},
            "done": true,
            "prompt_eval_count": 30,
            "eval_count": 12
        });
        assert_eq!(llm.parse_response(&reply).unwrap(), "short and sweet");
        assert_eq!(llm.get_token_usage_summary().total_tokens, 42);
    }

    #[test]
    fn test_parse_error_reply() {
        let llm = OllamaCompletion::new("missing", Some(OLLAMA_API_BASE.into()));
        let err = llm
            .parse_response(&json!({"error": "model 'missing' not found"}))
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
        assert_eq!(llm.get_token_usage_summary().successful_requests, 0);
    }
}
