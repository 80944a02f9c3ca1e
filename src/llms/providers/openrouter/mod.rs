//! OpenRouter chat-completions provider.
//!
//! OpenRouter speaks the OpenAI Chat Completions protocol, so the request
//! is the familiar `{model, messages, temperature, max_tokens}` body sent
//! with a bearer token, plus the optional `HTTP-Referer` / `X-Title`
//! attribution headers.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::post_json_with_retries;
use crate::constants::{OPENROUTER_API_BASE, LLM_MAX_TOKENS, LLM_TEMPERATURE};
use crate::errors::LlmError;
use crate::llms::base_llm::{BaseLLM, BaseLLMState, LLMMessage};
use crate::types::usage_metrics::UsageMetrics;

const PROVIDER: &str = "openrouter";
const DISPLAY_NAME: &str = "OpenRouter";

/// Environment variable holding the API key.
pub const OPENROUTER_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterCompletion {
    #[serde(flatten)]
    pub state: BaseLLMState,
    /// Sent as `HTTP-Referer`.
    pub site_url: Option<String>,
    /// Sent as `X-Title`.
    pub app_name: Option<String>,
}

impl OpenRouterCompletion {
    /// Create a provider for `model` (without the `openrouter/` prefix).
    ///
    /// `api_key` defaults to `OPENROUTER_API_KEY`. A missing key is only
    /// reported when a call is made.
    pub fn new(model: impl Into<String>, api_key: Option<String>, base_url: Option<String>) -> Self {
        let mut state = BaseLLMState::new(model, PROVIDER);
        state.api_key = api_key.or_else(|| std::env::var(OPENROUTER_API_KEY_ENV).ok());
        state.base_url = base_url;
        state.temperature = Some(LLM_TEMPERATURE);
        state.max_tokens = Some(LLM_MAX_TOKENS);

        Self {
            state,
            site_url: None,
            app_name: Some(env!("CARGO_PKG_NAME").to_string()),
        }
    }

    pub fn with_site_url(mut self, url: impl Into<String>) -> Self {
        self.site_url = Some(url.into());
        self
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn api_base_url(&self) -> &str {
        self.state
            .base_url
            .as_deref()
            .unwrap_or(OPENROUTER_API_BASE)
            .trim_end_matches('/')
    }

    pub fn build_request_body(&self, messages: &[LLMMessage]) -> Value {
        let mut body = serde_json::json!({
            "model": self.state.model,
            "messages": messages,
        });
        if let Some(temp) = self.state.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(max_tokens) = self.state.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        body
    }

    fn headers(&self, api_key: &str) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
            LlmError::InvalidResponse {
                provider: DISPLAY_NAME,
                message: "API key contains characters not allowed in a header".to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(val) = self.site_url.as_deref().and_then(|u| HeaderValue::from_str(u).ok()) {
            headers.insert("HTTP-Referer", val);
        }
        if let Some(val) = self.app_name.as_deref().and_then(|n| HeaderValue::from_str(n).ok()) {
            headers.insert("X-Title", val);
        }
        Ok(headers)
    }

    /// Pull the assistant text out of a chat-completions reply.
    pub fn parse_response(&self, response: &Value) -> Result<String, LlmError> {
        if let Some(usage) = response.get("usage") {
            self.state.track_token_usage(usage);
        }

        let message = response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .ok_or_else(|| LlmError::InvalidResponse {
                provider: DISPLAY_NAME,
                message: "no choices in response".to_string(),
            })?;

        message
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| LlmError::InvalidResponse {
                provider: DISPLAY_NAME,
                message: "choice has no text content".to_string(),
            })
    }
}

#[async_trait]
impl BaseLLM for OpenRouterCompletion {
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
            "OpenRouterCompletion.acall: model={}, messages={}",
            self.state.model,
            messages.len()
        );

        let api_key = self
            .state
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey {
                provider: DISPLAY_NAME,
                env_var: OPENROUTER_API_KEY_ENV,
            })?;

        let endpoint = format!("{}/chat/completions", self.api_base_url());
        let body = self.build_request_body(&messages);
        let response = post_json_with_retries(
            DISPLAY_NAME,
            &endpoint,
            self.headers(api_key)?,
            &body,
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

    fn provider() -> OpenRouterCompletion {
        OpenRouterCompletion::new("anthropic/claude-sonnet-4.5", Some("sk-test".into()), None)
    }

    #[test]
    fn test_defaults() {
        let llm = provider();
        assert_eq!(llm.model(), "anthropic/claude-sonnet-4.5");
        assert_eq!(llm.provider(), "openrouter");
        assert_eq!(llm.temperature(), Some(0.7));
        assert_eq!(llm.state.max_tokens, Some(4096));
        assert_eq!(llm.api_base_url(), "https://openrouter.ai/api/v1");
    }

    #[test]
    fn test_custom_base_url_is_normalised() {
        let llm = OpenRouterCompletion::new("m", Some("k".into()), Some("http://proxy/v1/".into()));
        assert_eq!(llm.api_base_url(), "http://proxy/v1");
    }

    #[test]
    fn test_request_body() {
        let llm = provider();
        let body = llm.build_request_body(&[LLMMessage::system("rules"), LLMMessage::user("hi")]);
        assert_eq!(body["model"], "anthropic/claude-sonnet-4.5");
        assert_eq!(body["messages"][1], json!({"role": "user", "content": "hi"}));
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["temperature"], 0.7);
    }

    #[test]
    fn test_headers() {
        let llm = provider().with_site_url("https://example.com").with_app_name("tweets");
        let headers = llm.headers("sk-test").unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer sk-test");
        assert_eq!(headers["HTTP-Referer"], "https://example.com");
        assert_eq!(headers["X-Title"], "tweets");
    }

    #[test]
    fn test_parse_response_tracks_usage() {
        let llm = provider();
        let reply = json!({
            "choices": [{"message": {"role": "assistant", "content": "A better tweet"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20}
        });
        assert_eq!(llm.parse_response(&reply).unwrap(), "A better tweet");
        let usage = llm.get_token_usage_summary();
        assert_eq!(usage.total_tokens, 20);
        assert_eq!(usage.successful_requests, 1);
    }

    #[test]
    fn test_parse_response_without_choices() {
        let llm = provider();
        let err = llm.parse_response(&json!({"choices": []})).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse { .. }));
        let err = llm
            .parse_response(&json!({"choices": [{"message": {"content": null}}]}))
            .unwrap_err();
        assert!(err.to_string().contains("no text content"));
    }

    #[test]
    fn test_invalid_timeout_fails_before_any_request() {
        for timeout in [-1.0, f64::NAN] {
            let mut llm = provider();
            llm.state.timeout = timeout;
            llm.state.max_retries = 0;
            let err = tokio_test::block_on(llm.acall(vec![LLMMessage::user("hi")])).unwrap_err();
            assert!(matches!(err, LlmError::InvalidTimeout { .. }), "{}", err);
        }
    }

    #[test]
    fn test_missing_api_key_fails_before_any_request() {
        let mut llm = provider();
        llm.state.api_key = None;
        let err = tokio_test::block_on(llm.acall(vec![LLMMessage::user("hi")])).unwrap_err();
        assert!(matches!(
            err,
            LlmError::MissingApiKey {
                env_var: "OPENROUTER_API_KEY",
                ..
            }
        ));
    }
}
