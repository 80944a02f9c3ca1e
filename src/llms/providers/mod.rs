//! LLM provider implementations.
//!
//! | Provider | Module | Endpoint |
//! |----------|--------|----------|
//! | OpenRouter | [`openrouter`] | `POST {base}/chat/completions` (OpenAI-compatible) |
//! | Ollama | [`ollama`] | `POST {base}/api/chat` |
//!
//! Both go through [`post_json_with_retries`], which retries transport
//! errors, 429 and 5xx with exponential backoff and returns 4xx at once.

pub mod ollama;
pub mod openrouter;

use std::time::Duration;

use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::errors::LlmError;

/// Delay before the first retry; doubled after every retry.
const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(1);

/// POST `body` to `endpoint` and parse the JSON reply.
///
/// Makes at most `max_retries + 1` attempts.
pub(crate) async fn post_json_with_retries(
    provider: &'static str,
    endpoint: &str,
    headers: HeaderMap,
    body: &Value,
    timeout_secs: f64,
    max_retries: u32,
) -> Result<Value, LlmError> {
    let timeout = Duration::try_from_secs_f64(timeout_secs)
        .ok()
        .filter(|t| !t.is_zero())
        .ok_or(LlmError::InvalidTimeout {
            provider,
            timeout: timeout_secs,
        })?;
    let client = reqwest::Client::builder().timeout(timeout).build()?;

    let mut last_error = String::from("no attempt made");
    let mut retry_delay = INITIAL_RETRY_DELAY;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            log::warn!(
                "{} API retry attempt {} after {:?}: {}",
                provider,
                attempt,
                retry_delay,
                last_error
            );
            tokio::time::sleep(retry_delay).await;
            retry_delay *= 2;
        }

        let response = match client
            .post(endpoint)
            .headers(headers.clone())
            .json(body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                last_error = e.to_string();
                continue;
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            last_error = format!("rate limited by {} API (429)", provider);
            continue;
        }
        if status.is_server_error() {
            last_error = format!("{} API server error: {}", provider, status);
            continue;
        }

        let response_text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                last_error = e.to_string();
                continue;
            }
        };

        if !status.is_success() {
            return Err(LlmError::Api {
                provider,
                status: status.as_u16(),
                body: response_text,
            });
        }

        return serde_json::from_str(&response_text).map_err(|e| LlmError::InvalidResponse {
            provider,
            message: format!(
                "{} - body: {}",
                e,
                response_text.chars().take(500).collect::<String>()
            ),
        });
    }

    Err(LlmError::RetriesExhausted {
        provider,
        attempts: max_retries + 1,
        last_error,
    })
}
