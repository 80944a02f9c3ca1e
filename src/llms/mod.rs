//! LLM backends.
//!
//! - [`base_llm`] - the [`BaseLLM`] trait and shared provider state
//! - [`providers`] - OpenRouter and Ollama implementations
//!
//! [`create_llm`] turns a `provider/model` identifier from the settings
//! file into a ready provider.

pub mod base_llm;
pub mod providers;

use std::sync::Arc;
use std::time::Duration;

pub use base_llm::{BaseLLM, BaseLLMState, LLMMessage};
pub use providers::ollama::OllamaCompletion;
pub use providers::openrouter::OpenRouterCompletion;

use crate::errors::ConfigurationError;

/// Per-invocation overrides for [`create_llm`]. `None` keeps the default.
#[derive(Debug, Clone, Default)]
pub struct LlmOverrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<f64>,
    pub max_retries: Option<u32>,
}

impl LlmOverrides {
    fn validate(&self) -> Result<(), ConfigurationError> {
        match self.timeout_secs {
            Some(timeout)
                if timeout <= 0.0 || Duration::try_from_secs_f64(timeout).is_err() =>
            {
                Err(ConfigurationError::InvalidTimeout {
                    timeout: timeout.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    fn apply(&self, state: &mut BaseLLMState) {
        if let Some(temperature) = self.temperature {
            state.temperature = Some(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            state.max_tokens = Some(max_tokens);
        }
        if let Some(timeout) = self.timeout_secs {
            state.timeout = timeout;
        }
        if let Some(retries) = self.max_retries {
            state.max_retries = retries;
        }
    }
}

/// Build the provider named by `model`'s prefix.
///
/// `openrouter/<vendor>/<model>` selects OpenRouter, `ollama/<model>`
/// selects a local Ollama server.
///
/// # Errors
///
/// [`ConfigurationError::UnknownProvider`] for any other prefix, or when
/// `model` has none. [`ConfigurationError::InvalidTimeout`] when the
/// timeout override is not a positive, finite number of seconds.
pub fn create_llm(
    model: &str,
    overrides: &LlmOverrides,
) -> Result<Arc<dyn BaseLLM>, ConfigurationError> {
    let unknown = |provider: &str| ConfigurationError::UnknownProvider {
        provider: provider.to_string(),
        model: model.to_string(),
    };
    let (provider, name) = BaseLLMState::split_provider(model).ok_or_else(|| unknown(""))?;
    overrides.validate()?;

    log::debug!("Creating {} provider for model {}", provider, name);

    match provider {
        "openrouter" => {
            let mut llm =
                OpenRouterCompletion::new(name, overrides.api_key.clone(), overrides.base_url.clone());
            overrides.apply(&mut llm.state);
            Ok(Arc::new(llm))
        }
        "ollama" => {
            let mut llm = OllamaCompletion::new(name, overrides.base_url.clone());
            overrides.apply(&mut llm.state);
            Ok(Arc::new(llm))
        }
        other => Err(unknown(other)),
    }
}
