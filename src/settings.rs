//! User settings persisted in `settings.json`.

use serde::{Deserialize, Serialize};

use crate::constants::{
    AVAILABLE_MODELS, DEFAULT_ITERATIONS, DEFAULT_MODEL, DEFAULT_PATIENCE, DEFAULT_USE_CACHE,
};
use crate::errors::ConfigurationError;
use crate::llms::BaseLLMState;

/// Provider prefixes [`crate::llms::create_llm`] understands.
pub const KNOWN_PROVIDERS: &[&str] = &["openrouter", "ollama"];

/// Missing keys take their default, so older or hand-edited files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `provider/model` identifier.
    pub selected_model: String,
    /// Iteration cap for a run.
    pub iterations: usize,
    /// Consecutive non-improving rounds before stopping.
    pub patience: usize,
    /// Kept for file compatibility; responses are never cached.
    pub use_cache: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            selected_model: DEFAULT_MODEL.to_string(),
            iterations: DEFAULT_ITERATIONS,
            patience: DEFAULT_PATIENCE,
            use_cache: DEFAULT_USE_CACHE,
        }
    }
}

impl Settings {
    /// # Errors
    ///
    /// [`ConfigurationError`] for zero iterations or patience, or a model
    /// without a known provider prefix.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.iterations == 0 {
            return Err(ConfigurationError::InvalidMaxIterations);
        }
        if self.patience == 0 {
            return Err(ConfigurationError::InvalidPatience);
        }
        match BaseLLMState::split_provider(&self.selected_model) {
            Some((provider, _)) if KNOWN_PROVIDERS.contains(&provider) => Ok(()),
            other => Err(ConfigurationError::UnknownProvider {
                provider: other.map(|(p, _)| p.to_string()).unwrap_or_default(),
                model: self.selected_model.clone(),
            }),
        }
    }

    /// Catalogue display name of the selected model, if it is listed.
    pub fn model_display_name(&self) -> Option<&'static str> {
        AVAILABLE_MODELS
            .iter()
            .find(|(_, id)| *id == self.selected_model)
            .map(|(name, _)| *name)
    }
}
