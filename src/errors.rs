//! Error types for the tweet optimizer.
//!
//! Construction-time and first-iteration failures propagate to the caller;
//! steady-state generator/evaluator failures are absorbed by the search loop
//! and never surface here.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Configuration and input
// ---------------------------------------------------------------------------

/// Invalid construction parameters. Fatal, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No evaluation categories were supplied.
    #[error("at least one evaluation category is required")]
    EmptyCategories,

    /// A category description is blank.
    #[error("category at index {index} is blank")]
    BlankCategory { index: usize },

    /// The iteration cap is zero.
    #[error("max iterations must be at least 1")]
    InvalidMaxIterations,

    /// The patience threshold is zero.
    #[error("patience must be at least 1")]
    InvalidPatience,

    /// The tweet length bound cannot hold the truncation suffix.
    #[error("length limit {max_length} is too small for suffix {suffix:?}")]
    InvalidLengthLimit { max_length: usize, suffix: String },

    /// The model identifier names a provider this crate does not know.
    #[error("unknown provider '{provider}' in model '{model}'")]
    UnknownProvider { provider: String, model: String },

    /// The request timeout is not a positive, finite number of seconds.
    #[error("request timeout must be a positive number of seconds, got {timeout}")]
    InvalidTimeout { timeout: String },
}

/// The text to optimise is empty or whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("original text must not be empty")]
pub struct InvalidInputError;

// ---------------------------------------------------------------------------
// Data model
// ---------------------------------------------------------------------------

/// A score or evaluation that violates the data-model invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("score {score} is outside {min}..={max}")]
    OutOfRange { score: i64, min: u32, max: u32 },

    #[error("category name must not be empty")]
    EmptyCategory,

    #[error("an evaluation needs at least one category score")]
    EmptyEvaluation,
}

// ---------------------------------------------------------------------------
// LLM providers
// ---------------------------------------------------------------------------

/// Transport and protocol failures from an LLM provider.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API key was configured for a provider that needs one.
    #[error("{provider} API key not set (expected {env_var})")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    /// The HTTP request could not be sent or its body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected {provider} response: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },

    /// Every retry attempt failed.
    #[error("{provider} call failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        provider: &'static str,
        attempts: u32,
        last_error: String,
    },

    /// The request timeout cannot be turned into a duration.
    #[error("{provider} request timeout must be a positive number of seconds, got {timeout}")]
    InvalidTimeout { provider: &'static str, timeout: f64 },

    /// The blocking wrapper could not start an async runtime.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// The generator could not produce a candidate.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("tweet generation failed: {0}")]
    Llm(#[from] LlmError),

    /// The candidate was empty once trimmed.
    #[error("tweet generation produced an empty candidate")]
    EmptyCandidate,

    #[error("tweet generation failed: {0}")]
    Other(String),
}

/// The evaluator could not score a candidate.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("tweet evaluation failed: {0}")]
    Llm(#[from] LlmError),

    #[error("tweet evaluation failed: {0}")]
    Other(String),
}

/// A fatal failure yielded by a search run. Only iteration 0 produces these.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Failures reading or writing the JSON data files.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
