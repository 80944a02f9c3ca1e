//! Shared constants for the tweet optimizer.
//!
//! Tweet bounds, the score range, optimisation defaults, the model catalogue,
//! the default evaluation categories and the placeholder reasoning strings
//! used when evaluator output has to be repaired.

// ---------------------------------------------------------------------------
// Tweet bounds
// ---------------------------------------------------------------------------

/// Maximum tweet length in characters.
pub const TWEET_MAX_LENGTH: usize = 280;

/// Suffix appended when a candidate is cut to fit [`TWEET_MAX_LENGTH`].
pub const TWEET_TRUNCATION_SUFFIX: &str = "...";

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

/// Lowest score a category can receive.
pub const MIN_SCORE: u32 = 1;

/// Highest score a category can receive.
pub const MAX_SCORE: u32 = 9;

/// Mid-range score substituted for missing or invalid evaluator output.
pub const DEFAULT_SCORE: u32 = 5;

/// Categories scoring below this are called out in generator feedback.
pub const WEAK_SCORE_THRESHOLD: u32 = 7;

// ---------------------------------------------------------------------------
// Optimisation defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_ITERATIONS: usize = 10;
pub const DEFAULT_PATIENCE: usize = 5;
pub const DEFAULT_USE_CACHE: bool = true;

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

/// Model used when no settings file exists.
pub const DEFAULT_MODEL: &str = "openrouter/anthropic/claude-sonnet-4.5";

/// Display name to model identifier.
///
/// The identifier prefix (`openrouter/`, `ollama/`) selects the provider.
pub const AVAILABLE_MODELS: &[(&str, &str)] = &[
    ("Claude Sonnet 4.5", "openrouter/anthropic/claude-sonnet-4.5"),
    ("Opus 4.1", "openrouter/anthropic/claude-opus-4.1"),
    ("Gemini 2.5 Flash", "openrouter/google/gemini-2.5-flash"),
    ("Gemini 2.5 Flash Lite", "openrouter/google/gemini-2.5-flash-lite"),
    ("Gemini 2.5 Pro", "openrouter/google/gemini-2.5-pro"),
    ("GPT-5", "openrouter/openai/gpt-5"),
    ("Gemma 2 4B", "openrouter/google/gemma-2-4b"),
    ("Gemma 3 4B (Local)", "ollama/gemma3:4b"),
];

// ---------------------------------------------------------------------------
// Provider defaults
// ---------------------------------------------------------------------------

pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const LLM_MAX_TOKENS: u32 = 4096;
pub const LLM_TEMPERATURE: f64 = 0.7;
pub const OLLAMA_API_BASE: &str = "http://localhost:11434";

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Categories written to `categories.json` the first time it is loaded.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Engagement potential - how likely users are to like, retweet, or reply",
    "Clarity and readability - how easy the tweet is to understand",
    "Emotional impact - how well the tweet evokes feelings or reactions",
    "Relevance to target audience - how well it resonates with intended readers",
];

/// Owned copy of [`DEFAULT_CATEGORIES`].
pub fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

pub const CATEGORIES_FILE: &str = "categories.json";
pub const SETTINGS_FILE: &str = "settings.json";
pub const HISTORY_FILE: &str = "input_history.json";

/// Most inputs kept in `input_history.json`.
pub const MAX_HISTORY_ITEMS: usize = 50;

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

pub const CATEGORY_DISPLAY_MAX_LENGTH: usize = 30;
pub const HISTORY_TRUNCATE_LENGTH: usize = 75;

// ---------------------------------------------------------------------------
// Placeholder reasoning
// ---------------------------------------------------------------------------

pub const REASONING_PARSING_ERROR: &str = "Default evaluation due to parsing error";
pub const REASONING_VALIDATION_ERROR: &str = "Default evaluation due to validation error";
pub const REASONING_MISSING: &str = "No reasoning provided";
