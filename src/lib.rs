//! # tweet-optimizer
//!
//! Hill-climbing optimisation of tweets with LLM collaborators.
//!
//! A [`Generator`] proposes a rewrite of the original text, an [`Evaluator`]
//! scores it from 1 to 9 on each user-defined category, and
//! [`HillClimbingSearch`] keeps a candidate only when its total score is
//! strictly higher than the best so far. Runs are lazy iterators of
//! [`IterationRecord`]s that stop after `max_iterations` records or
//! `patience` consecutive non-improving rounds.
//!
//! ```ignore
//! use std::sync::Arc;
//! use tweet_optimizer::{create_llm, HillClimbingSearch, LlmOverrides};
//! use tweet_optimizer::adapters::{LlmTweetEvaluator, LlmTweetGenerator};
//!
//! let llm = create_llm("openrouter/anthropic/claude-sonnet-4.5", &LlmOverrides::default())?;
//! let search = HillClimbingSearch::new(
//!     LlmTweetGenerator::new(Arc::clone(&llm)),
//!     LlmTweetEvaluator::new(llm),
//!     vec!["Clarity".into(), "Engagement".into()],
//!     10,
//!     3,
//! )?;
//! for record in search.run("We shipped async closures today")? {
//!     let record = record?;
//!     println!("{} -> {}", record.iteration, record.evaluation.total());
//! }
//! ```

pub mod adapters;
pub mod constants;
pub mod errors;
pub mod evaluation;
pub mod llms;
pub mod search;
pub mod session;
pub mod settings;
pub mod storage;
pub mod types;
pub mod utilities;

pub use errors::{
    ConfigurationError, EvaluationError, GenerationError, InvalidInputError, LlmError,
    ScoreError, SearchError, StorageError,
};
pub use evaluation::{CategoryScore, Evaluation};
pub use llms::{create_llm, BaseLLM, LlmOverrides};
pub use search::{
    Evaluator, Generator, HillClimbingSearch, IterationRecord, SearchRun, SearchStatus,
    StopReason,
};
pub use session::OptimizationSession;
pub use settings::Settings;
pub use storage::Store;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
