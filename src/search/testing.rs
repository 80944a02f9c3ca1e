//! Scripted collaborators for search tests.

#![allow(dead_code)]

use std::cell::RefCell;

use super::collaborators::{Evaluator, Generator};
use crate::errors::{EvaluationError, GenerationError};
use crate::evaluation::{CategoryScore, Evaluation};

#[derive(Debug, Clone)]
pub(crate) struct GeneratorCall {
    pub original_text: String,
    pub current_tweet: String,
    pub previous_evaluation: Option<Evaluation>,
}

#[derive(Debug, Clone)]
pub(crate) struct EvaluatorCall {
    pub original_text: String,
    pub current_best_tweet: String,
    pub candidate_text: String,
    pub categories: Vec<String>,
}

/// Returns `"candidate <n>"` for call `n` unless scripted otherwise.
#[derive(Debug, Default)]
pub(crate) struct ScriptedGenerator {
    outputs: Vec<String>,
    fail_on: Vec<usize>,
    calls: RefCell<Vec<GeneratorCall>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `outputs[n]` for call `n`, then fall back to the default text.
    pub fn with_outputs(outputs: &[&str]) -> Self {
        Self {
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, calls: &[usize]) -> Self {
        self.fail_on = calls.to_vec();
        self
    }

    pub fn calls(&self) -> Vec<GeneratorCall> {
        self.calls.borrow().clone()
    }
}

impl Generator for ScriptedGenerator {
    fn generate(
        &self,
        original_text: &str,
        current_tweet: &str,
        previous_evaluation: Option<&Evaluation>,
    ) -> Result<String, GenerationError> {
        let n = {
            let mut calls = self.calls.borrow_mut();
            calls.push(GeneratorCall {
                original_text: original_text.to_string(),
                current_tweet: current_tweet.to_string(),
                previous_evaluation: previous_evaluation.cloned(),
            });
            calls.len() - 1
        };

        if self.fail_on.contains(&n) {
            return Err(GenerationError::Other("scripted generator failure".into()));
        }
        Ok(self
            .outputs
            .get(n)
            .cloned()
            .unwrap_or_else(|| format!("candidate {}", n)))
    }
}

/// Scores call `n` with `totals[n]` spread as evenly as possible over
/// `category_count` categories. Calls past the end repeat the last total.
#[derive(Debug, Default)]
pub(crate) struct ScriptedEvaluator {
    scripted: Vec<Vec<u32>>,
    per_category: Option<u32>,
    fail_on: Vec<usize>,
    calls: RefCell<Vec<EvaluatorCall>>,
}

impl ScriptedEvaluator {
    pub fn from_totals(category_count: usize, totals: &[u32]) -> Self {
        Self {
            scripted: totals
                .iter()
                .map(|&total| split_total(total, category_count))
                .collect(),
            ..Self::default()
        }
    }

    /// Every category gets `score` on every call.
    pub fn constant(score: u32) -> Self {
        Self {
            per_category: Some(score),
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, calls: &[usize]) -> Self {
        self.fail_on = calls.to_vec();
        self
    }

    pub fn calls(&self) -> Vec<EvaluatorCall> {
        self.calls.borrow().clone()
    }

    fn scores_for(&self, n: usize, count: usize) -> Result<Vec<u32>, EvaluationError> {
        if let Some(score) = self.per_category {
            return Ok(vec![score; count]);
        }
        let scores = self
            .scripted
            .get(n)
            .or_else(|| self.scripted.last())
            .cloned()
            .unwrap_or_else(|| vec![5; count]);
        if scores.len() != count {
            return Err(EvaluationError::Other(format!(
                "scripted for {} categories, asked for {}",
                scores.len(),
                count
            )));
        }
        Ok(scores)
    }
}

fn split_total(total: u32, count: usize) -> Vec<u32> {
    let count_u32 = count as u32;
    let base = total / count_u32;
    let remainder = (total % count_u32) as usize;
    (0..count)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

impl Evaluator for ScriptedEvaluator {
    fn evaluate(
        &self,
        original_text: &str,
        current_best_tweet: &str,
        candidate_text: &str,
        categories: &[String],
    ) -> Result<Evaluation, EvaluationError> {
        let n = {
            let mut calls = self.calls.borrow_mut();
            calls.push(EvaluatorCall {
                original_text: original_text.to_string(),
                current_best_tweet: current_best_tweet.to_string(),
                candidate_text: candidate_text.to_string(),
                categories: categories.to_vec(),
            });
            calls.len() - 1
        };

        if self.fail_on.contains(&n) {
            return Err(EvaluationError::Other("scripted evaluator failure".into()));
        }

        let scores = categories
            .iter()
            .zip(self.scores_for(n, categories.len())?)
            .map(|(category, score)| {
                CategoryScore::new(category.as_str(), "scripted", i64::from(score))
                    .map_err(|e| EvaluationError::Other(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Evaluation::new(scores).map_err(|e| EvaluationError::Other(e.to_string()))
    }
}

/// Always returns a single score, whatever was asked for.
#[derive(Debug)]
pub(crate) struct ShortEvaluator;

impl Evaluator for ShortEvaluator {
    fn evaluate(
        &self,
        _original_text: &str,
        _current_best_tweet: &str,
        _candidate_text: &str,
        _categories: &[String],
    ) -> Result<Evaluation, EvaluationError> {
        let score = CategoryScore::new("Only", "one entry", 9)
            .map_err(|e| EvaluationError::Other(e.to_string()))?;
        Evaluation::new(vec![score]).map_err(|e| EvaluationError::Other(e.to_string()))
    }
}
