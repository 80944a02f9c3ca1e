//! Progress tracking for one optimisation run.
//!
//! [`OptimizationSession`] is the consumer-side bookkeeping of a
//! [`SearchRun`](crate::search::SearchRun): it folds each
//! [`IterationRecord`] into a score history and the display figures the
//! CLI prints. Scores here are shown as per-category averages; the search
//! itself only ever compares totals.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::evaluation::Evaluation;
use crate::search::{EvaluatorInputs, GeneratorInputs, IterationRecord, StopReason};

/// How one category moved between the first and the latest evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTrend {
    pub category: String,
    pub initial: u32,
    pub latest: u32,
}

impl CategoryTrend {
    pub fn delta(&self) -> i64 {
        i64::from(self.latest) - i64::from(self.initial)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationSession {
    max_iterations: usize,
    patience: usize,
    scores_history: Vec<Evaluation>,
    iteration_count: usize,
    no_improvement_count: usize,
    best_tweet: Option<String>,
    best_score: f64,
    latest_tweet: Option<String>,
    last_improved: bool,
    generator_inputs: Option<GeneratorInputs>,
    evaluator_inputs: Option<EvaluatorInputs>,
    failures: usize,
    stop_reason: Option<StopReason>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl OptimizationSession {
    pub fn new(max_iterations: usize, patience: usize) -> Self {
        Self {
            max_iterations,
            patience,
            scores_history: Vec::new(),
            iteration_count: 0,
            no_improvement_count: 0,
            best_tweet: None,
            best_score: 0.0,
            latest_tweet: None,
            last_improved: false,
            generator_inputs: None,
            evaluator_inputs: None,
            failures: 0,
            stop_reason: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Fold one record into the session.
    pub fn observe(&mut self, record: &IterationRecord) {
        self.iteration_count = record.iteration + 1;
        self.no_improvement_count = record.patience_counter;
        self.latest_tweet = Some(record.candidate_text.clone());
        self.generator_inputs = Some(record.generator_inputs.clone());
        self.evaluator_inputs = Some(record.evaluator_inputs.clone());
        self.scores_history.push(record.evaluation.clone());
        self.last_improved = record.is_improvement;

        if record.failure.is_some() {
            self.failures += 1;
        }
        if record.is_improvement {
            self.best_tweet = Some(record.candidate_text.clone());
            self.best_score = record.evaluation.average();
        }
    }

    /// Mark the run as finished.
    pub fn finish(&mut self, reason: StopReason) {
        self.stop_reason = Some(reason);
        self.finished_at = Some(Utc::now());
    }

    /// `"Iteration i/N | Current: x.xx | Best: y.yy | No Improvement: p/P"`,
    /// plus `" | Stopping early"` or `" | Improved!"`.
    pub fn status_line(&self) -> String {
        let current = self
            .scores_history
            .last()
            .map(Evaluation::average)
            .unwrap_or(0.0);

        let mut line = format!(
            "Iteration {}/{} | Current: {:.2} | Best: {:.2} | No Improvement: {}/{}",
            self.iteration_count,
            self.max_iterations,
            current,
            self.best_score,
            self.no_improvement_count,
            self.patience
        );
        if self.no_improvement_count >= self.patience {
            line.push_str(" | Stopping early");
        } else if self.last_improved {
            line.push_str(" | Improved!");
        }
        line
    }

    pub fn completion_line(&self) -> String {
        let mut line = format!(
            "Optimization Complete | {} iterations | Best Score: {:.2}",
            self.iteration_count, self.best_score
        );
        if let Some(reason) = self.stop_reason {
            line.push_str(&format!(" | {}", reason));
        }
        line
    }

    /// Initial vs. latest score per category. Empty before the first record.
    pub fn category_trends(&self) -> Vec<CategoryTrend> {
        let (Some(first), Some(last)) = (self.scores_history.first(), self.scores_history.last())
        else {
            return Vec::new();
        };

        first
            .scores()
            .iter()
            .zip(last.scores())
            .map(|(initial, latest)| CategoryTrend {
                category: latest.category().to_string(),
                initial: initial.score(),
                latest: latest.score(),
            })
            .collect()
    }

    /// Fraction of the iteration budget used, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.max_iterations == 0 {
            return 1.0;
        }
        (self.iteration_count as f64 / self.max_iterations as f64).min(1.0)
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at.unwrap_or_else(Utc::now) - self.started_at
    }

    pub fn scores_history(&self) -> &[Evaluation] {
        &self.scores_history
    }

    pub fn iteration_count(&self) -> usize {
        self.iteration_count
    }

    pub fn no_improvement_count(&self) -> usize {
        self.no_improvement_count
    }

    pub fn best_tweet(&self) -> Option<&str> {
        self.best_tweet.as_deref()
    }

    /// Average per-category score of the best tweet.
    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    pub fn latest_tweet(&self) -> Option<&str> {
        self.latest_tweet.as_deref()
    }

    pub fn generator_inputs(&self) -> Option<&GeneratorInputs> {
        self.generator_inputs.as_ref()
    }

    pub fn evaluator_inputs(&self) -> Option<&EvaluatorInputs> {
        self.evaluator_inputs.as_ref()
    }

    /// Records that carried an absorbed collaborator failure.
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::CategoryScore;

    fn evaluation(scores: &[i64]) -> Evaluation {
        let names = ["Clarity", "Impact", "Tone"];
        Evaluation::new(
            scores
                .iter()
                .zip(names)
                .map(|(s, n)| CategoryScore::new(n, "r", *s).unwrap())
                .collect(),
        )
        .unwrap()
    }

    fn record(
        iteration: usize,
        text: &str,
        scores: &[i64],
        is_improvement: bool,
        patience_counter: usize,
    ) -> IterationRecord {
        IterationRecord {
            iteration,
            candidate_text: text.to_string(),
            evaluation: evaluation(scores),
            is_improvement,
            patience_counter,
            generator_inputs: GeneratorInputs {
                original_text: "orig".into(),
                current_tweet: String::new(),
                feedback: String::new(),
            },
            evaluator_inputs: EvaluatorInputs {
                original_text: "orig".into(),
                current_best_tweet: String::new(),
                candidate_text: text.to_string(),
                categories: vec!["Clarity".into(), "Impact".into()],
            },
            failure: None,
        }
    }

    #[test]
    fn test_observe_tracks_best_and_latest() {
        let mut session = OptimizationSession::new(10, 3);
        session.observe(&record(0, "first", &[5, 6], true, 0));
        assert_eq!(session.best_tweet(), Some("first"));
        assert_eq!(session.best_score(), 5.5);
        assert_eq!(
            session.status_line(),
            "Iteration 1/10 | Current: 5.50 | Best: 5.50 | No Improvement: 0/3 | Improved!"
        );

        session.observe(&record(1, "first", &[4, 4], false, 1));
        assert_eq!(session.best_score(), 5.5);
        assert_eq!(session.latest_tweet(), Some("first"));
        assert_eq!(
            session.status_line(),
            "Iteration 2/10 | Current: 4.00 | Best: 5.50 | No Improvement: 1/3"
        );

        session.observe(&record(2, "second", &[8, 7], true, 0));
        assert_eq!(session.best_tweet(), Some("second"));
        assert_eq!(session.best_score(), 7.5);
        assert_eq!(session.scores_history().len(), 3);
        assert_eq!(session.iteration_count(), 3);
    }

    #[test]
    fn test_status_line_flags_early_stop() {
        let mut session = OptimizationSession::new(10, 2);
        session.observe(&record(0, "a", &[5, 5], true, 0));
        session.observe(&record(1, "a", &[5, 5], false, 1));
        session.observe(&record(2, "a", &[5, 5], false, 2));
        assert!(session.status_line().ends_with("No Improvement: 2/2 | Stopping early"));
    }

    #[test]
    fn test_completion_line() {
        let mut session = OptimizationSession::new(5, 2);
        session.observe(&record(0, "a", &[6, 7], true, 0));
        session.finish(StopReason::MaxIterationsReached);
        assert_eq!(
            session.completion_line(),
            "Optimization Complete | 1 iterations | Best Score: 6.50 | max iterations reached"
        );
        assert_eq!(session.stop_reason(), Some(StopReason::MaxIterationsReached));
        assert!(session.elapsed() >= chrono::Duration::zero());
    }

    #[test]
    fn test_category_trends() {
        let mut session = OptimizationSession::new(5, 2);
        assert!(session.category_trends().is_empty());

        session.observe(&record(0, "a", &[4, 8], true, 0));
        session.observe(&record(1, "b", &[7, 6], false, 1));
        let trends = session.category_trends();
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].category, "Clarity");
        assert_eq!(trends[0].delta(), 3);
        assert_eq!(trends[1].delta(), -2);
    }

    #[test]
    fn test_progress_and_failures() {
        let mut session = OptimizationSession::new(4, 2);
        session.observe(&record(0, "a", &[5], true, 0));
        let mut failed = record(1, "a", &[5], false, 1);
        failed.failure = Some("tweet evaluation failed".into());
        session.observe(&failed);
        assert_eq!(session.progress(), 0.5);
        assert_eq!(session.failures(), 1);
        assert_eq!(session.no_improvement_count(), 1);
    }
}
