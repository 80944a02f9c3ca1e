//! Feedback text derived from an evaluation, for the generator.

use crate::constants::{MAX_SCORE, WEAK_SCORE_THRESHOLD};
use crate::evaluation::Evaluation;

/// One line per category: `"<category> (Score: <score>/<MAX_SCORE>): <reasoning>"`.
///
/// Returns an empty string when there is no evaluation yet.
pub fn format_evaluation_for_generator(evaluation: Option<&Evaluation>) -> String {
    let Some(evaluation) = evaluation else {
        return String::new();
    };

    evaluation
        .scores()
        .iter()
        .map(|s| {
            format!(
                "{} (Score: {}/{}): {}",
                s.category(),
                s.score(),
                MAX_SCORE,
                s.reasoning()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Categories scoring below [`WEAK_SCORE_THRESHOLD`], as `"<category> (current score: s/9)"`.
pub fn weak_categories(evaluation: &Evaluation) -> Vec<String> {
    evaluation
        .scores()
        .iter()
        .filter(|s| s.score() < WEAK_SCORE_THRESHOLD)
        .map(|s| format!("{} (current score: {}/{})", s.category(), s.score(), MAX_SCORE))
        .collect()
}

/// A one-paragraph instruction naming the weakest areas, if any.
pub fn improvement_focus(evaluation: &Evaluation) -> String {
    let weak = weak_categories(evaluation);
    if weak.is_empty() {
        "The tweet is performing well across all categories. \
         Try to make minor refinements for even better performance."
            .to_string()
    } else {
        format!(
            "Focus on improving these areas: {}. \
             Make the tweet more engaging, concise, and impactful while staying within the length limit.",
            weak.join("; ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::CategoryScore;

    fn sample() -> Evaluation {
        Evaluation::new(vec![
            CategoryScore::new("Engagement", "Very engaging content", 8).unwrap(),
            CategoryScore::new("Clarity", "Clear and concise", 9).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_format_with_evaluation() {
        let formatted = format_evaluation_for_generator(Some(&sample()));
        assert_eq!(
            formatted,
            "Engagement (Score: 8/9): Very engaging content\nClarity (Score: 9/9): Clear and concise"
        );
    }

    #[test]
    fn test_format_without_evaluation() {
        assert_eq!(format_evaluation_for_generator(None), "");
    }

    #[test]
    fn test_weak_categories() {
        let eval = Evaluation::new(vec![
            CategoryScore::new("Engagement", "meh", 4).unwrap(),
            CategoryScore::new("Clarity", "good", 7).unwrap(),
        ])
        .unwrap();
        assert_eq!(weak_categories(&eval), vec!["Engagement (current score: 4/9)"]);
        assert!(improvement_focus(&eval).starts_with("Focus on improving these areas: Engagement"));
    }

    #[test]
    fn test_focus_when_nothing_is_weak() {
        assert!(improvement_focus(&sample()).contains("performing well"));
    }
}
