//! Prompt text for the LLM-backed generator and evaluator.

use crate::constants::{MAX_SCORE, MIN_SCORE, TWEET_MAX_LENGTH};
use crate::evaluation::Evaluation;
use crate::llms::LLMMessage;
use crate::search::feedback::{format_evaluation_for_generator, improvement_focus};

pub fn generator_system_prompt() -> String {
    format!(
        "You are an expert social media copywriter. You write or improve a single tweet \
         based on the original text and feedback on the current best version. \
         Keep the meaning of the original text. The tweet must be at most {} characters. \
         Reply with the tweet text only: no quotes, no hashtags unless they add value, \
         no commentary.",
        TWEET_MAX_LENGTH
    )
}

pub fn evaluator_system_prompt() -> String {
    format!(
        "You are a strict tweet critic. Score the candidate tweet on each category \
         from {min} (poor) to {max} (excellent), as an integer. Penalise any candidate \
         that changes the meaning of the original text. Reply with JSON only, in the form \
         {{\"evaluations\": [{{\"category\": \"<category>\", \"reasoning\": \"<one sentence>\", \
         \"score\": <{min}-{max}>}}]}} with exactly one entry per category, in the order given.",
        min = MIN_SCORE,
        max = MAX_SCORE
    )
}

/// Messages asking for a first or improved candidate.
pub fn build_generator_messages(
    original_text: &str,
    current_tweet: &str,
    previous_evaluation: Option<&Evaluation>,
) -> Vec<LLMMessage> {
    let mut user = format!("Original text:\n{}\n", original_text.trim());

    match previous_evaluation {
        None => {
            user.push_str("\nWrite the first tweet for this text.");
        }
        Some(evaluation) => {
            user.push_str(&format!(
                "\nCurrent best tweet:\n{}\n\nFeedback on the current best tweet:\n{}\n\n{}\n\n\
                 Write an improved tweet.",
                current_tweet,
                format_evaluation_for_generator(Some(evaluation)),
                improvement_focus(evaluation)
            ));
        }
    }

    vec![
        LLMMessage::system(generator_system_prompt()),
        LLMMessage::user(user),
    ]
}

/// Messages asking for per-category scores of `candidate_text`.
pub fn build_evaluator_messages(
    original_text: &str,
    current_best_tweet: &str,
    candidate_text: &str,
    categories: &[String],
) -> Vec<LLMMessage> {
    let numbered = categories
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {}", i + 1, c))
        .collect::<Vec<_>>()
        .join("\n");

    let best = if current_best_tweet.is_empty() {
        "(none yet)"
    } else {
        current_best_tweet
    };

    let user = format!(
        "Original text:\n{}\n\nCurrent best tweet:\n{}\n\nCandidate tweet to evaluate:\n{}\n\n\
         Categories:\n{}",
        original_text.trim(),
        best,
        candidate_text,
        numbered
    );

    vec![
        LLMMessage::system(evaluator_system_prompt()),
        LLMMessage::user(user),
    ]
}

/// Strip the wrapping models like to add around a tweet: code fences,
/// a `Tweet:` label and matching surrounding quotes.
pub fn clean_generated_tweet(reply: &str) -> String {
    let mut text = reply.trim();

    if let Some(inner) = text.strip_prefix("```") {
        let inner = inner.trim_end().trim_end_matches("```");
        // Drop an optional language tag on the fence line.
        text = match inner.split_once('\n') {
            Some((first, rest)) if !first.trim().contains(' ') => rest,
            _ => inner,
        }
        .trim();
    }

    for label in ["Tweet:", "tweet:", "Improved tweet:", "Improved Tweet:"] {
        if let Some(rest) = text.strip_prefix(label) {
            text = rest.trim();
            break;
        }
    }

    for quote in ['"', '\u{201C}', '\''] {
        let closing = if quote == '\u{201C}' { '\u{201D}' } else { quote };
        if text.len() > 1 && text.starts_with(quote) && text.ends_with(closing) {
            text = text[quote.len_utf8()..text.len() - closing.len_utf8()].trim();
            break;
        }
    }

    text.to_string()
}
