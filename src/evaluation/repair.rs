//! Turning raw evaluator output into a well-formed [`Evaluation`].
//!
//! Model replies are unreliable: the JSON may be wrapped in prose or code
//! fences, the number of entries may not match the requested categories, and
//! scores may be out of range or not integers at all. None of this is an
//! error here. Every problem is repaired by substituting [`DEFAULT_SCORE`]
//! with a placeholder reasoning string, so the search loop only ever sees an
//! `Evaluation` with exactly one score per requested category.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::{CategoryScore, Evaluation};
use crate::constants::{REASONING_PARSING_ERROR, REASONING_VALIDATION_ERROR};
use crate::errors::ScoreError;

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").unwrap());

/// One entry of an evaluator reply before validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCategoryScore {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub score: Option<Value>,
}

impl RawCategoryScore {
    /// An entry carrying only a score, as in `{"category_scores": [7, 5]}`.
    pub fn from_score(score: Value) -> Self {
        Self {
            score: Some(score),
            ..Self::default()
        }
    }
}

/// Parse an evaluator reply and repair it against `categories`.
///
/// The first payload with one entry per category wins; otherwise the first
/// payload found is repaired as a count mismatch.
///
/// Only fails when `categories` itself is empty.
pub fn parse_evaluation(categories: &[String], response: &str) -> Result<Evaluation, ScoreError> {
    let mut first = None;
    for raw in json_candidates(response).filter_map(|value| raw_entries(&value)) {
        if raw.len() == categories.len() {
            return repair_evaluation(categories, &raw);
        }
        first.get_or_insert(raw);
    }

    match first {
        Some(raw) => repair_evaluation(categories, &raw),
        None => {
            log::debug!(
                "Evaluator reply had no usable JSON ({} chars), using defaults",
                response.len()
            );
            Evaluation::with_default_scores(categories, REASONING_PARSING_ERROR)
        }
    }
}

/// Repair raw entries into one score per requested category, in order.
///
/// A count mismatch replaces every entry with a default. Otherwise each
/// entry keeps its reasoning and takes its category name from `categories`;
/// a missing, non-integer or out-of-range score becomes a default.
pub fn repair_evaluation(
    categories: &[String],
    raw: &[RawCategoryScore],
) -> Result<Evaluation, ScoreError> {
    if raw.len() != categories.len() {
        log::debug!(
            "Evaluator returned {} scores for {} categories, using defaults",
            raw.len(),
            categories.len()
        );
        return Evaluation::with_default_scores(categories, REASONING_PARSING_ERROR);
    }

    let scores = categories
        .iter()
        .zip(raw)
        .map(|(category, entry)| {
            let reasoning = entry.reasoning.clone().unwrap_or_default();
            entry
                .score
                .as_ref()
                .and_then(integer_score)
                .and_then(|score| CategoryScore::new(category.as_str(), reasoning, score).ok())
                .unwrap_or_else(|| {
                    CategoryScore::with_default_score(category.as_str(), REASONING_VALIDATION_ERROR)
                })
        })
        .collect();

    Evaluation::new(scores)
}

/// Find the JSON payload in a model reply.
///
/// Tries the whole trimmed reply first, then a fenced code block, then the
/// first complete object or array embedded in the text.
pub fn extract_json(response: &str) -> Option<Value> {
    json_candidates(response).next()
}

/// Every object or array in `response`, in the order [`extract_json`]
/// prefers them.
fn json_candidates(response: &str) -> impl Iterator<Item = Value> + '_ {
    let whole = serde_json::from_str::<Value>(response.trim()).ok();
    let fenced = FENCED_BLOCK
        .captures(response)
        .and_then(|caps| caps.get(1))
        .and_then(|m| serde_json::from_str::<Value>(m.as_str().trim()).ok());

    whole
        .into_iter()
        .chain(fenced)
        .filter(|value| value.is_object() || value.is_array())
        .chain(embedded_json(response))
}

/// Values starting at each `{` or `[`, parsed up to their matching close and
/// ignoring whatever follows.
fn embedded_json(response: &str) -> impl Iterator<Item = Value> + '_ {
    response
        .char_indices()
        .filter(|(_, c)| matches!(c, '{' | '['))
        .filter_map(move |(start, _)| {
            serde_json::Deserializer::from_str(&response[start..])
                .into_iter::<Value>()
                .next()
                .and_then(Result::ok)
        })
}

/// Accepts `{"evaluations": [...]}`, `{"category_scores": [...]}` or a bare
/// array of entry objects or numbers.
fn raw_entries(value: &Value) -> Option<Vec<RawCategoryScore>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("evaluations")
            .or_else(|| map.get("category_scores"))
            .or_else(|| map.get("scores"))
            .and_then(Value::as_array)?,
        _ => return None,
    };

    Some(
        items
            .iter()
            .map(|item| match item {
                Value::Object(_) => {
                    serde_json::from_value::<RawCategoryScore>(item.clone()).unwrap_or_default()
                }
                other => RawCategoryScore::from_score(other.clone()),
            })
            .collect(),
    )
}

/// Integers, integer-valued floats and numeric strings; nothing else.
fn integer_score(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_SCORE, REASONING_MISSING};
    use serde_json::json;

    fn categories(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_well_formed_reply() {
        let cats = categories(&["Clarity", "Impact"]);
        let reply = r#"{"evaluations": [
            {"category": "Clarity", "reasoning": "Easy to read", "score": 8},
            {"category": "Impact", "reasoning": "Punchy", "score": 6}
        ]}"#;
        let eval = parse_evaluation(&cats, reply).unwrap();
        assert_eq!(eval.category_scores(), vec![8, 6]);
        assert_eq!(eval.scores()[0].reasoning(), "Easy to read");
    }

    #[test]
    fn test_parse_reply_wrapped_in_prose_and_fences() {
        let cats = categories(&["Clarity"]);
        let reply = "Here is my assessment:\n```json\n{\"evaluations\": [{\"category\": \"Clarity\", \"reasoning\": \"ok\", \"score\": 7}]}\n```\nThanks!";
        let eval = parse_evaluation(&cats, reply).unwrap();
        assert_eq!(eval.total(), 7);
    }

    #[test]
    fn test_parse_bare_score_list() {
        let cats = categories(&["A", "B", "C"]);
        let eval = parse_evaluation(&cats, r#"{"category_scores": [3, 4, 5]}"#).unwrap();
        assert_eq!(eval.category_scores(), vec![3, 4, 5]);
        assert_eq!(eval.scores()[1].category(), "B");
        assert_eq!(eval.scores()[1].reasoning(), REASONING_MISSING);

        let eval = parse_evaluation(&cats, "[9, 8, 7]").unwrap();
        assert_eq!(eval.total(), 24);
    }

    #[test]
    fn test_count_mismatch_becomes_defaults_for_every_category() {
        let cats = categories(&["A", "B", "C"]);
        let reply = r#"{"evaluations": [{"category": "A", "reasoning": "only one", "score": 9}]}"#;
        let eval = parse_evaluation(&cats, reply).unwrap();
        assert_eq!(eval.len(), 3);
        for (score, name) in eval.scores().iter().zip(["A", "B", "C"]) {
            assert_eq!(score.category(), name);
            assert_eq!(score.score(), DEFAULT_SCORE);
            assert_eq!(score.reasoning(), REASONING_PARSING_ERROR);
        }
    }

    #[test]
    fn test_unparseable_reply_becomes_defaults() {
        let cats = categories(&["A", "B"]);
        let eval = parse_evaluation(&cats, "I think it's pretty good overall.").unwrap();
        assert_eq!(eval.category_scores(), vec![DEFAULT_SCORE, DEFAULT_SCORE]);
        assert_eq!(eval.scores()[0].reasoning(), REASONING_PARSING_ERROR);
    }

    #[test]
    fn test_invalid_scores_are_replaced_individually() {
        let cats = categories(&["A", "B", "C", "D", "E"]);
        let raw = vec![
            RawCategoryScore {
                reasoning: Some("fine".into()),
                score: Some(json!(12)),
                ..Default::default()
            },
            RawCategoryScore::from_score(json!("seven")),
            RawCategoryScore::from_score(json!(6.5)),
            RawCategoryScore::from_score(json!("8")),
            RawCategoryScore::from_score(json!(4.0)),
        ];
        let eval = repair_evaluation(&cats, &raw).unwrap();
        assert_eq!(eval.category_scores(), vec![5, 5, 5, 8, 4]);
        assert_eq!(eval.scores()[0].reasoning(), REASONING_VALIDATION_ERROR);
        assert_eq!(eval.scores()[3].reasoning(), REASONING_MISSING);
    }

    #[test]
    fn test_category_names_come_from_request() {
        let cats = categories(&["Clarity", "Impact"]);
        let reply = r#"[{"category": "clarity!!", "reasoning": "x", "score": 2},
                        {"category": "", "reasoning": "y", "score": 3}]"#;
        let eval = parse_evaluation(&cats, reply).unwrap();
        assert_eq!(eval.scores()[0].category(), "Clarity");
        assert_eq!(eval.scores()[1].category(), "Impact");
    }

    #[test]
    fn test_empty_categories_is_the_only_failure() {
        assert!(parse_evaluation(&[], "[]").is_err());
    }

    #[test]
    fn test_trailing_braced_prose_keeps_the_reply() {
        let cats = categories(&["A", "B"]);
        let reply = r#"{"evaluations": [
            {"category": "A", "reasoning": "sharp", "score": 8},
            {"category": "B", "reasoning": "warm", "score": 7}
        ]}
Note: I used the {1-9} scale [strict]."#;
        let eval = parse_evaluation(&cats, reply).unwrap();
        assert_eq!(eval.category_scores(), vec![8, 7]);
        assert_eq!(eval.scores()[0].reasoning(), "sharp");
    }

    #[test]
    fn test_leading_bracketed_prose_is_skipped() {
        let cats = categories(&["A", "B"]);
        let reply = "Scores [on a 1-9 scale] follow {see below}:\n[{\"score\": 3}, {\"score\": 6}] [done]";
        let eval = parse_evaluation(&cats, reply).unwrap();
        assert_eq!(eval.category_scores(), vec![3, 6]);
    }

    #[test]
    fn test_unrelated_json_before_the_scores_is_skipped() {
        let cats = categories(&["A"]);
        let reply = r#"Context {"tweet": "hi"} then {"category_scores": [9]}"#;
        let eval = parse_evaluation(&cats, reply).unwrap();
        assert_eq!(eval.category_scores(), vec![9]);
        assert_eq!(extract_json(reply), Some(json!({"tweet": "hi"})));

        let cats = categories(&["A", "B"]);
        let reply = r#"Overall [8]. {"evaluations": [{"score": 8}, {"score": 6}]}"#;
        let eval = parse_evaluation(&cats, reply).unwrap();
        assert_eq!(eval.category_scores(), vec![8, 6]);
    }

    #[test]
    fn test_extract_json_prefers_whole_reply() {
        assert_eq!(extract_json("  [1, 2] "), Some(json!([1, 2])));
        assert_eq!(extract_json("no json here"), None);
        assert_eq!(extract_json("42"), None);
    }
}
