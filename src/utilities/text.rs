//! Tweet text helpers.
//!
//! Lengths are counted in `char`s, never bytes, so multi-byte text is cut
//! on character boundaries.

use crate::constants::{CATEGORY_DISPLAY_MAX_LENGTH, TWEET_MAX_LENGTH, TWEET_TRUNCATION_SUFFIX};

/// Trim `tweet` and, if it is longer than `max_length`, cut it to
/// `max_length - len(suffix)` characters and append `suffix`.
pub fn truncate_tweet(tweet: &str, max_length: usize, suffix: &str) -> String {
    let tweet = tweet.trim();
    if tweet.chars().count() <= max_length {
        return tweet.to_string();
    }

    let keep = max_length.saturating_sub(suffix.chars().count());
    let mut truncated: String = tweet.chars().take(keep).collect();
    truncated.push_str(suffix);
    truncated
}

/// Shorten a category description for one-line display.
pub fn truncate_category_display(category: &str, max_length: usize) -> String {
    if category.chars().count() <= max_length {
        return category.to_string();
    }
    let mut shortened: String = category.chars().take(max_length).collect();
    shortened.push_str(TWEET_TRUNCATION_SUFFIX);
    shortened
}

/// [`truncate_category_display`] with the default display width.
pub fn short_category(category: &str) -> String {
    truncate_category_display(category, CATEGORY_DISPLAY_MAX_LENGTH)
}

/// Length of the trimmed tweet in characters.
pub fn tweet_length(tweet: &str) -> usize {
    tweet.trim().chars().count()
}

/// Non-empty and within [`TWEET_MAX_LENGTH`] once trimmed.
pub fn is_valid_tweet(tweet: &str) -> bool {
    let len = tweet_length(tweet);
    len > 0 && len <= TWEET_MAX_LENGTH
}
