//! Hashtag extraction from message text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::post::MAX_HASHTAGS_LEN;

/// A hashtag: `#` then a letter, then letters, digits, `_` or `-`
static HASHTAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[A-Za-z][A-Za-z0-9_\-]*$").expect("invalid hashtag regex"));

/// Extract the space separated hashtag field for a message.
///
/// Trailing punctuation is ignored (`#release.` yields `#release`), repeats
/// are dropped with first-seen order kept, and the result never exceeds the
/// stored hashtag column bound.
///
/// # Example
/// ```
/// use poststore_core::parse_hashtags;
///
/// assert_eq!(parse_hashtags("ship #release, then #docs #release"), "#release #docs");
/// ```
pub fn parse_hashtags(message: &str) -> String {
    let mut tags: Vec<&str> = Vec::new();
    let mut len = 0;

    for word in message.split_whitespace() {
        let word = word.trim_end_matches(|c: char| !c.is_ascii_alphanumeric());
        if !HASHTAG_RE.is_match(word) || tags.contains(&word) {
            continue;
        }

        let added = if tags.is_empty() { word.len() } else { word.len() + 1 };
        if len + added > MAX_HASHTAGS_LEN {
            break;
        }
        len += added;
        tags.push(word);
    }

    tags.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_in_order_without_repeats() {
        assert_eq!(parse_hashtags("#a1 text #b_2 #a1"), "#a1 #b_2");
    }

    #[test]
    fn ignores_non_tags() {
        assert_eq!(parse_hashtags("no tags here"), "");
        assert_eq!(parse_hashtags("# #1abc mid#word"), "");
    }

    #[test]
    fn strips_trailing_punctuation() {
        assert_eq!(parse_hashtags("done #shipit! (#later)"), "#shipit");
    }

    #[test]
    fn respects_column_bound() {
        let message = (0..400)
            .map(|i| format!("#tag{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        let tags = parse_hashtags(&message);
        assert!(tags.len() <= MAX_HASHTAGS_LEN);
        assert!(tags.starts_with("#tag0 #tag1"));
    }
}
