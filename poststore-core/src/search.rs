//! Search term handling shared by every backend.
//!
//! Full-text matching is a superset filter. For hashtag searches the exact
//! token test in [`exact_hashtag_match`] is the authoritative inclusion rule.

/// Maximum number of posts a search returns
pub const SEARCH_LIMIT: i64 = 100;

/// Column a search runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Message,
    Hashtags,
}

impl SearchField {
    pub fn for_hashtag_search(is_hashtag_search: bool) -> Self {
        if is_hashtag_search {
            Self::Hashtags
        } else {
            Self::Message
        }
    }

    /// Column name. Safe to splice into SQL, it never comes from input.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Hashtags => "hashtags",
        }
    }
}

/// `@` is query syntax for full-text engines and cannot be escaped
pub fn sanitize_terms(terms: &str) -> String {
    terms.replace('@', " ")
}

/// One normalised word of a full-text query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchWord {
    pub text: String,
    /// Trailing `*` in the query: match any token starting with `text`
    pub prefix: bool,
}

impl SearchWord {
    fn matches(&self, token: &str) -> bool {
        if self.prefix {
            token.starts_with(&self.text)
        } else {
            token == self.text
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Lowercased word tokens of a piece of text
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !is_word_char(c))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Break already-sanitised terms into normalised query words.
///
/// Operators and punctuation are dropped, so `#foo` searches for `foo` and
/// `+release*` searches for tokens starting with `release`.
pub fn search_words(terms: &str) -> Vec<SearchWord> {
    let mut words = Vec::new();

    for raw in terms.split_whitespace() {
        let prefix = raw.ends_with('*');
        let fragments: Vec<String> = tokenize(raw).collect();
        let last = fragments.len().saturating_sub(1);

        for (i, text) in fragments.into_iter().enumerate() {
            let word = SearchWord {
                text,
                prefix: prefix && i == last,
            };
            if !words.contains(&word) {
                words.push(word);
            }
        }
    }

    words
}

/// Any-word match of `text` against the query words
pub fn fulltext_matches(text: &str, words: &[SearchWord]) -> bool {
    tokenize(text).any(|token| words.iter().any(|w| w.matches(&token)))
}

/// Render query words as a Postgres `tsquery` with OR semantics.
///
/// Returns `None` when nothing searchable is left.
pub fn to_tsquery(words: &[SearchWord]) -> Option<String> {
    if words.is_empty() {
        return None;
    }

    let query = words
        .iter()
        .map(|w| {
            if w.prefix {
                format!("{}:*", w.text)
            } else {
                w.text.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ");

    Some(query)
}

/// True when at least one whitespace separated tag in `hashtags` equals one
/// of the whitespace separated search `terms` exactly.
pub fn exact_hashtag_match(hashtags: &str, terms: &str) -> bool {
    let wanted: Vec<&str> = terms.split_whitespace().collect();
    hashtags.split_whitespace().any(|tag| wanted.contains(&tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_sign_is_replaced() {
        assert_eq!(sanitize_terms("@alice hi"), " alice hi");
    }

    #[test]
    fn words_drop_punctuation_and_keep_prefix_marker() {
        let words = search_words("#Foo +release* foo");
        assert_eq!(
            words,
            vec![
                SearchWord {
                    text: "foo".into(),
                    prefix: false
                },
                SearchWord {
                    text: "release".into(),
                    prefix: true
                },
            ]
        );
    }

    #[test]
    fn fulltext_is_word_level() {
        let words = search_words("deploy");
        assert!(fulltext_matches("We deploy today", &words));
        assert!(!fulltext_matches("redeployment", &words));

        let words = search_words("deploy*");
        assert!(fulltext_matches("deployment done", &words));
    }

    #[test]
    fn tsquery_rendering() {
        assert_eq!(to_tsquery(&search_words("a b*")).as_deref(), Some("a | b:*"));
        assert_eq!(to_tsquery(&search_words("@ # !")), None);
    }

    #[test]
    fn exact_hashtags() {
        assert!(!exact_hashtag_match("#foobar", "#foo #bar"));
        assert!(exact_hashtag_match("#bar #baz", "#foo #bar"));
        assert!(!exact_hashtag_match("", "#foo"));
        assert!(!exact_hashtag_match("#Foo", "#foo"));
    }

    #[test]
    fn field_columns() {
        assert_eq!(SearchField::for_hashtag_search(true).column(), "hashtags");
        assert_eq!(SearchField::for_hashtag_search(false).column(), "message");
    }
}
