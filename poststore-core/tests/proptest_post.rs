use poststore_core::models::post::MAX_MESSAGE_LEN;
use poststore_core::search::{fulltext_matches, search_words};
use poststore_core::{exact_hashtag_match, image_urls, new_id, parse_hashtags, Post, ValidationError};
use proptest::prelude::*;

fn arb_tag() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,12}".prop_map(|s| format!("#{s}"))
}

proptest! {
    /// Property: one URL per image, 1-indexed, in order
    #[test]
    fn prop_image_urls_count_and_order(n in 0i64..64) {
        let urls = image_urls("chan", "post", n);
        prop_assert_eq!(urls.len() as i64, n);

        for (i, url) in urls.iter().enumerate() {
            let expected_suffix = format!("/chan/post/{}.png", i + 1);
            prop_assert!(url.starts_with("/api/v1/files/get_image/"));
            prop_assert!(url.ends_with(&expected_suffix));
        }
    }

    /// Property: a post carrying one of the searched tags always matches exactly
    #[test]
    fn prop_exact_match_when_tag_shared(
        tags in prop::collection::vec(arb_tag(), 1..8),
        extra in prop::collection::vec(arb_tag(), 0..4),
        pick in any::<prop::sample::Index>(),
    ) {
        let shared = pick.get(&tags).clone();
        let hashtags = tags.join(" ");
        let mut terms = extra.clone();
        terms.push(shared);

        prop_assert!(exact_hashtag_match(&hashtags, &terms.join(" ")));
    }

    /// Property: exact matching never accepts a strict prefix of a tag
    #[test]
    fn prop_prefix_is_not_exact(tag in arb_tag(), suffix in "[a-z]{1,5}") {
        let hashtags = format!("{tag}{suffix}");
        prop_assert!(!exact_hashtag_match(&hashtags, &tag));
    }

    /// Property: every parsed hashtag also passes the full-text prefilter
    #[test]
    fn prop_parsed_tags_pass_fulltext(tags in prop::collection::vec(arb_tag(), 1..6)) {
        let message = format!("note {}", tags.join(" and "));
        let hashtags = parse_hashtags(&message);

        for tag in hashtags.split_whitespace() {
            prop_assert!(fulltext_matches(&hashtags, &search_words(tag)));
        }
    }

    /// Property: message length alone decides message validity
    #[test]
    fn prop_message_bound(len in 0usize..(MAX_MESSAGE_LEN + 50)) {
        let mut post = Post::new(new_id(), new_id(), "x".repeat(len));
        post.pre_save();

        let result = post.is_valid();
        if len <= MAX_MESSAGE_LEN {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(
                result,
                Err(ValidationError::TooLong { field: "message", max: MAX_MESSAGE_LEN })
            );
        }
    }
}
