//! Change tokens for channel post lists.
//!
//! Tokens are opaque to callers; only equality is meaningful.

/// Bumped whenever the post wire shape changes so old client caches miss
pub const ETAG_ROOT_VERSION: &str = "10";

/// Token for a channel whose newest live update is `(id, update_at)`
pub fn post_etag(id: &str, update_at: i64) -> String {
    format!("{ETAG_ROOT_VERSION}.{id}.{update_at}")
}

/// Token for a channel with no live posts.
///
/// Stamped with the current time so two calls in different milliseconds
/// never compare equal.
pub fn empty_etag(now: i64) -> String {
    format!("{ETAG_ROOT_VERSION}.0.{now}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats() {
        assert_eq!(post_etag("abc", 42), "10.abc.42");
        assert_eq!(empty_etag(7), "10.0.7");
        assert_ne!(empty_etag(7), empty_etag(8));
    }
}
