//! Identifier and clock helpers

use chrono::Utc;
use uuid::Uuid;

/// Length of every post, user, channel and team id
pub const ID_LEN: usize = 26;

/// Generate a fresh 26 character id.
///
/// Lowercase hex taken from a v4 UUID, so ids are URL safe and sortable
/// only by accident.
pub fn new_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}

/// True when `id` has the stored id shape: 26 ASCII alphanumerics.
pub fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LEN && id.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Current wall-clock time in milliseconds since the epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_valid_and_distinct() {
        let a = new_id();
        let b = new_id();
        assert_eq!(a.len(), ID_LEN);
        assert!(is_valid_id(&a));
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("short"));
        assert!(!is_valid_id(&"a".repeat(27)));
        assert!(!is_valid_id("abcdefghijklmnopqrstuvwx-z"));
        assert!(is_valid_id("abcdefghijklmnopqrstuvwxyz"));
    }
}
