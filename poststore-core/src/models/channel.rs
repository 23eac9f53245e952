use serde::{Deserialize, Serialize};

/// The slice of a channel row the post store reads and writes.
///
/// `last_post_at` and `total_msg_count` are bumped as a side effect of
/// creating posts; `team_id` and `delete_at` scope searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Channel {
    pub id: String,
    pub team_id: String,
    pub last_post_at: i64,
    pub total_msg_count: i64,
    pub delete_at: i64,
}

impl Channel {
    pub fn new(id: impl Into<String>, team_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            team_id: team_id.into(),
            ..Self::default()
        }
    }

    pub fn is_live(&self) -> bool {
        self.delete_at == 0
    }
}
