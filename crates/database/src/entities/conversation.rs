//! Conversation entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Two-party conversation. `user_one_id` is always the smaller id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub user_one_id: i64,
    pub user_two_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn includes(&self, user_id: i64) -> bool {
        self.user_one_id == user_id || self.user_two_id == user_id
    }

    /// The participant that is not `user_id`.
    pub fn other_participant(&self, user_id: i64) -> i64 {
        if self.user_one_id == user_id {
            self.user_two_id
        } else {
            self.user_one_id
        }
    }
}
