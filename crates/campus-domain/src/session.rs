//! Login sessions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Session lifetime from creation.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Partition key is the user id, row key is the session id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub partition_key: String,
    pub row_key: String,
    #[serde(with = "crate::serde::timestamp")]
    pub expires_at: DateTime<Utc>,
    #[serde(with = "crate::serde::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: String, user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            partition_key: user_id.to_owned(),
            row_key: id,
            expires_at: now + Duration::days(SESSION_TTL_DAYS),
            created_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.row_key
    }

    pub fn user_id(&self) -> &str {
        &self.partition_key
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}
