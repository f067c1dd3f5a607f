//! Password reset codes.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Partition shared by every reset row. Row key is the user id.
pub const RESETS_PARTITION: &str = "resets";

/// Number of digits in a reset code.
pub const RESET_CODE_LEN: usize = 6;

/// Reset code lifetime.
pub const RESET_CODE_TTL_MINUTES: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    pub partition_key: String,
    pub row_key: String,
    pub code: String,
    #[serde(with = "crate::serde::timestamp")]
    pub expires_at: DateTime<Utc>,
    #[serde(with = "crate::serde::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl PasswordReset {
    pub fn new(user_id: &str, code: String, now: DateTime<Utc>) -> Self {
        Self {
            partition_key: RESETS_PARTITION.to_owned(),
            row_key: user_id.to_owned(),
            code,
            expires_at: now + Duration::minutes(RESET_CODE_TTL_MINUTES),
            created_at: now,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn accepts(&self, code: &str, now: DateTime<Utc>) -> bool {
        !self.is_expired_at(now) && self.code == code
    }
}
