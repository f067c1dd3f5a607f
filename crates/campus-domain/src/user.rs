//! User account records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enrollment::{Enrollment, EnrollmentStatus};

/// Partition shared by every user row.
pub const USERS_PARTITION: &str = "users";

/// Account record. Row key is the user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub partition_key: String,
    pub row_key: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub email_verified: bool,
    pub marketing_agreed: bool,
    /// Denormalized copy of the user's enrollments. The enrollment table is authoritative.
    #[serde(default, with = "enrolled_courses")]
    pub enrolled_courses: Vec<EnrolledCourse>,
    #[serde(with = "crate::serde::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::serde::timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, with = "crate::serde::optional_timestamp")]
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Summary of one enrollment embedded in [`User::enrolled_courses`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCourse {
    pub course_id: String,
    #[serde(default)]
    pub payment_id: String,
    #[serde(with = "crate::serde::timestamp")]
    pub enrolled_at: DateTime<Utc>,
    #[serde(with = "crate::serde::timestamp")]
    pub access_expires_at: DateTime<Utc>,
    pub status: EnrollmentStatus,
}

impl From<&Enrollment> for EnrolledCourse {
    fn from(e: &Enrollment) -> Self {
        Self {
            course_id: e.course_id().to_owned(),
            payment_id: e.payment_id.clone(),
            enrolled_at: e.enrolled_at,
            access_expires_at: e.access_expires_at,
            status: e.status,
        }
    }
}

impl User {
    pub fn new(
        id: String,
        email: &str,
        name: String,
        password_hash: String,
        marketing_agreed: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            partition_key: USERS_PARTITION.to_owned(),
            row_key: id,
            email: normalize_email(email),
            name,
            password_hash,
            email_verified: false,
            marketing_agreed,
            enrolled_courses: Vec::new(),
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.row_key
    }
}

/// Cache field codec. Accepts a bare array or the `{enrollments, payments}`
/// object older rows carry. Unreadable content decodes as an empty cache and
/// unreadable entries are skipped, so the cache never blocks loading a user.
mod enrolled_courses {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    use super::EnrolledCourse;

    pub fn serialize<S>(value: &[EnrolledCourse], s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.serialize(s)
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Vec<EnrolledCourse>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Value::deserialize(d)? {
            Value::String(text) => serde_json::from_str(&text).unwrap_or(Value::Null),
            other => other,
        };
        Ok(entries(value))
    }

    fn entries(value: Value) -> Vec<EnrolledCourse> {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("enrollments") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()
    }
}

/// Emails are stored trimmed and lowercased so equality filters match.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
