//! Enrollment records and their progress rules.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Days of course access granted from the moment of enrollment.
pub const ACCESS_WINDOW_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Paused,
    Expired,
}

impl EnrollmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Paused => "paused",
            Self::Expired => "expired",
        }
    }
}

/// A user's enrollment in one course.
///
/// Partition key is the user id and row key is the course id, so a user holds
/// at most one enrollment per course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub partition_key: String,
    pub row_key: String,
    /// Back-reference only; the payment may no longer exist.
    pub payment_id: String,
    #[serde(with = "crate::serde::timestamp")]
    pub enrolled_at: DateTime<Utc>,
    pub status: EnrollmentStatus,
    pub progress: u8,
    #[serde(with = "crate::serde::timestamp")]
    pub access_expires_at: DateTime<Utc>,
    #[serde(default, with = "crate::serde::optional_timestamp")]
    pub last_accessed_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::serde::optional_timestamp")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Enrollment {
    pub fn new(user_id: &str, course_id: &str, payment_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            partition_key: user_id.to_owned(),
            row_key: course_id.to_owned(),
            payment_id: payment_id.to_owned(),
            enrolled_at: now,
            status: EnrollmentStatus::Active,
            progress: 0,
            access_expires_at: now + Duration::days(ACCESS_WINDOW_DAYS),
            last_accessed_at: None,
            completed_at: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.partition_key
    }

    pub fn course_id(&self) -> &str {
        &self.row_key
    }

    /// Record learner progress, clamped to 0..=100.
    ///
    /// Reaching 100 completes the enrollment and stamps `completed_at` once.
    /// The access window is left untouched.
    pub fn record_progress(&mut self, progress: i64, now: DateTime<Utc>) {
        self.progress = progress.clamp(0, 100) as u8;
        self.last_accessed_at = Some(now);
        if self.progress >= 100 {
            self.status = EnrollmentStatus::Completed;
            if self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
        }
    }
}
