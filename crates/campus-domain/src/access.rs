//! Course access decision.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::enrollment::{Enrollment, EnrollmentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DenyReason {
    #[serde(rename = "no enrollment")]
    NoEnrollment,
    #[serde(rename = "expired")]
    Expired,
    #[serde(rename = "paused")]
    Paused,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoEnrollment => "no enrollment",
            Self::Expired => "expired",
            Self::Paused => "paused",
        })
    }
}

/// Result of an access check. Serializes as `{"hasAccess": .., "reason": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub has_access: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
}

impl AccessDecision {
    pub fn granted() -> Self {
        Self {
            has_access: true,
            reason: None,
        }
    }

    pub fn denied(reason: DenyReason) -> Self {
        Self {
            has_access: false,
            reason: Some(reason),
        }
    }

    /// Decide access from an already-fetched enrollment.
    ///
    /// Expiry is computed from `access_expires_at`, so an enrollment whose stored
    /// status still reads `active` is denied once its window has passed.
    pub fn evaluate(enrollment: Option<&Enrollment>, now: DateTime<Utc>) -> Self {
        let Some(enrollment) = enrollment else {
            return Self::denied(DenyReason::NoEnrollment);
        };
        if now > enrollment.access_expires_at {
            return Self::denied(DenyReason::Expired);
        }
        match enrollment.status {
            EnrollmentStatus::Expired => Self::denied(DenyReason::Expired),
            EnrollmentStatus::Paused => Self::denied(DenyReason::Paused),
            EnrollmentStatus::Active | EnrollmentStatus::Completed => Self::granted(),
        }
    }
}
