//! Course catalog records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Partition shared by every course row.
pub const COURSES_PARTITION: &str = "courses";

/// A course runs this many days from its start date.
pub const COURSE_DURATION_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Recruiting,
    Ongoing,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub partition_key: String,
    pub row_key: String,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub instructor: String,
    #[serde(with = "crate::serde::timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "crate::serde::timestamp")]
    pub end_date: DateTime<Utc>,
    pub status: CourseStatus,
    pub max_students: u32,
    pub current_students: u32,
    #[serde(with = "crate::serde::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::serde::timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Administrative input for a new course.
#[derive(Debug, Clone)]
pub struct CourseDraft {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub instructor: String,
    pub start_date: DateTime<Utc>,
    pub max_students: u32,
}

impl Course {
    /// New courses open for recruiting with no students.
    pub fn new(draft: CourseDraft, now: DateTime<Utc>) -> Self {
        Self {
            partition_key: COURSES_PARTITION.to_owned(),
            row_key: draft.id,
            title: draft.title,
            description: draft.description,
            price: draft.price,
            instructor: draft.instructor,
            start_date: draft.start_date,
            end_date: draft.start_date + Duration::days(COURSE_DURATION_DAYS),
            status: CourseStatus::Recruiting,
            max_students: draft.max_students,
            current_students: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.row_key
    }
}
