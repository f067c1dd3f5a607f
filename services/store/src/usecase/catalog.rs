use tracing::info;

use campus_domain::id::{is_valid_key, new_id};
use campus_domain::serde::now;

use crate::domain::repository::CourseRepository;
use crate::domain::types::{Course, CourseDraft};
use crate::error::StoreError;

// ── CreateCourse ─────────────────────────────────────────────────────────────

pub struct CreateCourseUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> CreateCourseUseCase<C> {
    /// An empty draft id gets a generated one.
    pub async fn execute(&self, mut draft: CourseDraft) -> Result<Course, StoreError> {
        if draft.id.is_empty() {
            draft.id = new_id();
        }
        if !is_valid_key(&draft.id) {
            return Err(StoreError::InvalidInput(format!(
                "invalid course id: {:?}",
                draft.id
            )));
        }
        if draft.price < 0 {
            return Err(StoreError::InvalidInput("price must not be negative".to_owned()));
        }
        let course = Course::new(draft, now());
        self.courses.create(&course).await?;
        info!(course_id = course.id(), "course created");
        Ok(course)
    }
}

// ── GetCourse ────────────────────────────────────────────────────────────────

pub struct GetCourseUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> GetCourseUseCase<C> {
    pub async fn execute(&self, course_id: &str) -> Result<Option<Course>, StoreError> {
        self.courses.find_by_id(course_id).await
    }
}

// ── ListCourses ──────────────────────────────────────────────────────────────

pub struct ListCoursesUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> ListCoursesUseCase<C> {
    pub async fn execute(&self) -> Result<Vec<Course>, StoreError> {
        self.courses.list().await
    }
}
