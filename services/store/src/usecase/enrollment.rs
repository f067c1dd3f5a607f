use tracing::{info, warn};

use campus_domain::serde::now;

use crate::domain::repository::{EnrollmentRepository, UserRepository};
use crate::domain::types::{EnrolledCourse, Enrollment, User};
use crate::error::StoreError;

// ── CreateEnrollment ─────────────────────────────────────────────────────────

pub struct CreateEnrollmentUseCase<E: EnrollmentRepository> {
    pub enrollments: E,
}

impl<E: EnrollmentRepository> CreateEnrollmentUseCase<E> {
    /// Enroll a user, granting a 90-day access window from now.
    ///
    /// If the user is already enrolled the existing enrollment is returned
    /// unchanged; its access window is never extended.
    pub async fn execute(
        &self,
        user_id: &str,
        course_id: &str,
        payment_id: &str,
    ) -> Result<Enrollment, StoreError> {
        enroll(&self.enrollments, user_id, course_id, payment_id).await
    }
}

/// Shared by the purchase saga and its repair pass.
pub(crate) async fn enroll<E: EnrollmentRepository>(
    enrollments: &E,
    user_id: &str,
    course_id: &str,
    payment_id: &str,
) -> Result<Enrollment, StoreError> {
    let enrollment = Enrollment::new(user_id, course_id, payment_id, now());
    match enrollments.create(&enrollment).await {
        Ok(()) => {
            info!(user_id, course_id, payment_id, "enrollment created");
            Ok(enrollment)
        }
        Err(StoreError::Conflict) => {
            let existing = enrollments
                .find(user_id, course_id)
                .await?
                .ok_or(StoreError::Conflict)?;
            info!(user_id, course_id, "already enrolled");
            Ok(existing)
        }
        Err(e) => Err(e),
    }
}

// ── GetUserEnrollments ───────────────────────────────────────────────────────

pub struct GetUserEnrollmentsUseCase<E: EnrollmentRepository> {
    pub enrollments: E,
}

impl<E: EnrollmentRepository> GetUserEnrollmentsUseCase<E> {
    pub async fn execute(&self, user_id: &str) -> Result<Vec<Enrollment>, StoreError> {
        self.enrollments.list_by_user(user_id).await
    }
}

// ── UpdateProgress ───────────────────────────────────────────────────────────

pub struct UpdateProgressUseCase<E: EnrollmentRepository> {
    pub enrollments: E,
}

impl<E: EnrollmentRepository> UpdateProgressUseCase<E> {
    /// `Ok(None)` if the user is not enrolled in the course.
    pub async fn execute(
        &self,
        user_id: &str,
        course_id: &str,
        progress: i64,
    ) -> Result<Option<Enrollment>, StoreError> {
        let Some(mut enrollment) = self.enrollments.find(user_id, course_id).await? else {
            return Ok(None);
        };
        enrollment.record_progress(progress, now());
        self.enrollments.update(&enrollment).await?;
        Ok(Some(enrollment))
    }
}

// ── RemoveEnrollment ─────────────────────────────────────────────────────────

pub struct RemoveEnrollmentUseCase<E: EnrollmentRepository> {
    pub enrollments: E,
}

impl<E: EnrollmentRepository> RemoveEnrollmentUseCase<E> {
    /// Administrative removal. Removing a missing enrollment succeeds.
    pub async fn execute(&self, user_id: &str, course_id: &str) -> Result<(), StoreError> {
        self.enrollments.delete(user_id, course_id).await?;
        info!(user_id, course_id, "enrollment removed");
        Ok(())
    }
}

// ── RefreshEnrolledCourses ───────────────────────────────────────────────────

pub struct RefreshEnrolledCoursesUseCase<U: UserRepository, E: EnrollmentRepository> {
    pub users: U,
    pub enrollments: E,
}

impl<U: UserRepository, E: EnrollmentRepository> RefreshEnrolledCoursesUseCase<U, E> {
    /// Rebuild the user's `enrolled_courses` cache from the enrollment table.
    ///
    /// `Ok(None)` if the user does not exist.
    pub async fn execute(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let Some(mut user) = self.users.find_by_id(user_id).await? else {
            return Ok(None);
        };
        let enrollments = self.enrollments.list_by_user(user_id).await?;
        user.enrolled_courses = enrollments.iter().map(EnrolledCourse::from).collect();
        user.updated_at = now();
        self.users.update(&user).await?;
        Ok(Some(user))
    }

    /// Like [`execute`](Self::execute) but only logs failures.
    pub async fn execute_best_effort(&self, user_id: &str) {
        if let Err(e) = self.execute(user_id).await {
            warn!(user_id, error = %e, "failed to refresh enrolled courses");
        }
    }
}
