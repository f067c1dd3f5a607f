use chrono::Utc;

use crate::domain::repository::EnrollmentRepository;
use crate::domain::types::AccessDecision;
use crate::error::StoreError;

// ── CheckCourseAccess ────────────────────────────────────────────────────────

pub struct CheckCourseAccessUseCase<E: EnrollmentRepository> {
    pub enrollments: E,
}

impl<E: EnrollmentRepository> CheckCourseAccessUseCase<E> {
    /// Expected denials are values, not errors.
    pub async fn execute(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<AccessDecision, StoreError> {
        let enrollment = self.enrollments.find(user_id, course_id).await?;
        Ok(AccessDecision::evaluate(enrollment.as_ref(), Utc::now()))
    }
}
