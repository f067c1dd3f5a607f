use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_core::identity::SessionHeaders;

use crate::domain::types::{AccessDecision, Enrollment, EnrollmentStatus};
use crate::error::StoreError;
use crate::handlers::authenticate;
use crate::state::AppState;
use crate::usecase::access::CheckCourseAccessUseCase;
use crate::usecase::enrollment::{
    GetUserEnrollmentsUseCase, RefreshEnrolledCoursesUseCase, UpdateProgressUseCase,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    pub course_id: String,
    pub payment_id: String,
    pub status: EnrollmentStatus,
    pub progress: u8,
    #[serde(with = "campus_domain::serde::timestamp")]
    pub enrolled_at: DateTime<Utc>,
    #[serde(with = "campus_domain::serde::timestamp")]
    pub access_expires_at: DateTime<Utc>,
    #[serde(with = "campus_domain::serde::optional_timestamp")]
    pub last_accessed_at: Option<DateTime<Utc>>,
    #[serde(with = "campus_domain::serde::optional_timestamp")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Enrollment> for EnrollmentResponse {
    fn from(e: Enrollment) -> Self {
        Self {
            course_id: e.row_key,
            payment_id: e.payment_id,
            status: e.status,
            progress: e.progress,
            enrolled_at: e.enrolled_at,
            access_expires_at: e.access_expires_at,
            last_accessed_at: e.last_accessed_at,
            completed_at: e.completed_at,
        }
    }
}

// ── GET /enrollments/@me ─────────────────────────────────────────────────────

pub async fn get_my_enrollments(
    identity: SessionHeaders,
    State(state): State<AppState>,
) -> Result<Json<Vec<EnrollmentResponse>>, StoreError> {
    authenticate(&state, &identity).await?;
    let usecase = GetUserEnrollmentsUseCase {
        enrollments: state.enrollment_repo(),
    };
    let enrollments = usecase.execute(&identity.user_id).await?;
    Ok(Json(enrollments.into_iter().map(Into::into).collect()))
}

// ── PATCH /enrollments/@me/{course_id} ───────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateProgressRequest {
    pub progress: i64,
}

pub async fn update_progress(
    identity: SessionHeaders,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Json(body): Json<UpdateProgressRequest>,
) -> Result<Json<EnrollmentResponse>, StoreError> {
    authenticate(&state, &identity).await?;
    let usecase = UpdateProgressUseCase {
        enrollments: state.enrollment_repo(),
    };
    let enrollment = usecase
        .execute(&identity.user_id, &course_id, body.progress)
        .await?
        .ok_or(StoreError::NotFound)?;

    RefreshEnrolledCoursesUseCase {
        users: state.user_repo(),
        enrollments: state.enrollment_repo(),
    }
    .execute_best_effort(&identity.user_id)
    .await;
    Ok(Json(enrollment.into()))
}

// ── GET /enrollments/@me/{course_id}/access ──────────────────────────────────

pub async fn check_access(
    identity: SessionHeaders,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<AccessDecision>, StoreError> {
    authenticate(&state, &identity).await?;
    let usecase = CheckCourseAccessUseCase {
        enrollments: state.enrollment_repo(),
    };
    let decision = usecase.execute(&identity.user_id, &course_id).await?;
    Ok(Json(decision))
}
