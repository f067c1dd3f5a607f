use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_core::identity::SessionHeaders;

use crate::domain::types::{Course, CourseDraft, CourseStatus};
use crate::error::StoreError;
use crate::handlers::authorize_admin;
use crate::state::AppState;
use crate::usecase::catalog::{CreateCourseUseCase, GetCourseUseCase, ListCoursesUseCase};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub instructor: String,
    #[serde(with = "campus_domain::serde::timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "campus_domain::serde::timestamp")]
    pub end_date: DateTime<Utc>,
    pub status: CourseStatus,
    pub max_students: u32,
    pub current_students: u32,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.row_key,
            title: course.title,
            description: course.description,
            price: course.price,
            instructor: course.instructor,
            start_date: course.start_date,
            end_date: course.end_date,
            status: course.status,
            max_students: course.max_students,
            current_students: course.current_students,
        }
    }
}

// ── GET /courses ─────────────────────────────────────────────────────────────

pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, StoreError> {
    let usecase = ListCoursesUseCase {
        courses: state.course_repo(),
    };
    let courses = usecase.execute().await?;
    Ok(Json(courses.into_iter().map(Into::into).collect()))
}

// ── GET /courses/{id} ────────────────────────────────────────────────────────

pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CourseResponse>, StoreError> {
    let usecase = GetCourseUseCase {
        courses: state.course_repo(),
    };
    let course = usecase.execute(&id).await?.ok_or(StoreError::NotFound)?;
    Ok(Json(course.into()))
}

// ── POST /courses ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    pub instructor: String,
    #[serde(with = "campus_domain::serde::timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub max_students: u32,
}

/// Administrators only.
pub async fn create_course(
    identity: SessionHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>), StoreError> {
    authorize_admin(&state, &identity).await?;
    let usecase = CreateCourseUseCase {
        courses: state.course_repo(),
    };
    let course = usecase
        .execute(CourseDraft {
            id: body.id.unwrap_or_default(),
            title: body.title,
            description: body.description,
            price: body.price,
            instructor: body.instructor,
            start_date: body.start_date,
            max_students: body.max_students,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(course.into())))
}
