use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{EnrolledCourse, User};
use crate::error::StoreError;
use crate::state::AppState;
use crate::usecase::credential::{CreateUserInput, CreateUserUseCase};

// ── POST /users ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub marketing_agreed: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub email_verified: bool,
    pub marketing_agreed: bool,
    pub enrolled_courses: Vec<EnrolledCourse>,
    #[serde(with = "campus_domain::serde::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "campus_domain::serde::optional_timestamp")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.row_key,
            email: user.email,
            name: user.name,
            email_verified: user.email_verified,
            marketing_agreed: user.marketing_agreed,
            enrolled_courses: user.enrolled_courses,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), StoreError> {
    let usecase = CreateUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(CreateUserInput {
            email: body.email,
            name: body.name,
            password: body.password,
            marketing_agreed: body.marketing_agreed,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}
