use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_core::identity::SessionHeaders;

use crate::error::StoreError;
use crate::handlers::authenticate;
use crate::state::AppState;
use crate::usecase::credential::ValidateUserUseCase;
use crate::usecase::session::{CreateSessionUseCase, DeleteSessionUseCase};

// ── POST /sessions ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: String,
    pub session_id: String,
    #[serde(with = "campus_domain::serde::timestamp")]
    pub expires_at: DateTime<Utc>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), StoreError> {
    let validate = ValidateUserUseCase {
        users: state.user_repo(),
    };
    let user = validate
        .execute(&body.email, &body.password)
        .await?
        .ok_or(StoreError::InvalidCredentials)?;

    let create = CreateSessionUseCase {
        sessions: state.session_repo(),
    };
    let session = create.execute(user.id()).await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            user_id: session.user_id().to_owned(),
            session_id: session.id().to_owned(),
            expires_at: session.expires_at,
        }),
    ))
}

// ── GET /sessions/@me ────────────────────────────────────────────────────────

pub async fn check_session(
    identity: SessionHeaders,
    State(state): State<AppState>,
) -> Result<StatusCode, StoreError> {
    authenticate(&state, &identity).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /sessions/@me ─────────────────────────────────────────────────────

pub async fn logout(
    identity: SessionHeaders,
    State(state): State<AppState>,
) -> Result<StatusCode, StoreError> {
    let usecase = DeleteSessionUseCase {
        sessions: state.session_repo(),
    };
    usecase
        .execute(&identity.user_id, &identity.session_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
