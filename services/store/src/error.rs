use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use campus_domain::payment::InvalidTransition;

/// Store error variants.
///
/// `Unavailable` and `Unauthorized` come from the remote table and are absorbed
/// by the fallback policy; the rest reach callers as-is.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("table service unavailable: {0}")]
    Unavailable(String),
    #[error("table access token rejected")]
    Unauthorized,
    #[error("entity not found")]
    NotFound,
    #[error("entity already exists")]
    Conflict,
    #[error("entity encoding failed: {0}")]
    Encoding(String),
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid session")]
    InvalidSession,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("administrator session required")]
    Forbidden,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Encoding(_) => "ENCODING_ERROR",
            Self::InvalidTransition(_) => "INVALID_TRANSITION",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidSession => "INVALID_SESSION",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Forbidden => "FORBIDDEN",
            Self::Config(_) => "CONFIG",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Infrastructure failures that the local fallback store may answer instead.
    pub fn is_degradable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Unauthorized)
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unavailable(_) | Self::Unauthorized => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict | Self::InvalidTransition(_) => StatusCode::CONFLICT,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::InvalidSession | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Encoding(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        match &self {
            Self::Internal(e) => tracing::error!(error = ?e, kind = self.kind(), "internal error"),
            Self::Encoding(_) | Self::Config(_) => {
                tracing::error!(error = %self, kind = self.kind(), "store error")
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
