use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Handler for `GET /healthz`: the process is up.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// One dependency checked by a readiness handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub ok: bool,
    /// Informational checks are reported but never fail readiness.
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Check {
    pub fn required(name: &'static str, result: Result<(), String>) -> Self {
        Self::new(name, true, result)
    }

    pub fn informational(name: &'static str, result: Result<(), String>) -> Self {
        Self::new(name, false, result)
    }

    fn new(name: &'static str, required: bool, result: Result<(), String>) -> Self {
        Self {
            name,
            ok: result.is_ok(),
            required,
            detail: result.err(),
        }
    }
}

/// Body of `GET /readyz`. Answers 503 when a required check failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    pub ready: bool,
    pub checks: Vec<Check>,
}

impl Readiness {
    pub fn from_checks(checks: Vec<Check>) -> Self {
        let ready = checks.iter().all(|c| c.ok || !c.required);
        Self { ready, checks }
    }
}

impl IntoResponse for Readiness {
    fn into_response(self) -> Response {
        let status = if self.ready {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        (status, Json(self)).into_response()
    }
}
