//! Session identity headers extractor.

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;

pub const USER_ID_HEADER: &str = "x-campus-user-id";
pub const SESSION_ID_HEADER: &str = "x-campus-session-id";

/// Session identity sent by the client as `x-campus-user-id` and
/// `x-campus-session-id`.
///
/// Returns 401 if either header is absent or empty. Whether the session is
/// still valid is checked by handlers against the session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHeaders {
    pub user_id: String,
    pub session_id: String,
}

fn header(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

impl<S> FromRequestParts<S> for SessionHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Values are read synchronously so the returned future does not borrow `parts`.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let user_id = header(parts, USER_ID_HEADER);
        let session_id = header(parts, SESSION_ID_HEADER);

        async move {
            let user_id = user_id.ok_or(StatusCode::UNAUTHORIZED)?;
            let session_id = session_id.ok_or(StatusCode::UNAUTHORIZED)?;
            Ok(Self {
                user_id,
                session_id,
            })
        }
    }
}
