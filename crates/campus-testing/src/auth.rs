//! Session headers for handler tests.
//!
//! Authenticated routes read the caller's user id and session id from
//! `x-campus-user-id` and `x-campus-session-id`. `MockSession` builds those
//! headers so tests can call routes without going through a login.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use campus_core::identity::{SESSION_ID_HEADER, USER_ID_HEADER};

pub struct MockSession {
    pub user_id: String,
    pub session_id: String,
}

impl MockSession {
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }

    pub fn user_id_header(&self) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static(USER_ID_HEADER),
            HeaderValue::from_str(&self.user_id).unwrap(),
        )
    }

    pub fn session_id_header(&self) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static(SESSION_ID_HEADER),
            HeaderValue::from_str(&self.session_id).unwrap(),
        )
    }

    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in [self.user_id_header(), self.session_id_header()] {
            map.insert(name, value);
        }
        map
    }
}
