use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use campus_core::health::healthz;
use campus_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    courses::{create_course, get_course, list_courses},
    enrollments::{check_access, get_my_enrollments, update_progress},
    health::readyz,
    payments::{create_payment, update_payment_status},
    purchases::purchase,
    sessions::{check_session, login, logout},
    users::create_user,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Users
        .route("/users", post(create_user))
        // Sessions
        .route("/sessions", post(login))
        .route("/sessions/@me", get(check_session).delete(logout))
        // Courses
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}", get(get_course))
        // Enrollments
        .route("/enrollments/@me", get(get_my_enrollments))
        .route("/enrollments/@me/{course_id}", patch(update_progress))
        .route("/enrollments/@me/{course_id}/access", get(check_access))
        // Purchases and payments
        .route("/purchases", post(purchase))
        .route("/payments/@me", post(create_payment))
        .route("/payments/@me/{payment_id}", patch(update_payment_status))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
