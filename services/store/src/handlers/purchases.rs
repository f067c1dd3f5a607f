use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use campus_core::identity::SessionHeaders;

use crate::error::StoreError;
use crate::handlers::authenticate;
use crate::handlers::enrollments::EnrollmentResponse;
use crate::handlers::payments::PaymentResponse;
use crate::state::AppState;
use crate::usecase::enrollment::RefreshEnrolledCoursesUseCase;
use crate::usecase::purchase::{PurchaseAndEnrollUseCase, PurchaseInput};

// ── POST /purchases ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub course_id: String,
    pub amount: i64,
    pub payment_method: String,
    #[serde(default)]
    pub external_payment_id: Option<String>,
}

#[derive(Serialize)]
pub struct PurchaseResponse {
    pub payment: PaymentResponse,
    pub enrollment: EnrollmentResponse,
}

pub async fn purchase(
    identity: SessionHeaders,
    State(state): State<AppState>,
    Json(body): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseResponse>), StoreError> {
    authenticate(&state, &identity).await?;
    let usecase = PurchaseAndEnrollUseCase {
        payments: state.payment_repo(),
        enrollments: state.enrollment_repo(),
        intents: state.intent_repo(),
    };
    let outcome = usecase
        .execute(PurchaseInput {
            user_id: identity.user_id.clone(),
            course_id: body.course_id,
            amount: body.amount,
            payment_method: body.payment_method,
            external_payment_id: body.external_payment_id,
        })
        .await?;

    RefreshEnrolledCoursesUseCase {
        users: state.user_repo(),
        enrollments: state.enrollment_repo(),
    }
    .execute_best_effort(&identity.user_id)
    .await;
    Ok((
        StatusCode::CREATED,
        Json(PurchaseResponse {
            payment: outcome.payment.into(),
            enrollment: outcome.enrollment.into(),
        }),
    ))
}
