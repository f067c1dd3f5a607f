use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_core::identity::SessionHeaders;

use crate::domain::types::{Payment, PaymentStatus};
use crate::error::StoreError;
use crate::handlers::authenticate;
use crate::state::AppState;
use crate::usecase::payment::{
    CreatePaymentInput, CreatePaymentUseCase, UpdatePaymentStatusUseCase,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: String,
    pub course_id: String,
    pub amount: i64,
    pub payment_method: String,
    pub status: PaymentStatus,
    #[serde(with = "campus_domain::serde::optional_timestamp")]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(with = "campus_domain::serde::optional_timestamp")]
    pub refund_date: Option<DateTime<Utc>>,
    pub refund_reason: Option<String>,
    pub external_payment_id: Option<String>,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            id: p.row_key,
            course_id: p.course_id,
            amount: p.amount,
            payment_method: p.payment_method,
            status: p.status,
            payment_date: p.payment_date,
            refund_date: p.refund_date,
            refund_reason: p.refund_reason,
            external_payment_id: p.external_payment_id,
        }
    }
}

// ── POST /payments/@me ───────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub course_id: String,
    pub amount: i64,
    pub payment_method: String,
    #[serde(default)]
    pub external_payment_id: Option<String>,
}

/// Record a pending payment, e.g. a bank transfer awaiting confirmation.
pub async fn create_payment(
    identity: SessionHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), StoreError> {
    authenticate(&state, &identity).await?;
    let usecase = CreatePaymentUseCase {
        payments: state.payment_repo(),
    };
    let payment = usecase
        .execute(CreatePaymentInput {
            user_id: identity.user_id,
            course_id: body.course_id,
            amount: body.amount,
            payment_method: body.payment_method,
            external_payment_id: body.external_payment_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(payment.into())))
}

// ── PATCH /payments/@me/{payment_id} ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdatePaymentRequest {
    pub status: PaymentStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

pub async fn update_payment_status(
    identity: SessionHeaders,
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
    Json(body): Json<UpdatePaymentRequest>,
) -> Result<Json<PaymentResponse>, StoreError> {
    authenticate(&state, &identity).await?;
    let usecase = UpdatePaymentStatusUseCase {
        payments: state.payment_repo(),
    };
    let payment = usecase
        .execute(&identity.user_id, &payment_id, body.status, body.reason)
        .await?
        .ok_or(StoreError::NotFound)?;
    Ok(Json(payment.into()))
}
