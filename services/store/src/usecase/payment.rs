use tracing::info;

use campus_domain::id::new_id;
use campus_domain::serde::now;

use crate::domain::repository::PaymentRepository;
use crate::domain::types::{Payment, PaymentStatus};
use crate::error::StoreError;

// ── CreatePayment ────────────────────────────────────────────────────────────

pub struct CreatePaymentInput {
    pub user_id: String,
    pub course_id: String,
    pub amount: i64,
    pub payment_method: String,
    pub external_payment_id: Option<String>,
}

pub struct CreatePaymentUseCase<P: PaymentRepository> {
    pub payments: P,
}

impl<P: PaymentRepository> CreatePaymentUseCase<P> {
    /// Record a new `pending` payment.
    pub async fn execute(&self, input: CreatePaymentInput) -> Result<Payment, StoreError> {
        if input.amount < 0 {
            return Err(StoreError::InvalidInput("amount must not be negative".to_owned()));
        }
        let payment = Payment::pending(
            new_id(),
            &input.user_id,
            &input.course_id,
            input.amount,
            &input.payment_method,
            input.external_payment_id,
            now(),
        );
        self.payments.create(&payment).await?;
        Ok(payment)
    }
}

// ── UpdatePaymentStatus ──────────────────────────────────────────────────────

pub struct UpdatePaymentStatusUseCase<P: PaymentRepository> {
    pub payments: P,
}

impl<P: PaymentRepository> UpdatePaymentStatusUseCase<P> {
    /// Advance a payment along its state machine.
    ///
    /// `Ok(None)` if the payment does not exist. Backward moves fail with
    /// [`StoreError::InvalidTransition`] and leave the stored payment untouched.
    pub async fn execute(
        &self,
        user_id: &str,
        payment_id: &str,
        status: PaymentStatus,
        refund_reason: Option<String>,
    ) -> Result<Option<Payment>, StoreError> {
        let Some(mut payment) = self.payments.find(user_id, payment_id).await? else {
            return Ok(None);
        };
        let from = payment.status;
        payment.advance(status, refund_reason, now())?;
        self.payments.update(&payment).await?;
        info!(payment_id, %from, to = %status, "payment status changed");
        Ok(Some(payment))
    }
}
