use tracing::{info, warn};

use campus_domain::id::{is_valid_key, new_id};
use campus_domain::serde::now;

use crate::domain::repository::{
    EnrollmentRepository, PaymentRepository, PurchaseIntentRepository,
};
use crate::domain::types::{Enrollment, IntentStage, Payment, PaymentStatus, PurchaseIntent};
use crate::error::StoreError;
use crate::usecase::enrollment::enroll;

// ── PurchaseAndEnroll ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PurchaseInput {
    pub user_id: String,
    pub course_id: String,
    pub amount: i64,
    pub payment_method: String,
    pub external_payment_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    pub payment: Payment,
    pub enrollment: Enrollment,
}

/// Purchase saga: intent, pending payment, completed payment, enrollment.
///
/// The intent is written first and carries the payment id, so a purchase
/// interrupted at any step is finished by [`RepairPurchaseIntentsUseCase`].
pub struct PurchaseAndEnrollUseCase<P, E, I>
where
    P: PaymentRepository,
    E: EnrollmentRepository,
    I: PurchaseIntentRepository,
{
    pub payments: P,
    pub enrollments: E,
    pub intents: I,
}

impl<P, E, I> PurchaseAndEnrollUseCase<P, E, I>
where
    P: PaymentRepository,
    E: EnrollmentRepository,
    I: PurchaseIntentRepository,
{
    pub async fn execute(&self, input: PurchaseInput) -> Result<PurchaseOutcome, StoreError> {
        validate(&input)?;

        let mut intent = PurchaseIntent::start(
            new_id(),
            new_id(),
            &input.user_id,
            &input.course_id,
            input.amount,
            &input.payment_method,
            input.external_payment_id.clone(),
            now(),
        );
        self.intents.create(&intent).await?;

        let mut payment = Payment::pending(
            intent.payment_id.clone(),
            &input.user_id,
            &input.course_id,
            input.amount,
            &input.payment_method,
            input.external_payment_id,
            now(),
        );
        self.payments.create(&payment).await?;
        payment.advance(PaymentStatus::Completed, None, now())?;
        self.payments.update(&payment).await?;
        self.checkpoint(&mut intent, IntentStage::PaymentCompleted).await;

        let enrollment = enroll(
            &self.enrollments,
            &input.user_id,
            &input.course_id,
            payment.id(),
        )
        .await?;
        self.checkpoint(&mut intent, IntentStage::Enrolled).await;

        info!(
            user_id = %input.user_id,
            course_id = %input.course_id,
            payment_id = payment.id(),
            amount = payment.amount,
            "course purchased"
        );
        Ok(PurchaseOutcome {
            payment,
            enrollment,
        })
    }

    // A lost checkpoint only means the repair pass redoes idempotent steps.
    async fn checkpoint(&self, intent: &mut PurchaseIntent, stage: IntentStage) {
        intent.advance(stage, now());
        if let Err(e) = self.intents.update(intent).await {
            warn!(intent_id = intent.id(), ?stage, error = %e, "failed to record purchase stage");
        }
    }
}

fn validate(input: &PurchaseInput) -> Result<(), StoreError> {
    if !is_valid_key(&input.user_id) {
        return Err(StoreError::InvalidInput(format!(
            "invalid user id: {:?}",
            input.user_id
        )));
    }
    if !is_valid_key(&input.course_id) {
        return Err(StoreError::InvalidInput(format!(
            "invalid course id: {:?}",
            input.course_id
        )));
    }
    if input.amount < 0 {
        return Err(StoreError::InvalidInput("amount must not be negative".to_owned()));
    }
    Ok(())
}

// ── RepairPurchaseIntents ────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RepairReport {
    pub enrolled: usize,
    pub abandoned: usize,
    pub failed: usize,
}

pub struct RepairPurchaseIntentsUseCase<P, E, I>
where
    P: PaymentRepository,
    E: EnrollmentRepository,
    I: PurchaseIntentRepository,
{
    pub payments: P,
    pub enrollments: E,
    pub intents: I,
}

impl<P, E, I> RepairPurchaseIntentsUseCase<P, E, I>
where
    P: PaymentRepository,
    E: EnrollmentRepository,
    I: PurchaseIntentRepository,
{
    /// Finish or abandon every open intent.
    ///
    /// An intent whose payment is missing, failed or refunded is abandoned.
    /// Otherwise a pending payment is completed and the enrollment created.
    /// Failures are logged per intent and counted.
    pub async fn execute(&self) -> Result<RepairReport, StoreError> {
        let mut report = RepairReport::default();
        for mut intent in self.intents.list_open().await? {
            match self.repair(&mut intent).await {
                Ok(IntentStage::Abandoned) => report.abandoned += 1,
                Ok(_) => report.enrolled += 1,
                Err(e) => {
                    warn!(intent_id = intent.id(), error = %e, "purchase repair failed");
                    report.failed += 1;
                }
            }
        }
        if report != RepairReport::default() {
            info!(
                enrolled = report.enrolled,
                abandoned = report.abandoned,
                failed = report.failed,
                "purchase intents repaired"
            );
        }
        Ok(report)
    }

    async fn repair(&self, intent: &mut PurchaseIntent) -> Result<IntentStage, StoreError> {
        let payment = self
            .payments
            .find(&intent.user_id, &intent.payment_id)
            .await?;
        let mut payment = match payment {
            Some(p) if matches!(p.status, PaymentStatus::Pending | PaymentStatus::Completed) => p,
            _ => return self.close(intent, IntentStage::Abandoned).await,
        };
        if payment.status == PaymentStatus::Pending {
            payment.advance(PaymentStatus::Completed, None, now())?;
            self.payments.update(&payment).await?;
        }
        enroll(
            &self.enrollments,
            &intent.user_id,
            &intent.course_id,
            payment.id(),
        )
        .await?;
        self.close(intent, IntentStage::Enrolled).await
    }

    async fn close(
        &self,
        intent: &mut PurchaseIntent,
        stage: IntentStage,
    ) -> Result<IntentStage, StoreError> {
        intent.advance(stage, now());
        self.intents.update(intent).await?;
        info!(intent_id = intent.id(), ?stage, "purchase intent closed");
        Ok(stage)
    }
}
