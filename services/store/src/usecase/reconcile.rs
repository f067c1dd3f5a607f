//! Enrollment reconciliation against an exported list of paid transactions.

use std::fmt;

use serde::Deserialize;
use tracing::{info, warn};

use campus_domain::user::normalize_email;

use crate::domain::repository::{
    EnrollmentRepository, PaymentRepository, PurchaseIntentRepository, UserRepository,
};
use crate::domain::types::User;
use crate::error::StoreError;
use crate::usecase::enrollment::RefreshEnrolledCoursesUseCase;
use crate::usecase::purchase::{PurchaseAndEnrollUseCase, PurchaseInput};

/// Payment method recorded when the transaction does not name one.
pub const DEFAULT_PAYMENT_METHOD: &str = "transfer";

/// One paid order from the payment provider's export.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Buyer email, possibly masked (`ab***@gmail.com`).
    pub email: String,
    pub order_id: String,
    pub amount: i64,
    pub date: String,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnknownUser,
    AmbiguousUser,
    AlreadyEnrolled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnknownUser => "no user with this email",
            Self::AmbiguousUser => "masked email matches several users",
            Self::AlreadyEnrolled => "already enrolled",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Enrolled { user_id: String, payment_id: String },
    /// Dry run: the row would have been enrolled.
    WouldEnroll { user_id: String },
    Skipped(SkipReason),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowReport {
    pub order_id: String,
    pub email: String,
    pub course_id: String,
    pub outcome: RowOutcome,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub rows: Vec<RowReport>,
}

impl ReconcileReport {
    /// Enrolled rows, including those a dry run would enroll.
    pub fn enrolled(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Enrolled { .. } | RowOutcome::WouldEnroll { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&RowOutcome) -> bool) -> usize {
        self.rows.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Whether `email` satisfies `pattern`.
///
/// A pattern without `*` must match exactly. A masked pattern must share the
/// domain and local-part length, with `*` matching any single character.
pub fn email_matches(pattern: &str, email: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == email;
    }
    let (Some((pattern_local, pattern_domain)), Some((local, domain))) =
        (pattern.split_once('@'), email.split_once('@'))
    else {
        return false;
    };
    pattern_domain == domain
        && pattern_local.chars().count() == local.chars().count()
        && pattern_local
            .chars()
            .zip(local.chars())
            .all(|(p, c)| p == '*' || p == c)
}

/// The single user matching `email`.
pub fn resolve_user<'a>(users: &'a [User], email: &str) -> Result<&'a User, SkipReason> {
    let pattern = normalize_email(email);
    let mut matches = users.iter().filter(|u| email_matches(&pattern, &u.email));
    match (matches.next(), matches.next()) {
        (Some(user), None) => Ok(user),
        (None, _) => Err(SkipReason::UnknownUser),
        (Some(_), Some(_)) => Err(SkipReason::AmbiguousUser),
    }
}

// ── ReconcileTransactions ────────────────────────────────────────────────────

pub struct ReconcileTransactionsUseCase<U, P, E, I>
where
    U: UserRepository + Clone,
    P: PaymentRepository + Clone,
    E: EnrollmentRepository + Clone,
    I: PurchaseIntentRepository + Clone,
{
    pub users: U,
    pub payments: P,
    pub enrollments: E,
    pub intents: I,
}

impl<U, P, E, I> ReconcileTransactionsUseCase<U, P, E, I>
where
    U: UserRepository + Clone,
    P: PaymentRepository + Clone,
    E: EnrollmentRepository + Clone,
    I: PurchaseIntentRepository + Clone,
{
    /// Enroll every paying user that is not enrolled yet.
    ///
    /// Rows without a course id use `default_course_id`. Each purchase records
    /// the order id as its external payment id. Per-row failures are reported,
    /// not returned; only loading the user list can fail the whole run.
    pub async fn execute(
        &self,
        transactions: &[Transaction],
        default_course_id: &str,
        dry_run: bool,
    ) -> Result<ReconcileReport, StoreError> {
        let users = self.users.list().await?;
        let mut report = ReconcileReport::default();
        for tx in transactions {
            let course_id = tx
                .course_id
                .as_deref()
                .filter(|c| !c.is_empty())
                .unwrap_or(default_course_id);
            let outcome = match resolve_user(&users, &tx.email) {
                Ok(user) => self.reconcile(user, course_id, tx, dry_run).await,
                Err(reason) => RowOutcome::Skipped(reason),
            };
            if let RowOutcome::Failed(error) = &outcome {
                warn!(order_id = %tx.order_id, course_id, error = %error, "reconcile row failed");
            }
            report.rows.push(RowReport {
                order_id: tx.order_id.clone(),
                email: tx.email.clone(),
                course_id: course_id.to_owned(),
                outcome,
            });
        }
        info!(
            enrolled = report.enrolled(),
            skipped = report.skipped(),
            failed = report.failed(),
            dry_run,
            "transactions reconciled"
        );
        Ok(report)
    }

    async fn reconcile(
        &self,
        user: &User,
        course_id: &str,
        tx: &Transaction,
        dry_run: bool,
    ) -> RowOutcome {
        match self.enrollments.find(user.id(), course_id).await {
            Ok(Some(_)) => return RowOutcome::Skipped(SkipReason::AlreadyEnrolled),
            Ok(None) => {}
            Err(e) => return RowOutcome::Failed(e.to_string()),
        }
        if dry_run {
            return RowOutcome::WouldEnroll {
                user_id: user.id().to_owned(),
            };
        }

        let purchase = PurchaseAndEnrollUseCase {
            payments: self.payments.clone(),
            enrollments: self.enrollments.clone(),
            intents: self.intents.clone(),
        };
        let input = PurchaseInput {
            user_id: user.id().to_owned(),
            course_id: course_id.to_owned(),
            amount: tx.amount,
            payment_method: tx
                .method
                .clone()
                .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_owned()),
            external_payment_id: Some(tx.order_id.clone()),
        };
        match purchase.execute(input).await {
            Ok(outcome) => {
                RefreshEnrolledCoursesUseCase {
                    users: self.users.clone(),
                    enrollments: self.enrollments.clone(),
                }
                .execute_best_effort(user.id())
                .await;
                RowOutcome::Enrolled {
                    user_id: user.id().to_owned(),
                    payment_id: outcome.payment.id().to_owned(),
                }
            }
            Err(e) => RowOutcome::Failed(e.to_string()),
        }
    }
}
