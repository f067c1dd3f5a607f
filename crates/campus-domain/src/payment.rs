//! Payment records and their forward-only state machine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payment lifecycle: `pending → completed | failed`, `completed → refunded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Completed)
                | (Self::Pending, Self::Failed)
                | (Self::Completed, Self::Refunded)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("payment cannot move from {from} to {to}")]
pub struct InvalidTransition {
    pub from: PaymentStatus,
    pub to: PaymentStatus,
}

/// Payment record. Partition key is the user id, row key is the payment id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub partition_key: String,
    pub row_key: String,
    pub course_id: String,
    pub amount: i64,
    pub payment_method: String,
    pub status: PaymentStatus,
    #[serde(default, with = "crate::serde::optional_timestamp")]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::serde::optional_timestamp")]
    pub refund_date: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::serde::optional_string")]
    pub refund_reason: Option<String>,
    #[serde(default, with = "crate::serde::optional_string")]
    pub external_payment_id: Option<String>,
    #[serde(with = "crate::serde::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::serde::timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn pending(
        id: String,
        user_id: &str,
        course_id: &str,
        amount: i64,
        payment_method: &str,
        external_payment_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            partition_key: user_id.to_owned(),
            row_key: id,
            course_id: course_id.to_owned(),
            amount,
            payment_method: payment_method.to_owned(),
            status: PaymentStatus::Pending,
            payment_date: None,
            refund_date: None,
            refund_reason: None,
            external_payment_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.row_key
    }

    pub fn user_id(&self) -> &str {
        &self.partition_key
    }

    /// Move to `next`, stamping the matching date fields.
    ///
    /// `refund_reason` is only recorded for `refunded`.
    pub fn advance(
        &mut self,
        next: PaymentStatus,
        refund_reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), InvalidTransition> {
        if !self.status.can_advance_to(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        match next {
            PaymentStatus::Completed => self.payment_date = Some(now),
            PaymentStatus::Refunded => {
                self.refund_date = Some(now);
                self.refund_reason = refund_reason;
            }
            PaymentStatus::Pending | PaymentStatus::Failed => {}
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}
