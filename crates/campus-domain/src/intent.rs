//! Purchase intent log entries.
//!
//! An intent is written before a purchase touches any payment and is closed
//! once the enrollment exists, so interrupted purchases can be found and
//! finished at startup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Partition shared by every intent row.
pub const INTENTS_PARTITION: &str = "intents";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntentStage {
    Started,
    PaymentCompleted,
    Enrolled,
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseIntent {
    pub partition_key: String,
    pub row_key: String,
    pub user_id: String,
    pub course_id: String,
    pub amount: i64,
    pub payment_method: String,
    #[serde(default, with = "crate::serde::optional_string")]
    pub external_payment_id: Option<String>,
    /// Chosen before the payment row is written.
    pub payment_id: String,
    pub stage: IntentStage,
    #[serde(with = "crate::serde::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::serde::timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl PurchaseIntent {
    #[allow(clippy::too_many_arguments)]
    pub fn start(
        id: String,
        payment_id: String,
        user_id: &str,
        course_id: &str,
        amount: i64,
        payment_method: &str,
        external_payment_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            partition_key: INTENTS_PARTITION.to_owned(),
            row_key: id,
            user_id: user_id.to_owned(),
            course_id: course_id.to_owned(),
            amount,
            payment_method: payment_method.to_owned(),
            external_payment_id,
            payment_id,
            stage: IntentStage::Started,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.row_key
    }

    /// Open intents still need repair.
    pub fn is_open(&self) -> bool {
        matches!(
            self.stage,
            IntentStage::Started | IntentStage::PaymentCompleted
        )
    }

    pub fn advance(&mut self, stage: IntentStage, now: DateTime<Utc>) {
        self.stage = stage;
        self.updated_at = now;
    }
}
