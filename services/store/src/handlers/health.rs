use axum::extract::State;
use chrono::Utc;

use campus_core::health::{Check, Readiness};

use crate::config::{SignatureHealth, signature_health};
use crate::error::StoreError;
use crate::state::AppState;

// ── GET /readyz ──────────────────────────────────────────────────────────────

/// Ready while the local fallback store answers. Remote outages are served
/// from it, so the table signature is reported but never blocks readiness.
pub async fn readyz(State(state): State<AppState>) -> Readiness {
    let local = state.local.ping().await.map_err(|e| match e {
        StoreError::Internal(inner) => format!("{inner:#}"),
        other => other.to_string(),
    });
    let signature = match signature_health(state.endpoints.signature_expiry(), Utc::now()) {
        SignatureHealth::Expired(at) => Err(format!("expired at {at}")),
        SignatureHealth::ExpiringSoon(at) => Err(format!("expires at {at}")),
        SignatureHealth::Unknown => Err("no expiry in token".to_owned()),
        SignatureHealth::Valid(_) => Ok(()),
    };
    Readiness::from_checks(vec![
        Check::required("local_store", local),
        Check::informational("table_signature", signature),
    ])
}
