use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::domain::types::{
    COURSES_TABLE, ENROLLMENTS_TABLE, INTENTS_TABLE, PAYMENTS_TABLE, RESETS_TABLE, SESSIONS_TABLE,
    USERS_TABLE,
};
use crate::error::StoreError;
use campus_domain::user::normalize_email;

use crate::infra::remote::TableEndpoint;

pub const DEFAULT_LOCAL_STORE_URL: &str = "sqlite://campus-fallback.db?mode=rwc";
pub const DEFAULT_STORE_PORT: u16 = 3120;

/// Warn when the access signature expires within this many days.
pub const SIGNATURE_EXPIRY_WARNING_DAYS: i64 = 14;

/// Store service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Table service account URL (e.g. "https://acct.table.core.windows.net").
    /// Env var: `TABLE_ACCOUNT_URL`.
    pub table_account_url: String,
    /// Shared access signature appended to every table URL. Env var: `TABLE_SAS_TOKEN`.
    pub table_sas_token: String,
    /// SQLite URL of the local fallback store. Env var: `LOCAL_STORE_URL`.
    pub local_store_url: String,
    /// TCP port to listen on (default 3120). Env var: `STORE_PORT`.
    pub store_port: u16,
    /// Emails allowed to run administrative routes, comma separated.
    /// Env var: `ADMIN_EMAILS`. Empty means nobody.
    pub admin_emails: Vec<String>,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Missing table settings are a [`StoreError::Config`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StoreError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| StoreError::Config(format!("{key} is not set")))
        };
        Ok(Self {
            table_account_url: required("TABLE_ACCOUNT_URL")?,
            table_sas_token: required("TABLE_SAS_TOKEN")?,
            local_store_url: lookup("LOCAL_STORE_URL")
                .unwrap_or_else(|| DEFAULT_LOCAL_STORE_URL.to_owned()),
            store_port: lookup("STORE_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_STORE_PORT),
            admin_emails: lookup("ADMIN_EMAILS")
                .map(|v| parse_admin_emails(&v))
                .unwrap_or_default(),
        })
    }

    /// One endpoint per table, all sharing the configured signature.
    pub fn endpoints(&self) -> Result<TableEndpoints, StoreError> {
        TableEndpoints::from_account(&self.table_account_url, &self.table_sas_token)
    }
}

fn parse_admin_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_email)
        .filter(|e| !e.is_empty())
        .collect()
}

/// Endpoints of every table the store uses.
#[derive(Debug, Clone)]
pub struct TableEndpoints {
    pub users: TableEndpoint,
    pub courses: TableEndpoint,
    pub payments: TableEndpoint,
    pub enrollments: TableEndpoint,
    pub sessions: TableEndpoint,
    pub intents: TableEndpoint,
    pub resets: TableEndpoint,
}

impl TableEndpoints {
    pub fn from_account(account_url: &str, sas_token: &str) -> Result<Self, StoreError> {
        let endpoint = |table| TableEndpoint::from_account(account_url, table, sas_token);
        Ok(Self {
            users: endpoint(USERS_TABLE)?,
            courses: endpoint(COURSES_TABLE)?,
            payments: endpoint(PAYMENTS_TABLE)?,
            enrollments: endpoint(ENROLLMENTS_TABLE)?,
            sessions: endpoint(SESSIONS_TABLE)?,
            intents: endpoint(INTENTS_TABLE)?,
            resets: endpoint(RESETS_TABLE)?,
        })
    }

    pub fn all(&self) -> [&TableEndpoint; 7] {
        [
            &self.users,
            &self.courses,
            &self.payments,
            &self.enrollments,
            &self.sessions,
            &self.intents,
            &self.resets,
        ]
    }

    /// Earliest signature expiry across all endpoints, if any carries one.
    pub fn signature_expiry(&self) -> Option<DateTime<Utc>> {
        self.all()
            .iter()
            .filter_map(|e| e.signature_expiry())
            .min()
    }

    /// Log the signature status. Rotating the token means restarting with a new one.
    pub fn report_signature_health(&self, now: DateTime<Utc>) -> SignatureHealth {
        let health = signature_health(self.signature_expiry(), now);
        match health {
            SignatureHealth::Unknown => {
                warn!("table access signature carries no expiry")
            }
            SignatureHealth::Valid(at) => info!(expires_at = %at, "table access signature valid"),
            SignatureHealth::ExpiringSoon(at) => warn!(
                expires_at = %at,
                "table access signature expires soon, rotate TABLE_SAS_TOKEN and restart"
            ),
            SignatureHealth::Expired(at) => warn!(
                expires_at = %at,
                "table access signature expired, requests will use the local fallback"
            ),
        }
        health
    }
}

/// Status of the access signature relative to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureHealth {
    /// No `se` parameter in the token.
    Unknown,
    Valid(DateTime<Utc>),
    ExpiringSoon(DateTime<Utc>),
    Expired(DateTime<Utc>),
}

pub fn signature_health(expiry: Option<DateTime<Utc>>, now: DateTime<Utc>) -> SignatureHealth {
    match expiry {
        None => SignatureHealth::Unknown,
        Some(at) if at <= now => SignatureHealth::Expired(at),
        Some(at) if at - now <= Duration::days(SIGNATURE_EXPIRY_WARNING_DAYS) => {
            SignatureHealth::ExpiringSoon(at)
        }
        Some(at) => SignatureHealth::Valid(at),
    }
}
