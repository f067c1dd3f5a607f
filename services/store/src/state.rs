use std::sync::Arc;

use reqwest::Client;

use crate::config::TableEndpoints;
use crate::infra::local::{LocalStore, LocalTable};
use crate::infra::remote::{TableClient, TableEndpoint};
use crate::infra::repository::{
    TableCourseRepository, TableEnrollmentRepository, TablePasswordResetRepository,
    TablePaymentRepository, TablePurchaseIntentRepository, TableSessionRepository,
    TableUserRepository,
};
use crate::infra::store::FallbackStore;

/// Remote table backed by its local fallback counterpart.
pub type StoreTable = FallbackStore<TableClient, LocalTable>;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub http: Client,
    pub endpoints: TableEndpoints,
    pub local: LocalStore,
    /// Normalized emails of users allowed on administrative routes.
    pub admin_emails: Arc<[String]>,
}

impl AppState {
    pub fn new(endpoints: TableEndpoints, local: LocalStore) -> Self {
        Self {
            http: Client::new(),
            endpoints,
            local,
            admin_emails: Vec::new().into(),
        }
    }

    pub fn with_admins(mut self, emails: Vec<String>) -> Self {
        self.admin_emails = emails.into();
        self
    }

    pub fn is_admin(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|admin| admin == email)
    }

    fn client(&self, endpoint: &TableEndpoint) -> TableClient {
        TableClient::new(self.http.clone(), endpoint.clone())
    }

    fn table(&self, endpoint: &TableEndpoint) -> StoreTable {
        FallbackStore {
            remote: self.client(endpoint),
            local: self.local.table(endpoint.table()),
        }
    }

    /// Plain remote clients, used by the replay pass.
    pub fn remote_tables(&self) -> Vec<TableClient> {
        self.endpoints
            .all()
            .into_iter()
            .map(|endpoint| self.client(endpoint))
            .collect()
    }

    pub fn user_repo(&self) -> TableUserRepository<StoreTable> {
        TableUserRepository {
            store: self.table(&self.endpoints.users),
        }
    }

    pub fn course_repo(&self) -> TableCourseRepository<StoreTable> {
        TableCourseRepository {
            store: self.table(&self.endpoints.courses),
        }
    }

    pub fn payment_repo(&self) -> TablePaymentRepository<StoreTable> {
        TablePaymentRepository {
            store: self.table(&self.endpoints.payments),
        }
    }

    pub fn enrollment_repo(&self) -> TableEnrollmentRepository<StoreTable> {
        TableEnrollmentRepository {
            store: self.table(&self.endpoints.enrollments),
        }
    }

    pub fn session_repo(&self) -> TableSessionRepository<StoreTable> {
        TableSessionRepository {
            store: self.table(&self.endpoints.sessions),
        }
    }

    pub fn intent_repo(&self) -> TablePurchaseIntentRepository<StoreTable> {
        TablePurchaseIntentRepository {
            store: self.table(&self.endpoints.intents),
        }
    }

    pub fn reset_repo(&self) -> TablePasswordResetRepository<StoreTable> {
        TablePasswordResetRepository {
            store: self.table(&self.endpoints.resets),
        }
    }
}
