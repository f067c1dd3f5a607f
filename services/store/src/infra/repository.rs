//! Domain repositories over any [`TableStore`].
//!
//! In the service each store is a [`FallbackStore`](crate::infra::store::FallbackStore)
//! of the remote table and its local counterpart; the repositories only encode,
//! decode and build filters.

use serde::Serialize;
use serde::de::DeserializeOwned;

use campus_domain::course::COURSES_PARTITION;
use campus_domain::intent::INTENTS_PARTITION;
use campus_domain::reset::RESETS_PARTITION;
use campus_domain::user::USERS_PARTITION;

use crate::domain::repository::{
    CourseRepository, EnrollmentRepository, PasswordResetRepository, PaymentRepository,
    PurchaseIntentRepository, SessionRepository, UserRepository,
};
use crate::domain::types::{
    Course, Enrollment, PasswordReset, Payment, PurchaseIntent, Session, User,
};
use crate::error::StoreError;
use crate::infra::codec::{PARTITION_KEY, decode, encode};
use crate::infra::filter::Filter;
use crate::infra::store::TableStore;

async fn fetch<S, T>(store: &S, partition_key: &str, row_key: &str) -> Result<Option<T>, StoreError>
where
    S: TableStore,
    T: DeserializeOwned,
{
    store
        .get(partition_key, row_key)
        .await?
        .map(decode)
        .transpose()
}

async fn fetch_all<S, T>(store: &S, filter: Option<&Filter>) -> Result<Vec<T>, StoreError>
where
    S: TableStore,
    T: DeserializeOwned,
{
    store.list(filter).await?.into_iter().map(decode).collect()
}

async fn insert<S: TableStore, T: Serialize>(store: &S, record: &T) -> Result<(), StoreError> {
    store.insert(&encode(record)?).await
}

async fn replace<S: TableStore, T: Serialize>(store: &S, record: &T) -> Result<(), StoreError> {
    store.replace(&encode(record)?).await
}

fn partition(key: &str) -> Filter {
    Filter::eq(PARTITION_KEY, key)
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct TableUserRepository<S> {
    pub store: S,
}

impl<S: TableStore> UserRepository for TableUserRepository<S> {
    async fn create(&self, user: &User) -> Result<(), StoreError> {
        insert(&self.store, user).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        fetch(&self.store, USERS_PARTITION, id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let filter = Filter::eq("email", email);
        let users: Vec<User> = fetch_all(&self.store, Some(&filter)).await?;
        Ok(users.into_iter().next())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        fetch_all(&self.store, Some(&partition(USERS_PARTITION))).await
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        replace(&self.store, user).await
    }
}

// ── Course repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct TableCourseRepository<S> {
    pub store: S,
}

impl<S: TableStore> CourseRepository for TableCourseRepository<S> {
    async fn create(&self, course: &Course) -> Result<(), StoreError> {
        insert(&self.store, course).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Course>, StoreError> {
        fetch(&self.store, COURSES_PARTITION, id).await
    }

    async fn list(&self) -> Result<Vec<Course>, StoreError> {
        fetch_all(&self.store, Some(&partition(COURSES_PARTITION))).await
    }
}

// ── Payment repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct TablePaymentRepository<S> {
    pub store: S,
}

impl<S: TableStore> PaymentRepository for TablePaymentRepository<S> {
    async fn create(&self, payment: &Payment) -> Result<(), StoreError> {
        insert(&self.store, payment).await
    }

    async fn find(&self, user_id: &str, payment_id: &str) -> Result<Option<Payment>, StoreError> {
        fetch(&self.store, user_id, payment_id).await
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Payment>, StoreError> {
        fetch_all(&self.store, Some(&partition(user_id))).await
    }

    async fn update(&self, payment: &Payment) -> Result<(), StoreError> {
        replace(&self.store, payment).await
    }
}

// ── Enrollment repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct TableEnrollmentRepository<S> {
    pub store: S,
}

impl<S: TableStore> EnrollmentRepository for TableEnrollmentRepository<S> {
    async fn create(&self, enrollment: &Enrollment) -> Result<(), StoreError> {
        insert(&self.store, enrollment).await
    }

    async fn find(&self, user_id: &str, course_id: &str) -> Result<Option<Enrollment>, StoreError> {
        fetch(&self.store, user_id, course_id).await
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Enrollment>, StoreError> {
        fetch_all(&self.store, Some(&partition(user_id))).await
    }

    async fn update(&self, enrollment: &Enrollment) -> Result<(), StoreError> {
        replace(&self.store, enrollment).await
    }

    async fn delete(&self, user_id: &str, course_id: &str) -> Result<(), StoreError> {
        self.store.delete(user_id, course_id).await
    }
}

// ── Session repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct TableSessionRepository<S> {
    pub store: S,
}

impl<S: TableStore> SessionRepository for TableSessionRepository<S> {
    async fn create(&self, session: &Session) -> Result<(), StoreError> {
        insert(&self.store, session).await
    }

    async fn find(&self, user_id: &str, session_id: &str) -> Result<Option<Session>, StoreError> {
        fetch(&self.store, user_id, session_id).await
    }

    async fn delete(&self, user_id: &str, session_id: &str) -> Result<(), StoreError> {
        self.store.delete(user_id, session_id).await
    }
}

// ── PurchaseIntent repository ────────────────────────────────────────────────

#[derive(Clone)]
pub struct TablePurchaseIntentRepository<S> {
    pub store: S,
}

impl<S: TableStore> PurchaseIntentRepository for TablePurchaseIntentRepository<S> {
    async fn create(&self, intent: &PurchaseIntent) -> Result<(), StoreError> {
        insert(&self.store, intent).await
    }

    async fn update(&self, intent: &PurchaseIntent) -> Result<(), StoreError> {
        replace(&self.store, intent).await
    }

    async fn list_open(&self) -> Result<Vec<PurchaseIntent>, StoreError> {
        let intents: Vec<PurchaseIntent> =
            fetch_all(&self.store, Some(&partition(INTENTS_PARTITION))).await?;
        let mut open: Vec<_> = intents.into_iter().filter(PurchaseIntent::is_open).collect();
        open.sort_by_key(|i| i.created_at);
        Ok(open)
    }
}

// ── PasswordReset repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct TablePasswordResetRepository<S> {
    pub store: S,
}

impl<S: TableStore> PasswordResetRepository for TablePasswordResetRepository<S> {
    async fn upsert(&self, reset: &PasswordReset) -> Result<(), StoreError> {
        let entity = encode(reset)?;
        match self.store.replace(&entity).await {
            Err(StoreError::NotFound) => self.store.insert(&entity).await,
            other => other,
        }
    }

    async fn find(&self, user_id: &str) -> Result<Option<PasswordReset>, StoreError> {
        fetch(&self.store, RESETS_PARTITION, user_id).await
    }

    async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        self.store.delete(RESETS_PARTITION, user_id).await
    }
}
