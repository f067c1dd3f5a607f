#![allow(async_fn_in_trait)]

use crate::domain::types::{
    Course, Enrollment, PasswordReset, Payment, PurchaseIntent, Session, User,
};
use crate::error::StoreError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    /// [`StoreError::Conflict`] if the user id is taken.
    async fn create(&self, user: &User) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;
    /// Exact match on the stored (normalized) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn list(&self) -> Result<Vec<User>, StoreError>;
    async fn update(&self, user: &User) -> Result<(), StoreError>;
}

/// Repository for the course catalog.
pub trait CourseRepository: Send + Sync {
    async fn create(&self, course: &Course) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Course>, StoreError>;
    async fn list(&self) -> Result<Vec<Course>, StoreError>;
}

/// Repository for payments, partitioned by user.
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: &Payment) -> Result<(), StoreError>;
    async fn find(&self, user_id: &str, payment_id: &str) -> Result<Option<Payment>, StoreError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Payment>, StoreError>;
    async fn update(&self, payment: &Payment) -> Result<(), StoreError>;
}

/// Repository for enrollments, one row per `(user, course)`.
pub trait EnrollmentRepository: Send + Sync {
    /// [`StoreError::Conflict`] if the user is already enrolled in the course.
    async fn create(&self, enrollment: &Enrollment) -> Result<(), StoreError>;
    async fn find(&self, user_id: &str, course_id: &str) -> Result<Option<Enrollment>, StoreError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Enrollment>, StoreError>;
    async fn update(&self, enrollment: &Enrollment) -> Result<(), StoreError>;
    /// Idempotent.
    async fn delete(&self, user_id: &str, course_id: &str) -> Result<(), StoreError>;
}

/// Repository for login sessions.
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<(), StoreError>;
    async fn find(&self, user_id: &str, session_id: &str) -> Result<Option<Session>, StoreError>;
    /// Idempotent.
    async fn delete(&self, user_id: &str, session_id: &str) -> Result<(), StoreError>;
}

/// Purchase saga log.
pub trait PurchaseIntentRepository: Send + Sync {
    async fn create(&self, intent: &PurchaseIntent) -> Result<(), StoreError>;
    async fn update(&self, intent: &PurchaseIntent) -> Result<(), StoreError>;
    /// Intents that are neither enrolled nor abandoned, oldest first.
    async fn list_open(&self) -> Result<Vec<PurchaseIntent>, StoreError>;
}

/// One outstanding reset code per user.
pub trait PasswordResetRepository: Send + Sync {
    /// Insert or overwrite the user's code.
    async fn upsert(&self, reset: &PasswordReset) -> Result<(), StoreError>;
    async fn find(&self, user_id: &str) -> Result<Option<PasswordReset>, StoreError>;
    async fn delete(&self, user_id: &str) -> Result<(), StoreError>;
}
