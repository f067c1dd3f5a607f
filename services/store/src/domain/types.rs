//! Table names and re-exports of the record types stored in them.

pub use campus_domain::access::{AccessDecision, DenyReason};
pub use campus_domain::course::{Course, CourseDraft, CourseStatus};
pub use campus_domain::enrollment::{Enrollment, EnrollmentStatus};
pub use campus_domain::intent::{IntentStage, PurchaseIntent};
pub use campus_domain::payment::{Payment, PaymentStatus};
pub use campus_domain::reset::PasswordReset;
pub use campus_domain::session::Session;
pub use campus_domain::user::{EnrolledCourse, User};

pub const USERS_TABLE: &str = "users";
pub const COURSES_TABLE: &str = "courses";
pub const PAYMENTS_TABLE: &str = "payments";
pub const ENROLLMENTS_TABLE: &str = "enrollments";
pub const SESSIONS_TABLE: &str = "sessions";
pub const INTENTS_TABLE: &str = "purchaseintents";
pub const RESETS_TABLE: &str = "passwordresets";

/// Every table the store reads or writes.
pub const ALL_TABLES: [&str; 7] = [
    USERS_TABLE,
    COURSES_TABLE,
    PAYMENTS_TABLE,
    ENROLLMENTS_TABLE,
    SESSIONS_TABLE,
    INTENTS_TABLE,
    RESETS_TABLE,
];
