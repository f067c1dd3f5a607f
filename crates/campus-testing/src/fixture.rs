//! Record fixtures with fixed, readable defaults.

use chrono::{DateTime, Duration, TimeZone, Utc};

use campus_domain::course::{Course, CourseDraft};
use campus_domain::enrollment::Enrollment;
use campus_domain::payment::{Payment, PaymentStatus};
use campus_domain::serde::now;
use campus_domain::user::User;

/// Fixed reference instant used by every fixture.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

/// User `id` with email `{id}@example.com` and no usable password.
pub fn test_user(id: &str) -> User {
    User::new(
        id.to_owned(),
        &format!("{id}@example.com"),
        format!("Test User {id}"),
        String::new(),
        false,
        fixed_now(),
    )
}

pub fn test_course(id: &str, price: i64) -> Course {
    Course::new(
        CourseDraft {
            id: id.to_owned(),
            title: format!("Course {id}"),
            description: "A test course".to_owned(),
            price,
            instructor: "Instructor".to_owned(),
            start_date: fixed_now() + Duration::days(7),
            max_students: 30,
        },
        fixed_now(),
    )
}

/// Enrollment created `days_ago` days before now, at wire precision.
pub fn test_enrollment(user_id: &str, course_id: &str, days_ago: i64) -> Enrollment {
    Enrollment::new(
        user_id,
        course_id,
        &format!("pay-{user_id}-{course_id}"),
        now() - Duration::days(days_ago),
    )
}

pub fn test_payment(id: &str, user_id: &str, course_id: &str, status: PaymentStatus) -> Payment {
    let mut payment = Payment::pending(
        id.to_owned(),
        user_id,
        course_id,
        45_000,
        "card",
        None,
        fixed_now(),
    );
    if status != PaymentStatus::Pending {
        payment.status = status;
    }
    payment
}
