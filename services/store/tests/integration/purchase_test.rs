use chrono::{Duration, Utc};

use campus_store::domain::repository::{
    EnrollmentRepository, PaymentRepository, PurchaseIntentRepository, UserRepository,
};
use campus_store::domain::types::{
    AccessDecision, DenyReason, EnrollmentStatus, IntentStage, PaymentStatus, PurchaseIntent,
};
use campus_store::error::StoreError;
use campus_store::usecase::access::CheckCourseAccessUseCase;
use campus_store::usecase::enrollment::{
    CreateEnrollmentUseCase, RefreshEnrolledCoursesUseCase, RemoveEnrollmentUseCase,
    UpdateProgressUseCase,
};
use campus_store::usecase::payment::UpdatePaymentStatusUseCase;
use campus_store::usecase::purchase::{
    PurchaseAndEnrollUseCase, PurchaseInput, RepairPurchaseIntentsUseCase, RepairReport,
};
use campus_testing::fixture::{test_enrollment, test_payment, test_user};

use crate::helpers::MemoryRepos;

fn purchase_input() -> PurchaseInput {
    PurchaseInput {
        user_id: "u1".to_owned(),
        course_id: "c1".to_owned(),
        amount: 45_000,
        payment_method: "card".to_owned(),
        external_payment_id: None,
    }
}

fn purchase(repos: &MemoryRepos) -> PurchaseAndEnrollUseCase<
    impl PaymentRepository,
    impl EnrollmentRepository,
    impl PurchaseIntentRepository,
> {
    PurchaseAndEnrollUseCase {
        payments: repos.payments.clone(),
        enrollments: repos.enrollments.clone(),
        intents: repos.intents.clone(),
    }
}

fn access(repos: &MemoryRepos) -> CheckCourseAccessUseCase<impl EnrollmentRepository> {
    CheckCourseAccessUseCase {
        enrollments: repos.enrollments.clone(),
    }
}

// ── PurchaseAndEnrollUseCase ─────────────────────────────────────────────────

#[tokio::test]
async fn should_complete_payment_and_grant_ninety_days_of_access() {
    let repos = MemoryRepos::new();

    let outcome = purchase(&repos).execute(purchase_input()).await.unwrap();

    assert_eq!(outcome.payment.status, PaymentStatus::Completed);
    assert!(outcome.payment.payment_date.is_some());
    assert_eq!(outcome.payment.amount, 45_000);
    assert_eq!(outcome.enrollment.payment_id, outcome.payment.id());
    assert_eq!(outcome.enrollment.status, EnrollmentStatus::Active);
    assert_eq!(outcome.enrollment.progress, 0);
    assert_eq!(
        outcome.enrollment.access_expires_at - outcome.enrollment.enrolled_at,
        Duration::days(90)
    );

    let stored = repos
        .payments
        .find("u1", outcome.payment.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, PaymentStatus::Completed);
    assert!(repos.intents.list_open().await.unwrap().is_empty());

    let decision = access(&repos).execute("u1", "c1").await.unwrap();
    assert_eq!(decision, AccessDecision::granted());
}

#[tokio::test]
async fn should_not_extend_access_on_repeated_purchase() {
    let repos = MemoryRepos::new();
    let first = purchase(&repos).execute(purchase_input()).await.unwrap();

    let second = purchase(&repos).execute(purchase_input()).await.unwrap();

    assert_eq!(second.enrollment.enrolled_at, first.enrollment.enrolled_at);
    assert_eq!(
        second.enrollment.access_expires_at,
        first.enrollment.access_expires_at
    );
    assert_eq!(second.enrollment.payment_id, first.payment.id());
    assert_eq!(repos.enrollments.list_by_user("u1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn should_reject_invalid_purchase_before_writing() {
    let repos = MemoryRepos::new();
    let mut input = purchase_input();
    input.amount = -1;

    let result = purchase(&repos).execute(input).await;

    assert!(
        matches!(result, Err(StoreError::InvalidInput(_))),
        "expected InvalidInput, got {result:?}"
    );
    assert_eq!(repos.intents.store.len(), 0);
    assert_eq!(repos.payments.store.len(), 0);
}

// ── RepairPurchaseIntentsUseCase ─────────────────────────────────────────────

fn started_intent(id: &str, payment_id: &str) -> PurchaseIntent {
    PurchaseIntent::start(
        id.to_owned(),
        payment_id.to_owned(),
        "u1",
        "c1",
        45_000,
        "card",
        None,
        Utc::now(),
    )
}

#[tokio::test]
async fn should_finish_interrupted_purchase_with_pending_payment() {
    let repos = MemoryRepos::new();
    repos.intents.create(&started_intent("i1", "p1")).await.unwrap();
    repos
        .payments
        .create(&test_payment("p1", "u1", "c1", PaymentStatus::Pending))
        .await
        .unwrap();
    let repair = RepairPurchaseIntentsUseCase {
        payments: repos.payments.clone(),
        enrollments: repos.enrollments.clone(),
        intents: repos.intents.clone(),
    };

    let report = repair.execute().await.unwrap();

    assert_eq!(
        report,
        RepairReport {
            enrolled: 1,
            abandoned: 0,
            failed: 0
        }
    );
    let payment = repos.payments.find("u1", "p1").await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);
    let enrollment = repos.enrollments.find("u1", "c1").await.unwrap().unwrap();
    assert_eq!(enrollment.payment_id, "p1");
    assert!(repos.intents.list_open().await.unwrap().is_empty());
}

#[tokio::test]
async fn should_abandon_intent_without_usable_payment() {
    let repos = MemoryRepos::new();
    repos.intents.create(&started_intent("i1", "missing")).await.unwrap();
    repos.intents.create(&started_intent("i2", "p2")).await.unwrap();
    repos
        .payments
        .create(&test_payment("p2", "u1", "c1", PaymentStatus::Failed))
        .await
        .unwrap();
    let repair = RepairPurchaseIntentsUseCase {
        payments: repos.payments.clone(),
        enrollments: repos.enrollments.clone(),
        intents: repos.intents.clone(),
    };

    let report = repair.execute().await.unwrap();

    assert_eq!(report.abandoned, 2);
    assert_eq!(report.enrolled, 0);
    assert!(repos.enrollments.find("u1", "c1").await.unwrap().is_none());
    assert!(repos.intents.list_open().await.unwrap().is_empty());
}

#[tokio::test]
async fn should_enroll_when_payment_completed_before_interruption() {
    let repos = MemoryRepos::new();
    let mut intent = started_intent("i1", "p1");
    intent.advance(IntentStage::PaymentCompleted, Utc::now());
    repos.intents.create(&intent).await.unwrap();
    repos
        .payments
        .create(&test_payment("p1", "u1", "c1", PaymentStatus::Completed))
        .await
        .unwrap();
    let repair = RepairPurchaseIntentsUseCase {
        payments: repos.payments.clone(),
        enrollments: repos.enrollments.clone(),
        intents: repos.intents.clone(),
    };

    let report = repair.execute().await.unwrap();

    assert_eq!(report.enrolled, 1);
    assert!(repos.enrollments.find("u1", "c1").await.unwrap().is_some());
}

// ── CheckCourseAccessUseCase ─────────────────────────────────────────────────

#[tokio::test]
async fn should_deny_access_after_ninety_days() {
    let repos = MemoryRepos::new();
    repos
        .enrollments
        .create(&test_enrollment("u1", "c1", 91))
        .await
        .unwrap();

    let decision = access(&repos).execute("u1", "c1").await.unwrap();

    assert_eq!(decision, AccessDecision::denied(DenyReason::Expired));
}

#[tokio::test]
async fn should_deny_access_without_enrollment() {
    let repos = MemoryRepos::new();
    let decision = access(&repos).execute("u1", "c1").await.unwrap();
    assert_eq!(decision, AccessDecision::denied(DenyReason::NoEnrollment));
}

#[tokio::test]
async fn should_decide_access_around_the_expiry_instant() {
    let repos = MemoryRepos::new();
    let mut open = test_enrollment("u1", "c1", 0);
    open.access_expires_at = Utc::now() + Duration::seconds(5);
    let mut closed = test_enrollment("u1", "c2", 0);
    closed.access_expires_at = Utc::now() - Duration::seconds(1);
    repos.enrollments.create(&open).await.unwrap();
    repos.enrollments.create(&closed).await.unwrap();

    let usecase = access(&repos);
    assert!(usecase.execute("u1", "c1").await.unwrap().has_access);
    assert_eq!(
        usecase.execute("u1", "c2").await.unwrap(),
        AccessDecision::denied(DenyReason::Expired)
    );
}

#[tokio::test]
async fn should_deny_paused_enrollment_within_window() {
    let repos = MemoryRepos::new();
    let mut enrollment = test_enrollment("u1", "c1", 1);
    enrollment.status = EnrollmentStatus::Paused;
    repos.enrollments.create(&enrollment).await.unwrap();

    let decision = access(&repos).execute("u1", "c1").await.unwrap();

    assert_eq!(decision, AccessDecision::denied(DenyReason::Paused));
}

// ── Enrollment maintenance ───────────────────────────────────────────────────

#[tokio::test]
async fn should_complete_enrollment_at_full_progress() {
    let repos = MemoryRepos::new();
    repos
        .enrollments
        .create(&test_enrollment("u1", "c1", 10))
        .await
        .unwrap();
    let usecase = UpdateProgressUseCase {
        enrollments: repos.enrollments.clone(),
    };

    let updated = usecase.execute("u1", "c1", 150).await.unwrap().unwrap();

    assert_eq!(updated.progress, 100);
    assert_eq!(updated.status, EnrollmentStatus::Completed);
    assert!(updated.completed_at.is_some());
    assert!(usecase.execute("u1", "other", 10).await.unwrap().is_none());
}

#[tokio::test]
async fn should_return_existing_enrollment_when_enrolling_twice() {
    let repos = MemoryRepos::new();
    let existing = test_enrollment("u1", "c1", 30);
    repos.enrollments.create(&existing).await.unwrap();

    let enrollment = CreateEnrollmentUseCase {
        enrollments: repos.enrollments.clone(),
    }
    .execute("u1", "c1", "p-new")
    .await
    .unwrap();

    assert_eq!(enrollment.payment_id, existing.payment_id);
    assert_eq!(enrollment.access_expires_at, existing.access_expires_at);
}

#[tokio::test]
async fn should_refresh_enrolled_courses_cache() {
    let repos = MemoryRepos::new();
    repos.users.create(&test_user("u1")).await.unwrap();
    repos
        .enrollments
        .create(&test_enrollment("u1", "c1", 3))
        .await
        .unwrap();
    repos
        .enrollments
        .create(&test_enrollment("u1", "c2", 5))
        .await
        .unwrap();
    let refresh = RefreshEnrolledCoursesUseCase {
        users: repos.users.clone(),
        enrollments: repos.enrollments.clone(),
    };

    refresh.execute("u1").await.unwrap().unwrap();
    let user = repos.users.find_by_id("u1").await.unwrap().unwrap();
    let mut courses: Vec<_> = user
        .enrolled_courses
        .iter()
        .map(|c| c.course_id.as_str())
        .collect();
    courses.sort();
    assert_eq!(courses, vec!["c1", "c2"]);

    RemoveEnrollmentUseCase {
        enrollments: repos.enrollments.clone(),
    }
    .execute("u1", "c1")
    .await
    .unwrap();
    let user = refresh.execute("u1").await.unwrap().unwrap();
    assert_eq!(user.enrolled_courses.len(), 1);
    assert!(refresh.execute("nobody").await.unwrap().is_none());
}

// ── UpdatePaymentStatusUseCase ───────────────────────────────────────────────

#[tokio::test]
async fn should_refund_completed_payment_with_reason() {
    let repos = MemoryRepos::new();
    repos
        .payments
        .create(&test_payment("p1", "u1", "c1", PaymentStatus::Completed))
        .await
        .unwrap();
    let usecase = UpdatePaymentStatusUseCase {
        payments: repos.payments.clone(),
    };

    let payment = usecase
        .execute("u1", "p1", PaymentStatus::Refunded, Some("changed mind".to_owned()))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(payment.status, PaymentStatus::Refunded);
    assert!(payment.refund_date.is_some());
    assert_eq!(payment.refund_reason.as_deref(), Some("changed mind"));
}

#[tokio::test]
async fn should_reject_backward_transition_and_keep_stored_payment() {
    let repos = MemoryRepos::new();
    repos
        .payments
        .create(&test_payment("p1", "u1", "c1", PaymentStatus::Completed))
        .await
        .unwrap();
    let usecase = UpdatePaymentStatusUseCase {
        payments: repos.payments.clone(),
    };

    let result = usecase
        .execute("u1", "p1", PaymentStatus::Pending, None)
        .await;

    assert!(
        matches!(result, Err(StoreError::InvalidTransition(_))),
        "expected InvalidTransition, got {result:?}"
    );
    let stored = repos.payments.find("u1", "p1").await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Completed);
    assert!(usecase
        .execute("u1", "missing", PaymentStatus::Failed, None)
        .await
        .unwrap()
        .is_none());
}
