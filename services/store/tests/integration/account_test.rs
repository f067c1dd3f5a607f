use chrono::{Duration, Utc};

use campus_store::domain::repository::{PasswordResetRepository, UserRepository};
use campus_store::domain::types::PasswordReset;
use campus_store::error::StoreError;
use campus_store::infra::codec::Entity;
use campus_store::infra::store::TableStore;
use campus_store::usecase::credential::{
    ChangePasswordUseCase, CreateUserInput, CreateUserUseCase, GetUserByEmailUseCase,
    RequestPasswordResetUseCase, ResetPasswordInput, ResetPasswordUseCase, ValidateUserUseCase,
    VerifyResetCodeUseCase, legacy_hash,
};
use campus_testing::fixture::test_user;

use crate::helpers::MemoryRepos;

fn input(email: &str, password: &str) -> CreateUserInput {
    CreateUserInput {
        email: email.to_owned(),
        name: "Alice".to_owned(),
        password: password.to_owned(),
        marketing_agreed: true,
    }
}

// ── CreateUserUseCase ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_user_with_normalized_email_and_hashed_password() {
    let repos = MemoryRepos::new();
    let usecase = CreateUserUseCase {
        users: repos.users.clone(),
    };

    let user = usecase
        .execute(input("  Alice@Example.COM ", "s3cret"))
        .await
        .unwrap();

    assert_eq!(user.email, "alice@example.com");
    assert!(user.password_hash.starts_with("$argon2"));
    assert!(user.marketing_agreed);
    let stored = repos.users.find_by_id(user.id()).await.unwrap().unwrap();
    assert_eq!(stored.email, user.email);
    assert_eq!(stored.password_hash, user.password_hash);
}

#[tokio::test]
async fn should_reject_duplicate_email() {
    let repos = MemoryRepos::new();
    let usecase = CreateUserUseCase {
        users: repos.users.clone(),
    };
    usecase.execute(input("a@b.com", "pw")).await.unwrap();

    let result = usecase.execute(input("A@B.com", "other")).await;

    assert!(
        matches!(result, Err(StoreError::Conflict)),
        "expected Conflict, got {result:?}"
    );
    assert_eq!(repos.users.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn should_reject_malformed_email_and_empty_password() {
    let usecase = CreateUserUseCase {
        users: MemoryRepos::new().users,
    };

    let result = usecase.execute(input("not-an-email", "pw")).await;
    assert!(matches!(result, Err(StoreError::InvalidInput(_))), "got {result:?}");

    let result = usecase.execute(input("a@b.com", "")).await;
    assert!(matches!(result, Err(StoreError::InvalidInput(_))), "got {result:?}");
}

// ── ValidateUserUseCase ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_validate_correct_password_and_stamp_login() {
    let repos = MemoryRepos::new();
    let created = CreateUserUseCase {
        users: repos.users.clone(),
    }
    .execute(input("a@b.com", "pw"))
    .await
    .unwrap();
    let usecase = ValidateUserUseCase {
        users: repos.users.clone(),
    };

    let user = usecase.execute("A@b.com", "pw").await.unwrap().unwrap();

    assert_eq!(user.id(), created.id());
    let stored = repos.users.find_by_id(created.id()).await.unwrap().unwrap();
    assert!(stored.last_login_at.is_some());
}

#[tokio::test]
async fn should_reject_wrong_password_and_unknown_email() {
    let repos = MemoryRepos::new();
    CreateUserUseCase {
        users: repos.users.clone(),
    }
    .execute(input("a@b.com", "pw"))
    .await
    .unwrap();
    let usecase = ValidateUserUseCase {
        users: repos.users.clone(),
    };

    assert!(usecase.execute("a@b.com", "wrong").await.unwrap().is_none());
    assert!(usecase.execute("x@b.com", "pw").await.unwrap().is_none());
}

#[tokio::test]
async fn should_upgrade_legacy_hash_on_login() {
    let repos = MemoryRepos::new();
    let mut user = test_user("u1");
    user.password_hash = legacy_hash("old-pw");
    repos.users.create(&user).await.unwrap();
    let usecase = ValidateUserUseCase {
        users: repos.users.clone(),
    };

    let validated = usecase
        .execute("u1@example.com", "old-pw")
        .await
        .unwrap()
        .unwrap();

    assert!(validated.password_hash.starts_with("$argon2"));
    let stored = repos.users.find_by_id("u1").await.unwrap().unwrap();
    assert!(stored.password_hash.starts_with("$argon2"));
    assert!(usecase.execute("u1@example.com", "old-pw").await.unwrap().is_some());
}

// ── ChangePasswordUseCase ────────────────────────────────────────────────────

#[tokio::test]
async fn should_change_password_without_old_one() {
    let repos = MemoryRepos::new();
    repos.users.create(&test_user("u1")).await.unwrap();

    ChangePasswordUseCase {
        users: repos.users.clone(),
    }
    .execute("u1@example.com", "new-pw")
    .await
    .unwrap();

    let validate = ValidateUserUseCase {
        users: repos.users.clone(),
    };
    assert!(validate.execute("u1@example.com", "new-pw").await.unwrap().is_some());
}

#[tokio::test]
async fn should_fail_change_password_for_unknown_email() {
    let result = ChangePasswordUseCase {
        users: MemoryRepos::new().users,
    }
    .execute("nobody@example.com", "pw")
    .await;

    assert!(
        matches!(result, Err(StoreError::NotFound)),
        "expected NotFound, got {result:?}"
    );
}

// ── Password reset ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reset_password_with_issued_code_once() {
    let repos = MemoryRepos::new();
    repos.users.create(&test_user("u1")).await.unwrap();
    let request = RequestPasswordResetUseCase {
        users: repos.users.clone(),
        resets: repos.resets.clone(),
    };
    let reset = ResetPasswordUseCase {
        users: repos.users.clone(),
        resets: repos.resets.clone(),
    };

    let code = request.execute("u1@example.com").await.unwrap().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    let reset_input = |code: &str| ResetPasswordInput {
        email: "u1@example.com".to_owned(),
        code: code.to_owned(),
        new_password: "fresh-pw".to_owned(),
    };
    assert!(reset.execute(reset_input(&code)).await.unwrap());
    assert!(!reset.execute(reset_input(&code)).await.unwrap());
    assert!(repos.resets.find("u1").await.unwrap().is_none());

    let validate = ValidateUserUseCase {
        users: repos.users.clone(),
    };
    assert!(validate.execute("u1@example.com", "fresh-pw").await.unwrap().is_some());
}

#[tokio::test]
async fn should_replace_earlier_code_on_new_request() {
    let repos = MemoryRepos::new();
    repos.users.create(&test_user("u1")).await.unwrap();
    repos
        .resets
        .upsert(&PasswordReset::new("u1", "111111".to_owned(), Utc::now()))
        .await
        .unwrap();

    let code = RequestPasswordResetUseCase {
        users: repos.users.clone(),
        resets: repos.resets.clone(),
    }
    .execute("u1@example.com")
    .await
    .unwrap()
    .unwrap();

    let stored = repos.resets.find("u1").await.unwrap().unwrap();
    assert_eq!(stored.code, code);
}

#[tokio::test]
async fn should_not_issue_code_for_unknown_email() {
    let repos = MemoryRepos::new();
    let code = RequestPasswordResetUseCase {
        users: repos.users.clone(),
        resets: repos.resets.clone(),
    }
    .execute("nobody@example.com")
    .await
    .unwrap();

    assert!(code.is_none());
    assert_eq!(repos.resets.store.len(), 0);
}

#[tokio::test]
async fn should_reject_and_delete_expired_code() {
    let repos = MemoryRepos::new();
    repos.users.create(&test_user("u1")).await.unwrap();
    repos
        .resets
        .upsert(&PasswordReset::new(
            "u1",
            "123456".to_owned(),
            Utc::now() - Duration::minutes(11),
        ))
        .await
        .unwrap();
    let verify = VerifyResetCodeUseCase {
        users: repos.users.clone(),
        resets: repos.resets.clone(),
    };

    assert!(!verify.execute("u1@example.com", "123456").await.unwrap());
    assert!(repos.resets.find("u1").await.unwrap().is_none());
}

#[tokio::test]
async fn should_reject_wrong_code_but_keep_it() {
    let repos = MemoryRepos::new();
    repos.users.create(&test_user("u1")).await.unwrap();
    repos
        .resets
        .upsert(&PasswordReset::new("u1", "123456".to_owned(), Utc::now()))
        .await
        .unwrap();
    let verify = VerifyResetCodeUseCase {
        users: repos.users.clone(),
        resets: repos.resets.clone(),
    };

    assert!(!verify.execute("u1@example.com", "654321").await.unwrap());
    assert!(verify.execute("u1@example.com", "123456").await.unwrap());
}

#[tokio::test]
async fn should_look_up_user_by_email_case_insensitively() {
    let repos = MemoryRepos::new();
    repos.users.create(&test_user("u1")).await.unwrap();

    let user = GetUserByEmailUseCase {
        users: repos.users.clone(),
    }
    .execute(" U1@Example.com")
    .await
    .unwrap();

    assert_eq!(user.map(|u| u.row_key), Some("u1".to_owned()));
}

#[tokio::test]
async fn should_find_user_whose_enrollment_cache_has_the_combined_shape() {
    let repos = MemoryRepos::new();
    let cache = serde_json::json!({
        "enrollments": [{ "courseId": "c1", "title": "Course", "status": "active" }],
        "payments": [],
    });
    let row = Entity::new("users", "u1")
        .with("email", "u1@example.com")
        .with("name", "Legacy")
        .with("passwordHash", legacy_hash("pw"))
        .with("emailVerified", false)
        .with("marketingAgreed", false)
        .with("enrolledCourses", cache.to_string())
        .with("createdAt", "2024-05-01T00:00:00.000Z")
        .with("updatedAt", "2024-05-01T00:00:00.000Z")
        .with("lastLoginAt", "");
    repos.users.store.insert(&row).await.unwrap();

    let user = ValidateUserUseCase {
        users: repos.users.clone(),
    }
    .execute("u1@example.com", "pw")
    .await
    .unwrap()
    .unwrap();

    assert_eq!(user.row_key, "u1");
    assert!(user.enrolled_courses.is_empty());
    assert!(user.password_hash.starts_with("$argon2"));
}
