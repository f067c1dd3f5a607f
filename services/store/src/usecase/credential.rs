use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use rand::RngExt;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use campus_domain::id::new_id;
use campus_domain::reset::RESET_CODE_LEN;
use campus_domain::serde::now;
use campus_domain::user::normalize_email;

use crate::domain::repository::{PasswordResetRepository, UserRepository};
use crate::domain::types::{PasswordReset, User};
use crate::error::StoreError;

/// Salt appended to the password by the legacy digest scheme.
const LEGACY_SALT: &str = "clathon_salt_2024";

/// Prefix of PHC strings produced by [`hash_password`].
const ARGON2_PREFIX: &str = "$argon2";

// ── Password hashing ─────────────────────────────────────────────────────────

/// Hash a password as an Argon2id PHC string with a random per-user salt.
pub fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt_bytes: [u8; 16] = rand::rng().random();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| anyhow::anyhow!("encode password salt: {e}"))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Digest used by accounts created before Argon2 hashing.
pub fn legacy_hash(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(LEGACY_SALT.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify against either an Argon2 PHC string or a legacy digest.
pub fn verify_password(password: &str, stored: &str) -> bool {
    if stored.starts_with(ARGON2_PREFIX) {
        return PasswordHash::new(stored)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false);
    }
    legacy_hash(password).eq_ignore_ascii_case(stored)
}

/// Legacy digests are replaced on the next successful login.
pub fn needs_rehash(stored: &str) -> bool {
    !stored.starts_with(ARGON2_PREFIX)
}

fn validate_password(password: &str) -> Result<(), StoreError> {
    if password.is_empty() {
        return Err(StoreError::InvalidInput("password must not be empty".to_owned()));
    }
    Ok(())
}

fn generate_reset_code() -> String {
    let mut rng = rand::rng();
    (0..RESET_CODE_LEN)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

// ── CreateUser ───────────────────────────────────────────────────────────────

pub struct CreateUserInput {
    pub email: String,
    pub name: String,
    pub password: String,
    pub marketing_agreed: bool,
}

pub struct CreateUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> CreateUserUseCase<U> {
    pub async fn execute(&self, input: CreateUserInput) -> Result<User, StoreError> {
        let email = normalize_email(&input.email);
        if !email.contains('@') {
            return Err(StoreError::InvalidInput(format!("invalid email: {email:?}")));
        }
        validate_password(&input.password)?;
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(StoreError::Conflict);
        }

        let user = User::new(
            new_id(),
            &email,
            input.name,
            hash_password(&input.password)?,
            input.marketing_agreed,
            now(),
        );
        self.users.create(&user).await?;
        info!(user_id = user.id(), "user created");
        Ok(user)
    }
}

// ── GetUserByEmail ───────────────────────────────────────────────────────────

pub struct GetUserByEmailUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserByEmailUseCase<U> {
    pub async fn execute(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.users.find_by_email(&normalize_email(email)).await
    }
}

// ── ValidateUser (login) ─────────────────────────────────────────────────────

pub struct ValidateUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ValidateUserUseCase<U> {
    /// `Ok(None)` for an unknown email or a wrong password.
    ///
    /// A successful login stamps `last_login_at` and upgrades a legacy hash.
    /// Persisting those is best-effort and never fails the login.
    pub async fn execute(&self, email: &str, password: &str) -> Result<Option<User>, StoreError> {
        let Some(mut user) = self.users.find_by_email(&normalize_email(email)).await? else {
            return Ok(None);
        };
        if !verify_password(password, &user.password_hash) {
            return Ok(None);
        }

        if needs_rehash(&user.password_hash) {
            user.password_hash = hash_password(password)?;
            info!(user_id = user.id(), "legacy password hash upgraded");
        }
        let now = now();
        user.last_login_at = Some(now);
        user.updated_at = now;
        if let Err(e) = self.users.update(&user).await {
            warn!(user_id = user.id(), error = %e, "failed to record login");
        }
        Ok(Some(user))
    }
}

// ── ChangePassword ───────────────────────────────────────────────────────────

pub struct ChangePasswordUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ChangePasswordUseCase<U> {
    /// Administrative overwrite without the old password.
    pub async fn execute(&self, email: &str, new_password: &str) -> Result<(), StoreError> {
        validate_password(new_password)?;
        let mut user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(StoreError::NotFound)?;
        user.password_hash = hash_password(new_password)?;
        user.updated_at = now();
        self.users.update(&user).await
    }
}

// ── RequestPasswordReset ─────────────────────────────────────────────────────

pub struct RequestPasswordResetUseCase<U: UserRepository, R: PasswordResetRepository> {
    pub users: U,
    pub resets: R,
}

impl<U: UserRepository, R: PasswordResetRepository> RequestPasswordResetUseCase<U, R> {
    /// Issue a fresh code for the mailer, replacing any earlier one.
    ///
    /// `Ok(None)` when no account uses the email.
    pub async fn execute(&self, email: &str) -> Result<Option<String>, StoreError> {
        let Some(user) = self.users.find_by_email(&normalize_email(email)).await? else {
            return Ok(None);
        };
        let code = generate_reset_code();
        self.resets
            .upsert(&PasswordReset::new(user.id(), code.clone(), now()))
            .await?;
        info!(user_id = user.id(), "password reset code issued");
        Ok(Some(code))
    }
}

// ── VerifyResetCode ──────────────────────────────────────────────────────────

pub struct VerifyResetCodeUseCase<U: UserRepository, R: PasswordResetRepository> {
    pub users: U,
    pub resets: R,
}

impl<U: UserRepository, R: PasswordResetRepository> VerifyResetCodeUseCase<U, R> {
    /// Expired codes are deleted and rejected.
    pub async fn execute(&self, email: &str, code: &str) -> Result<bool, StoreError> {
        let Some(user) = self.users.find_by_email(&normalize_email(email)).await? else {
            return Ok(false);
        };
        verify_code(&self.resets, user.id(), code).await
    }
}

async fn verify_code<R: PasswordResetRepository>(
    resets: &R,
    user_id: &str,
    code: &str,
) -> Result<bool, StoreError> {
    let Some(reset) = resets.find(user_id).await? else {
        return Ok(false);
    };
    let now = now();
    if reset.is_expired_at(now) {
        resets.delete(user_id).await?;
        return Ok(false);
    }
    Ok(reset.accepts(code, now))
}

// ── ResetPassword ────────────────────────────────────────────────────────────

pub struct ResetPasswordInput {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

pub struct ResetPasswordUseCase<U: UserRepository, R: PasswordResetRepository> {
    pub users: U,
    pub resets: R,
}

impl<U: UserRepository, R: PasswordResetRepository> ResetPasswordUseCase<U, R> {
    /// `Ok(false)` when the email or code is not accepted.
    pub async fn execute(&self, input: ResetPasswordInput) -> Result<bool, StoreError> {
        validate_password(&input.new_password)?;
        let Some(mut user) = self
            .users
            .find_by_email(&normalize_email(&input.email))
            .await?
        else {
            return Ok(false);
        };
        if !verify_code(&self.resets, user.id(), &input.code).await? {
            return Ok(false);
        }

        user.password_hash = hash_password(&input.new_password)?;
        user.updated_at = now();
        self.users.update(&user).await?;
        self.resets.delete(user.id()).await?;
        info!(user_id = user.id(), "password reset");
        Ok(true)
    }
}
