pub mod courses;
pub mod enrollments;
pub mod health;
pub mod payments;
pub mod purchases;
pub mod sessions;
pub mod users;

use campus_core::identity::SessionHeaders;

use tracing::warn;

use crate::domain::repository::UserRepository;
use crate::error::StoreError;
use crate::state::AppState;
use crate::usecase::session::ValidateSessionUseCase;

/// Reject requests whose session is unknown or expired.
pub(crate) async fn authenticate(
    state: &AppState,
    identity: &SessionHeaders,
) -> Result<(), StoreError> {
    let usecase = ValidateSessionUseCase {
        sessions: state.session_repo(),
    };
    if usecase
        .execute(&identity.user_id, &identity.session_id)
        .await?
    {
        Ok(())
    } else {
        Err(StoreError::InvalidSession)
    }
}

/// Require a valid session belonging to a configured administrator.
pub(crate) async fn authorize_admin(
    state: &AppState,
    identity: &SessionHeaders,
) -> Result<(), StoreError> {
    authenticate(state, identity).await?;
    let user = state.user_repo().find_by_id(&identity.user_id).await?;
    match user {
        Some(user) if state.is_admin(&user.email) => Ok(()),
        _ => {
            warn!(user_id = %identity.user_id, "administrative route refused");
            Err(StoreError::Forbidden)
        }
    }
}
