//! User profile service

use tracing::info;

use crate::database::repositories::UserRepository;
use crate::models::user::{UpdateProfileRequest, User, UserProfile};
use crate::utils::errors::{ChekwasError, Result};
use crate::utils::logging::log_user_action;

#[derive(Debug, Clone)]
pub struct UserService {
    users: UserRepository,
}

impl UserService {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Public profile of the authenticated user
    pub fn profile(&self, user: &User) -> UserProfile {
        user.profile()
    }

    /// Update name, date of birth, allergies and conditions
    pub async fn update_profile(&self, user: &User, request: UpdateProfileRequest) -> Result<UserProfile> {
        let mut updated = user.clone();
        request.apply_to(&mut updated)?;

        let saved = self.users.update_profile(&updated).await?;
        log_user_action(saved.id, "update_profile", None);
        Ok(saved.profile())
    }

    /// Deactivate the account. Existing tokens stop working immediately.
    pub async fn deactivate(&self, user: &User) -> Result<()> {
        if !self.users.deactivate(user.id).await? {
            return Err(ChekwasError::UserNotFound { user_id: user.id });
        }

        info!(user_id = %user.id, "Account deactivated");
        log_user_action(user.id, "deactivate", None);
        Ok(())
    }
}
