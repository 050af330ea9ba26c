use crate::domain::{NewProfile, ProfileUpdate, UserProfile};
use crate::errors::{BudgetError, Result};

use super::ServiceContext;

/// Name used when a profile must be created without one.
pub const DEFAULT_PROFILE_NAME: &str = "User";

#[derive(Debug, Clone)]
pub struct UserService {
    ctx: ServiceContext,
}

impl UserService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// The user's profile, or `None` when it has not been provisioned yet.
    pub async fn profile(&self) -> Result<Option<UserProfile>> {
        self.ctx.store.get_profile(self.ctx.user_id).await
    }

    /// Applies `changes`, inserting the profile first when it does not exist.
    pub async fn update_profile(&self, changes: ProfileUpdate) -> Result<UserProfile> {
        if self.profile().await?.is_none() {
            let name = changes
                .name
                .clone()
                .unwrap_or_else(|| DEFAULT_PROFILE_NAME.to_string());
            self.insert_or_reread(NewProfile::new(self.ctx.user_id, name))
                .await?;
        }
        let profile = self
            .ctx
            .store
            .update_profile(self.ctx.user_id, changes)
            .await?;
        tracing::info!(user_id = %self.ctx.user_id, "profile updated");
        Ok(profile)
    }

    /// Returns the existing profile or creates one from `defaults`. Losing an
    /// insert race to another client is not an error.
    pub async fn ensure_profile(&self, defaults: NewProfile) -> Result<UserProfile> {
        if let Some(profile) = self.profile().await? {
            return Ok(profile);
        }
        self.insert_or_reread(defaults).await
    }

    async fn insert_or_reread(&self, new: NewProfile) -> Result<UserProfile> {
        match self.ctx.store.insert_profile(new).await {
            Ok(profile) => {
                tracing::info!(user_id = %profile.user_id, "profile created");
                Ok(profile)
            }
            Err(BudgetError::Conflict(detail)) => {
                tracing::debug!(%detail, "profile already existed, re-reading");
                self.profile()
                    .await?
                    .ok_or_else(|| BudgetError::not_found("profile", self.ctx.user_id))
            }
            Err(err) => Err(err),
        }
    }
}
