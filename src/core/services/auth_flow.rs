//! Sign-in, sign-up and sign-out orchestration around the auth provider.
//!
//! After a successful sign-in or sign-up the user's profile is provisioned.
//! If that fails the fresh session is signed out again, so callers never see
//! a session without a profile.

use std::sync::Arc;

use crate::auth::{AuthEvent, AuthProvider, Session, Subscription};
use crate::core::time::Clock;
use crate::core::validation;
use crate::domain::{NewProfile, UserProfile};
use crate::errors::{BudgetError, Result};
use crate::state::AppState;
use crate::storage::DataStore;

use super::{user_service::UserService, ServiceContext};

pub struct AuthFlow {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn DataStore>,
    clock: Arc<dyn Clock>,
}

impl AuthFlow {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DataStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { auth, store, clock }
    }

    /// Service context scoped to the signed-in user.
    pub fn context_for(&self, session: &Session) -> ServiceContext {
        ServiceContext::with_clock(self.store.clone(), self.clock.clone(), session.user_id)
    }

    pub async fn sign_in(&self, email: &str, password: &str, state: &AppState) -> Result<Session> {
        validation::check_sign_in(email, password)?;
        let _setup = state.begin_setup();
        let session = self.auth.sign_in(email.trim(), password).await?;
        let defaults = NewProfile::new(session.user_id, session.email_name());
        self.finish(session, defaults, state).await
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        state: &AppState,
    ) -> Result<Session> {
        validation::check_sign_up(email, password, display_name)?;
        let _setup = state.begin_setup();
        let session = self
            .auth
            .sign_up(email.trim(), password, display_name.trim())
            .await?;
        let defaults = NewProfile::new(session.user_id, display_name.trim());
        self.finish(session, defaults, state).await
    }

    pub async fn sign_out(&self, state: &AppState) -> Result<()> {
        self.auth.sign_out().await?;
        state.clear();
        Ok(())
    }

    /// Picks up a session that survived from an earlier run, refreshing the
    /// onboarding flag from the stored profile.
    pub async fn restore(&self, state: &AppState) -> Result<Option<Session>> {
        let Some(session) = self.auth.current_session().await else {
            state.clear();
            return Ok(None);
        };
        let profile = UserService::new(self.context_for(&session))
            .profile()
            .await?;
        state.set_session(Some(session.clone()));
        state.set_onboarded(profile.map_or(false, |p| p.is_onboarded));
        Ok(Some(session))
    }

    /// Mirrors provider session changes into `state` until the handle drops.
    pub fn watch(&self, state: Arc<AppState>) -> Subscription {
        self.auth.subscribe(Arc::new(
            move |event: AuthEvent, session: Option<&Session>| match event {
                AuthEvent::SignedOut => state.clear(),
                AuthEvent::SignedIn | AuthEvent::SignedUp | AuthEvent::TokenRefreshed => {
                    state.set_session(session.cloned())
                }
            },
        ))
    }

    async fn finish(
        &self,
        session: Session,
        defaults: NewProfile,
        state: &AppState,
    ) -> Result<Session> {
        match self.provision(&session, defaults).await {
            Ok(profile) => {
                state.set_session(Some(session.clone()));
                state.set_onboarded(profile.is_onboarded);
                tracing::info!(
                    user_id = %session.user_id,
                    onboarded = profile.is_onboarded,
                    "signed in"
                );
                Ok(session)
            }
            Err(err) => {
                tracing::warn!(
                    user_id = %session.user_id,
                    error = %err,
                    "profile provisioning failed, signing out"
                );
                if let Err(sign_out_err) = self.auth.sign_out().await {
                    tracing::warn!(error = %sign_out_err, "rollback sign-out failed");
                }
                state.clear();
                Err(BudgetError::ProfileProvisioning(err.to_string()))
            }
        }
    }

    async fn provision(&self, session: &Session, defaults: NewProfile) -> Result<UserProfile> {
        UserService::new(self.context_for(session))
            .ensure_profile(defaults)
            .await
    }
}
