//! Account service - core business logic

use std::sync::Arc;

use chrono::Utc;
use supportdesk_common::validation::{EmailValidator, ValidationError, Validator};
use supportdesk_domain::constants::{DEFAULT_SUBSCRIPTION_BUFFER, MIN_PASSWORD_LENGTH};
use supportdesk_domain::{
    AuthenticatedUser, Profile, Result, Role, SessionState, SupportDeskError,
};
use tracing::{info, warn};

use super::ports::{IdentityProvider, ProfileStore};
use crate::subscriptions::{subscription_channel, Subscription};

/// Account and session service
pub struct AccountService {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    watch_buffer: usize,
}

impl AccountService {
    /// Create a new account service
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { identity, profiles, watch_buffer: DEFAULT_SUBSCRIPTION_BUFFER }
    }

    /// Override the session watch buffer capacity.
    pub fn with_watch_buffer(mut self, capacity: usize) -> Self {
        self.watch_buffer = capacity;
        self
    }

    /// Register a new account with the requested role.
    ///
    /// The identity is created first, then the profile is written with
    /// `full_name` unset. A profile write failure leaves the identity
    /// behind; that session is later observed profile-less rather than
    /// erroring.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<AuthenticatedUser> {
        validate_credentials(email, password)?;

        let identity = self.identity.create_identity(email, password).await?;

        let now = Utc::now();
        let profile = Profile {
            id: identity.id.clone(),
            role,
            full_name: None,
            email: identity.email.clone(),
            created_at: now,
            updated_at: now,
        };
        self.profiles.put(&profile).await?;

        info!(user_id = %identity.id, role = %role, "account_created");
        Ok(AuthenticatedUser { identity, profile: Some(profile) })
    }

    /// Verify credentials and establish the session.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthenticatedUser> {
        validate_credentials(email, password)?;

        let identity = self.identity.authenticate(email, password).await?;
        let profile = self.fetch_profile(&identity.id).await;

        info!(user_id = %identity.id, has_profile = profile.is_some(), "signed_in");
        Ok(AuthenticatedUser { identity, profile })
    }

    /// End the current session.
    pub async fn sign_out(&self) -> Result<()> {
        self.identity.end_session().await?;
        info!("signed_out");
        Ok(())
    }

    /// Watch session state changes.
    ///
    /// Each establishment event triggers exactly one profile fetch and is
    /// delivered as `SignedIn`; sign-outs are delivered as `SignedOut`.
    /// The pump stops once the subscription is cancelled or the provider
    /// stream ends.
    pub async fn watch_session(&self) -> Result<Subscription<SessionState>> {
        let mut sessions = self.identity.watch_sessions().await?;
        let (sink, subscription) = subscription_channel(self.watch_buffer);
        let profiles = Arc::clone(&self.profiles);

        tokio::spawn(async move {
            while let Some(event) = sessions.next().await {
                let state = match event {
                    Some(identity) => {
                        let profile = fetch_profile_for(&*profiles, &identity.id).await;
                        SessionState::SignedIn(AuthenticatedUser { identity, profile })
                    }
                    None => SessionState::SignedOut,
                };
                if !sink.publish(state) {
                    break;
                }
            }
        });

        Ok(subscription)
    }

    async fn fetch_profile(&self, id: &str) -> Option<Profile> {
        fetch_profile_for(&*self.profiles, id).await
    }
}

/// Fetch a profile for an authenticated identity.
///
/// A missing or unreadable profile degrades to `None`; the caller is
/// treated as profile-less instead of failing the session.
async fn fetch_profile_for(profiles: &dyn ProfileStore, id: &str) -> Option<Profile> {
    match profiles.get(id).await {
        Ok(profile) => profile,
        Err(err) => {
            warn!(user_id = %id, error = %err, error_kind = err.label(), "profile_fetch_failed");
            None
        }
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<()> {
    let mut validator = Validator::new();

    let _ = validator.validate_field("email", &email, &EmailValidator::new());
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        validator.add_error(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        );
    }

    validator.finalize().map_err(map_validation)
}

fn map_validation(err: ValidationError) -> SupportDeskError {
    let detail = err
        .errors
        .iter()
        .map(|field| format!("{}: {}", field.field, field.message))
        .collect::<Vec<_>>()
        .join("; ");
    SupportDeskError::Validation(detail)
}
