//! Port interfaces for identity and profile management
//!
//! These traits define the boundaries between core business logic
//! and the identity backend.

use async_trait::async_trait;
use supportdesk_domain::{Identity, Profile, Result};

use crate::subscriptions::Subscription;

/// Stream of session changes. `Some` carries the identity that signed
/// in, `None` marks a sign-out.
pub type SessionWatch = Subscription<Option<Identity>>;

/// Trait for the identity backend
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new identity. Fails with an authentication error when
    /// the email is already taken.
    async fn create_identity(&self, email: &str, password: &str) -> Result<Identity>;

    /// Verify credentials and establish the session.
    ///
    /// Unknown email and wrong password answer the same generic error,
    /// so callers cannot probe which accounts exist.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity>;

    /// End the current session
    async fn end_session(&self) -> Result<()>;

    /// Watch session changes. The current state is emitted immediately
    /// on subscribe.
    async fn watch_sessions(&self) -> Result<SessionWatch>;
}

/// Trait for profile persistence
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Get a profile by identity id
    async fn get(&self, id: &str) -> Result<Option<Profile>>;

    /// Insert or replace a profile
    async fn put(&self, profile: &Profile) -> Result<()>;
}
