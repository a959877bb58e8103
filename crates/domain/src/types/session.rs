//! Session and caller types
//!
//! What the identity provider issues, and the explicit caller context every
//! service operation receives. There is no ambient current-user state.

use serde::{Deserialize, Serialize};

use super::profile::{Profile, Role};

/// Identity as issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

/// Caller context passed into every service operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caller {
    /// Profile id of the acting user
    pub id: String,
    pub role: Role,
}

/// A signed-in identity enriched with its profile, when one exists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub identity: Identity,
    /// None when the profile row is missing or its fetch failed
    pub profile: Option<Profile>,
}

impl AuthenticatedUser {
    /// Caller context for service calls; only available with a profile
    pub fn caller(&self) -> Option<Caller> {
        self.profile.as_ref().map(|profile| Caller { id: profile.id.clone(), role: profile.role })
    }
}

/// Observable session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    SignedOut,
    SignedIn(AuthenticatedUser),
}

impl SessionState {
    /// Whether a user is currently signed in
    pub const fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }
}
