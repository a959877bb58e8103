//! In-memory mocks for the identity and profile ports.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use supportdesk_core::accounts::ports::{IdentityProvider, ProfileStore, SessionWatch};
use supportdesk_core::subscriptions::{subscription_channel, SubscriptionSink};
use supportdesk_domain::{Identity, Profile, Result as DomainResult, Role, SupportDeskError};

/// In-memory mock for `IdentityProvider`.
///
/// Keeps registered accounts and the current session in memory and
/// replays session changes to watchers the way the real provider does.
#[derive(Default, Clone)]
pub struct MockIdentityProvider {
    inner: Arc<Mutex<ProviderState>>,
}

#[derive(Default)]
struct ProviderState {
    accounts: Vec<MockAccount>,
    current: Option<Identity>,
    watchers: Vec<SubscriptionSink<Option<Identity>>>,
}

struct MockAccount {
    id: String,
    email: String,
    password: String,
}

impl MockIdentityProvider {
    /// Create a provider with no registered accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a registered account without signing it in.
    ///
    /// Seeded accounts receive ids `user-1`, `user-2`, ... in order.
    pub fn with_account(self, email: &str, password: &str) -> Self {
        {
            let mut state = self.inner.lock().unwrap();
            let id = format!("user-{}", state.accounts.len() + 1);
            state.accounts.push(MockAccount {
                id,
                email: email.to_string(),
                password: password.to_string(),
            });
        }
        self
    }

    /// Number of registered accounts.
    pub fn account_count(&self) -> usize {
        self.inner.lock().unwrap().accounts.len()
    }

    /// Number of live session watcher slots.
    pub fn watcher_count(&self) -> usize {
        self.inner.lock().unwrap().watchers.len()
    }
}

fn publish_session(state: &mut ProviderState) {
    let current = state.current.clone();
    state.watchers.retain(|sink| sink.publish(current.clone()));
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn create_identity(&self, email: &str, password: &str) -> DomainResult<Identity> {
        let mut state = self.inner.lock().unwrap();
        if state.accounts.iter().any(|account| account.email.eq_ignore_ascii_case(email)) {
            return Err(SupportDeskError::Authentication(
                "An account with this email already exists".into(),
            ));
        }

        let id = format!("user-{}", state.accounts.len() + 1);
        state.accounts.push(MockAccount {
            id: id.clone(),
            email: email.to_string(),
            password: password.to_string(),
        });
        Ok(Identity { id, email: email.to_string() })
    }

    async fn authenticate(&self, email: &str, password: &str) -> DomainResult<Identity> {
        let mut state = self.inner.lock().unwrap();
        let identity = state
            .accounts
            .iter()
            .find(|account| {
                account.email.eq_ignore_ascii_case(email) && account.password == password
            })
            .map(|account| Identity { id: account.id.clone(), email: account.email.clone() })
            .ok_or_else(|| SupportDeskError::Authentication("Invalid email or password".into()))?;

        state.current = Some(identity.clone());
        publish_session(&mut state);
        Ok(identity)
    }

    async fn end_session(&self) -> DomainResult<()> {
        let mut state = self.inner.lock().unwrap();
        state.current = None;
        publish_session(&mut state);
        Ok(())
    }

    async fn watch_sessions(&self) -> DomainResult<SessionWatch> {
        let mut state = self.inner.lock().unwrap();
        let (sink, subscription) = subscription_channel(8);
        sink.publish(state.current.clone());
        state.watchers.push(sink);
        Ok(subscription)
    }
}

/// In-memory mock for `ProfileStore`.
///
/// Supports failure injection on reads and writes so the degraded paths
/// of the account service can be exercised.
#[derive(Default, Clone)]
pub struct MockProfileStore {
    inner: Arc<Mutex<ProfileState>>,
}

#[derive(Default)]
struct ProfileState {
    profiles: Vec<Profile>,
    reads: usize,
    fail_reads: bool,
    fail_writes: bool,
}

impl MockProfileStore {
    /// Create an empty profile store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose reads always fail.
    pub fn with_failing_reads() -> Self {
        let store = Self::default();
        store.inner.lock().unwrap().fail_reads = true;
        store
    }

    /// Create a store whose writes always fail.
    pub fn with_failing_writes() -> Self {
        let store = Self::default();
        store.inner.lock().unwrap().fail_writes = true;
        store
    }

    /// Seed a stored profile.
    pub fn with_profile(self, profile: Profile) -> Self {
        self.inner.lock().unwrap().profiles.push(profile);
        self
    }

    /// Number of stored profiles.
    pub fn profile_count(&self) -> usize {
        self.inner.lock().unwrap().profiles.len()
    }

    /// Number of `get` calls served so far.
    pub fn read_count(&self) -> usize {
        self.inner.lock().unwrap().reads
    }
}

#[async_trait]
impl ProfileStore for MockProfileStore {
    async fn get(&self, id: &str) -> DomainResult<Option<Profile>> {
        let mut state = self.inner.lock().unwrap();
        state.reads += 1;
        if state.fail_reads {
            return Err(SupportDeskError::Dependency("profile store offline".into()));
        }
        Ok(state.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn put(&self, profile: &Profile) -> DomainResult<()> {
        let mut state = self.inner.lock().unwrap();
        if state.fail_writes {
            return Err(SupportDeskError::Dependency("profile store offline".into()));
        }
        if let Some(existing) = state.profiles.iter_mut().find(|p| p.id == profile.id) {
            *existing = profile.clone();
        } else {
            state.profiles.push(profile.clone());
        }
        Ok(())
    }
}

/// Profile fixture matching a seeded account id.
pub fn profile(id: &str, role: Role) -> Profile {
    let now = Utc::now();
    Profile {
        id: id.to_string(),
        role,
        full_name: None,
        email: format!("{}@example.com", id),
        created_at: now,
        updated_at: now,
    }
}
