//! Integration tests for `AccountService`.

mod support;

use std::sync::Arc;
use std::time::Duration;

use supportdesk_core::AccountService;
use supportdesk_domain::{Role, SessionState, SupportDeskError};
use support::accounts::{profile, MockIdentityProvider, MockProfileStore};

fn service(provider: &MockIdentityProvider, profiles: &MockProfileStore) -> AccountService {
    AccountService::new(Arc::new(provider.clone()), Arc::new(profiles.clone()))
}

/// Signing up creates the identity and a profile with no full name.
#[tokio::test]
async fn test_sign_up_creates_identity_and_profile() {
    let provider = MockIdentityProvider::new();
    let profiles = MockProfileStore::new();
    let svc = service(&provider, &profiles);

    let user = svc.sign_up("u1@example.com", "secret1", Role::Customer).await.expect("sign up");

    assert_eq!(user.identity.email, "u1@example.com");
    let created = user.profile.expect("profile written");
    assert_eq!(created.id, user.identity.id);
    assert_eq!(created.role, Role::Customer);
    assert_eq!(created.full_name, None);
    assert_eq!(profiles.profile_count(), 1);
}

/// Bad email and short password are reported together.
#[tokio::test]
async fn test_sign_up_validates_credentials() {
    let provider = MockIdentityProvider::new();
    let svc = service(&provider, &MockProfileStore::new());

    let err = svc.sign_up("not-an-email", "short", Role::Customer).await.expect_err("invalid");

    let message = err.to_string();
    assert!(matches!(err, SupportDeskError::Validation(_)));
    assert!(message.contains("email"));
    assert!(message.contains("Password must be at least 6 characters"));
    assert_eq!(provider.account_count(), 0);
}

/// A duplicate email is refused and no profile is written.
#[tokio::test]
async fn test_sign_up_duplicate_email() {
    let provider = MockIdentityProvider::new().with_account("u1@example.com", "secret1");
    let profiles = MockProfileStore::new();
    let svc = service(&provider, &profiles);

    let err = svc
        .sign_up("U1@example.com", "another1", Role::Customer)
        .await
        .expect_err("duplicate email");

    assert!(matches!(err, SupportDeskError::Authentication(_)));
    assert!(err.to_string().contains("An account with this email already exists"));
    assert_eq!(provider.account_count(), 1);
    assert_eq!(profiles.profile_count(), 0);
}

/// A failing profile write surfaces; the identity is left behind.
#[tokio::test]
async fn test_sign_up_profile_write_failure_propagates() {
    let provider = MockIdentityProvider::new();
    let profiles = MockProfileStore::with_failing_writes();
    let svc = service(&provider, &profiles);

    let err = svc
        .sign_up("u1@example.com", "secret1", Role::Customer)
        .await
        .expect_err("profile write failure");

    assert!(matches!(err, SupportDeskError::Dependency(_)));
    assert_eq!(provider.account_count(), 1);
}

/// Signing in returns the identity together with its profile.
#[tokio::test]
async fn test_sign_in_fetches_profile() {
    let provider = MockIdentityProvider::new().with_account("u1@example.com", "secret1");
    let profiles = MockProfileStore::new().with_profile(profile("user-1", Role::Agent));
    let svc = service(&provider, &profiles);

    let user = svc.sign_in("u1@example.com", "secret1").await.expect("sign in");

    assert_eq!(user.identity.id, "user-1");
    assert_eq!(user.profile.expect("profile").role, Role::Agent);
}

/// Wrong password and unknown email answer the same generic message.
#[tokio::test]
async fn test_sign_in_generic_credentials_error() {
    let provider = MockIdentityProvider::new().with_account("u1@example.com", "secret1");
    let svc = service(&provider, &MockProfileStore::new());

    let wrong_password =
        svc.sign_in("u1@example.com", "wrong-1").await.expect_err("wrong password");
    let unknown_email = svc.sign_in("ghost@example.com", "secret1").await.expect_err("unknown");

    assert!(matches!(wrong_password, SupportDeskError::Authentication(_)));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    assert!(wrong_password.to_string().contains("Invalid email or password"));
}

/// An identity without a profile signs in profile-less, not with an error.
#[tokio::test]
async fn test_sign_in_missing_profile_degrades_to_none() {
    let provider = MockIdentityProvider::new().with_account("u1@example.com", "secret1");
    let svc = service(&provider, &MockProfileStore::new());

    let user = svc.sign_in("u1@example.com", "secret1").await.expect("sign in");

    assert_eq!(user.profile, None);
}

/// A failing profile fetch is swallowed; the session continues.
#[tokio::test]
async fn test_sign_in_profile_fetch_failure_degrades_to_none() {
    let provider = MockIdentityProvider::new().with_account("u1@example.com", "secret1");
    let svc = service(&provider, &MockProfileStore::with_failing_reads());

    let user = svc.sign_in("u1@example.com", "secret1").await.expect("sign in");

    assert_eq!(user.profile, None);
}

/// The current state arrives first: signed out when no session exists.
#[tokio::test]
async fn test_watch_session_emits_current_state_first() {
    let provider = MockIdentityProvider::new();
    let svc = service(&provider, &MockProfileStore::new());

    let mut watch = svc.watch_session().await.expect("watch");

    assert_eq!(watch.next().await.expect("initial state"), SessionState::SignedOut);
}

/// Watchers follow the session through sign-in and sign-out.
#[tokio::test]
async fn test_watch_session_tracks_sign_in_and_out() {
    let provider = MockIdentityProvider::new().with_account("u1@example.com", "secret1");
    let profiles = MockProfileStore::new().with_profile(profile("user-1", Role::Customer));
    let svc = service(&provider, &profiles);

    let mut watch = svc.watch_session().await.expect("watch");
    assert_eq!(watch.next().await.expect("initial state"), SessionState::SignedOut);

    svc.sign_in("u1@example.com", "secret1").await.expect("sign in");
    match watch.next().await.expect("signed-in state") {
        SessionState::SignedIn(user) => {
            assert_eq!(user.identity.id, "user-1");
            assert_eq!(user.profile.expect("profile").role, Role::Customer);
        }
        SessionState::SignedOut => panic!("expected signed-in state"),
    }

    svc.sign_out().await.expect("sign out");
    assert_eq!(watch.next().await.expect("signed-out state"), SessionState::SignedOut);
}

/// A session established for an identity without a profile is observed
/// profile-less.
#[tokio::test]
async fn test_watch_session_missing_profile() {
    let provider = MockIdentityProvider::new().with_account("u1@example.com", "secret1");
    let svc = service(&provider, &MockProfileStore::new());

    let mut watch = svc.watch_session().await.expect("watch");
    assert_eq!(watch.next().await.expect("initial state"), SessionState::SignedOut);

    svc.sign_in("u1@example.com", "secret1").await.expect("sign in");
    match watch.next().await.expect("signed-in state") {
        SessionState::SignedIn(user) => assert_eq!(user.profile, None),
        SessionState::SignedOut => panic!("expected signed-in state"),
    }
}

/// Each establishment event triggers exactly one profile fetch.
#[tokio::test]
async fn test_watch_session_fetches_profile_once_per_event() {
    let provider = MockIdentityProvider::new().with_account("u1@example.com", "secret1");
    let profiles = MockProfileStore::new().with_profile(profile("user-1", Role::Customer));
    let svc = service(&provider, &profiles);

    let mut watch = svc.watch_session().await.expect("watch");
    assert_eq!(watch.next().await.expect("initial state"), SessionState::SignedOut);

    // sign_in fetches once itself; the pump fetches once for the event.
    svc.sign_in("u1@example.com", "secret1").await.expect("sign in");
    assert!(watch.next().await.expect("signed-in state").is_signed_in());

    assert_eq!(profiles.read_count(), 2);
}

/// Dropping the watch handle releases the provider's watcher slot.
#[tokio::test]
async fn test_watch_session_stops_after_drop() {
    let provider = MockIdentityProvider::new().with_account("u1@example.com", "secret1");
    let svc = service(&provider, &MockProfileStore::new());

    let watch = svc.watch_session().await.expect("watch");
    assert_eq!(provider.watcher_count(), 1);
    drop(watch);

    // The pump lets go of its provider subscription once it sees the
    // dropped handle; the provider prunes the slot on a later publish.
    svc.sign_in("u1@example.com", "secret1").await.expect("sign in");
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        svc.sign_out().await.expect("sign out");
        if provider.watcher_count() == 0 {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "watcher slot never pruned");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
