//! Local identity provider backed by the `identities` table.
//!
//! Credentials live next to the application data: argon2 PHC hashes in
//! SQLite, one active session at a time, and an in-process watcher registry
//! for session changes.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::params;
use supportdesk_core::accounts::ports::{IdentityProvider as IdentityProviderPort, SessionWatch};
use supportdesk_core::subscriptions::{subscription_channel, SubscriptionSink};
use supportdesk_domain::{Identity, Result, SupportDeskError};
use tokio::task;
use uuid::Uuid;

use crate::database::{DbConnection, DbManager};
use crate::errors::InfraError;

const DUPLICATE_EMAIL: &str = "An account with this email already exists";
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// SQLITE_CONSTRAINT_UNIQUE; a raced duplicate insert surfaces as this
/// extended code instead of failing the pre-check.
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

/// Current session plus everyone watching it.
#[derive(Default)]
struct SessionHub {
    current: Option<Identity>,
    watchers: Vec<SubscriptionSink<Option<Identity>>>,
}

/// Identity provider over the local database.
///
/// Models exactly one active session at a time: `authenticate` replaces the
/// current session, `end_session` clears it.
pub struct LocalIdentityProvider {
    db: Arc<DbManager>,
    sessions: Arc<Mutex<SessionHub>>,
    buffer_capacity: usize,
}

impl LocalIdentityProvider {
    /// Create a new provider instance.
    pub fn new(db: Arc<DbManager>, buffer_capacity: usize) -> Self {
        Self { db, sessions: Arc::new(Mutex::new(SessionHub::default())), buffer_capacity }
    }

    /// Identity of the currently signed-in user, if any.
    pub fn current_session(&self) -> Option<Identity> {
        self.sessions.lock().current.clone()
    }
}

#[async_trait]
impl IdentityProviderPort for LocalIdentityProvider {
    async fn create_identity(&self, email: &str, password: &str) -> Result<Identity> {
        let db = Arc::clone(&self.db);
        let email = email.to_string();
        let password = password.to_string();

        task::spawn_blocking(move || -> Result<Identity> {
            let conn = db.get_connection()?;

            if email_exists(&conn, &email)? {
                return Err(SupportDeskError::Authentication(DUPLICATE_EMAIL.into()));
            }

            let identity = Identity { id: Uuid::now_v7().to_string(), email };
            let password_hash = hash_password(&password)?;
            insert_identity(&conn, &identity, &password_hash).map_err(map_insert_error)?;

            Ok(identity)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity> {
        let db = Arc::clone(&self.db);
        let sessions = Arc::clone(&self.sessions);
        let email = email.to_string();
        let password = password.to_string();

        task::spawn_blocking(move || -> Result<Identity> {
            let conn = db.get_connection()?;

            // The same generic error for unknown email and wrong password.
            let credentials = match fetch_credentials(&conn, &email)? {
                Some(credentials) => credentials,
                None => return Err(SupportDeskError::Authentication(INVALID_CREDENTIALS.into())),
            };
            if !verify_password(&password, &credentials.password_hash) {
                return Err(SupportDeskError::Authentication(INVALID_CREDENTIALS.into()));
            }

            let identity = Identity { id: credentials.id, email: credentials.email };

            let mut hub = sessions.lock();
            hub.current = Some(identity.clone());
            publish_session(&mut hub, Some(identity.clone()));

            Ok(identity)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn end_session(&self) -> Result<()> {
        let mut hub = self.sessions.lock();
        hub.current = None;
        publish_session(&mut hub, None);
        Ok(())
    }

    async fn watch_sessions(&self) -> Result<SessionWatch> {
        let mut hub = self.sessions.lock();

        let (sink, subscription) = subscription_channel(self.buffer_capacity);
        sink.publish(hub.current.clone());
        hub.watchers.push(sink);

        Ok(subscription)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn publish_session(hub: &mut SessionHub, event: Option<Identity>) {
    hub.watchers.retain(|sink| sink.publish(event.clone()));
}

/// Case-insensitive existence check; `email` carries COLLATE NOCASE.
fn email_exists(conn: &DbConnection, email: &str) -> Result<bool> {
    let result = conn.query_row(
        "SELECT 1 FROM identities WHERE email = ?1",
        params![&email],
        |row| row.get::<_, i32>(0),
    );

    match result {
        Ok(_) => Ok(true),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(false),
        Err(err) => Err(map_sql_error(err)),
    }
}

fn insert_identity(
    conn: &DbConnection,
    identity: &Identity,
    password_hash: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO identities (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![&identity.id, &identity.email, &password_hash, Utc::now().timestamp_millis()],
    )?;
    Ok(())
}

struct StoredCredentials {
    id: String,
    email: String,
    password_hash: String,
}

fn fetch_credentials(conn: &DbConnection, email: &str) -> Result<Option<StoredCredentials>> {
    let result = conn.query_row(
        "SELECT id, email, password_hash FROM identities WHERE email = ?1",
        params![&email],
        |row| {
            Ok(StoredCredentials {
                id: row.get(0)?,
                email: row.get(1)?,
                password_hash: row.get(2)?,
            })
        },
    );

    match result {
        Ok(credentials) => Ok(Some(credentials)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(err) => Err(map_sql_error(err)),
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| SupportDeskError::Internal(format!("password hashing failed: {err}")))?;
    Ok(hash.to_string())
}

/// A malformed stored hash verifies as false rather than erroring; the
/// caller answers the generic credentials message either way.
fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

// =============================================================================
// Error Mapping
// =============================================================================

/// A raced duplicate insert trips the unique index instead of the
/// pre-check; map it to the same duplicate-email error.
fn map_insert_error(err: rusqlite::Error) -> SupportDeskError {
    if let rusqlite::Error::SqliteFailure(ffi, _) = &err {
        if ffi.extended_code == SQLITE_CONSTRAINT_UNIQUE {
            return SupportDeskError::Authentication(DUPLICATE_EMAIL.into());
        }
    }
    map_sql_error(err)
}

fn map_sql_error(err: rusqlite::Error) -> SupportDeskError {
    SupportDeskError::from(InfraError::from(err))
}

fn map_join_error(err: task::JoinError) -> SupportDeskError {
    SupportDeskError::from(InfraError::from(err))
}

// =============================================================================
// Tests
// =============================================================================
