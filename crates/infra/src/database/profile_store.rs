//! Profile store implementation over the pooled SQLite database.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row, ToSql};
use supportdesk_core::accounts::ports::ProfileStore as ProfileStorePort;
use supportdesk_domain::{Profile, Result, Role, SupportDeskError};
use tokio::task;

use super::manager::{DbConnection, DbManager};
use crate::errors::InfraError;

/// SQLite-backed implementation of `ProfileStore`.
pub struct SqliteProfileStore {
    db: Arc<DbManager>,
}

impl SqliteProfileStore {
    /// Create a new store instance.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStorePort for SqliteProfileStore {
    async fn get(&self, id: &str) -> Result<Option<Profile>> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        task::spawn_blocking(move || -> Result<Option<Profile>> {
            let conn = db.get_connection()?;
            fetch_profile(&conn, &id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn put(&self, profile: &Profile) -> Result<()> {
        let db = Arc::clone(&self.db);
        let profile = profile.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            upsert_profile(&conn, &profile)
        })
        .await
        .map_err(map_join_error)?
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Map a row to a Profile
fn map_profile_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    let role: String = row.get(1)?;
    let role = role.parse::<Role>().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, err.into())
    })?;

    Ok(Profile {
        id: row.get(0)?,
        role,
        full_name: row.get(2)?,
        email: row.get(3)?,
        created_at: timestamp_column(row, 4)?,
        updated_at: timestamp_column(row, 5)?,
    })
}

/// Fetch one profile by id
fn fetch_profile(conn: &DbConnection, id: &str) -> Result<Option<Profile>> {
    let result = conn.query_row(
        "SELECT id, role, full_name, email, created_at, updated_at
         FROM profiles WHERE id = ?1",
        params![&id],
        map_profile_row,
    );

    match result {
        Ok(profile) => Ok(Some(profile)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(err) => Err(map_sql_error(err)),
    }
}

/// Insert or update a profile (conflict on id)
///
/// `created_at` keeps its first-write value; everything else follows the
/// incoming record.
fn upsert_profile(conn: &DbConnection, profile: &Profile) -> Result<()> {
    let role = profile.role.to_string();
    let created_at = profile.created_at.timestamp_millis();
    let updated_at = profile.updated_at.timestamp_millis();

    let params: [&dyn ToSql; 6] =
        [&profile.id, &role, &profile.full_name, &profile.email, &created_at, &updated_at];

    conn.execute(
        "INSERT INTO profiles (id, role, full_name, email, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            role = excluded.role,
            full_name = excluded.full_name,
            email = excluded.email,
            updated_at = excluded.updated_at",
        params.as_slice(),
    )
    .map_err(map_sql_error)?;

    Ok(())
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Integer,
            format!("timestamp out of range: {millis}").into(),
        )
    })
}

// =============================================================================
// Error Mapping
// =============================================================================

fn map_sql_error(err: rusqlite::Error) -> SupportDeskError {
    SupportDeskError::from(InfraError::from(err))
}

fn map_join_error(err: task::JoinError) -> SupportDeskError {
    SupportDeskError::from(InfraError::from(err))
}

// =============================================================================
// Tests
// =============================================================================
