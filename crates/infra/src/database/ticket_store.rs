//! Ticket store implementation over the pooled SQLite database.
//!
//! Persists tickets and carries the live-feed subscriber registry: every
//! mutation re-queries the full ordered ticket list under the registry lock
//! and publishes each subscriber's filtered snapshot.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Row, ToSql};
use supportdesk_core::subscriptions::{subscription_channel, SubscriptionSink};
use supportdesk_core::tickets::ports::{
    TicketFilter, TicketStore as TicketStorePort, TicketSubscription,
};
use supportdesk_domain::{Result, SupportDeskError, Ticket, TicketUpdate};
use tokio::task;

use super::manager::{DbConnection, DbManager};
use crate::errors::InfraError;

const TICKET_COLUMNS: &str = "id, title, description, priority, category, status, contact_email,
        contact_phone, preferred_contact, expected_resolution_date, additional_notes,
        attachment_url, created_by, assigned_to, created_at, updated_at";

/// One registered live-feed subscriber.
struct TicketWatcher {
    filter: TicketFilter,
    sink: SubscriptionSink<Vec<Ticket>>,
}

/// SQLite-backed implementation of `TicketStore`.
pub struct SqliteTicketStore {
    db: Arc<DbManager>,
    watchers: Arc<Mutex<Vec<TicketWatcher>>>,
    buffer_capacity: usize,
}

impl SqliteTicketStore {
    /// Create a new store instance.
    ///
    /// `buffer_capacity` is the per-subscriber snapshot buffer; subscribers
    /// that fall further behind are disconnected on the next publish pass.
    pub fn new(db: Arc<DbManager>, buffer_capacity: usize) -> Self {
        Self { db, watchers: Arc::new(Mutex::new(Vec::new())), buffer_capacity }
    }

    /// Number of currently registered subscribers (after pruning).
    pub fn watcher_count(&self) -> usize {
        self.watchers.lock().len()
    }
}

#[async_trait]
impl TicketStorePort for SqliteTicketStore {
    async fn insert(&self, ticket: Ticket) -> Result<String> {
        let db = Arc::clone(&self.db);
        let watchers = Arc::clone(&self.watchers);

        task::spawn_blocking(move || -> Result<String> {
            let conn = db.get_connection()?;
            insert_ticket(&conn, &ticket)?;
            publish_snapshots(&conn, &watchers)?;
            Ok(ticket.id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get(&self, id: &str) -> Result<Option<Ticket>> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        task::spawn_blocking(move || -> Result<Option<Ticket>> {
            let conn = db.get_connection()?;
            fetch_ticket(&conn, &id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn apply_update(
        &self,
        id: &str,
        update: &TicketUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Ticket>> {
        let db = Arc::clone(&self.db);
        let watchers = Arc::clone(&self.watchers);
        let id = id.to_string();
        let update = update.clone();

        task::spawn_blocking(move || -> Result<Option<Ticket>> {
            let conn = db.get_connection()?;

            let mut ticket = match fetch_ticket(&conn, &id)? {
                Some(ticket) => ticket,
                None => return Ok(None),
            };

            if let Some(status) = update.status {
                ticket.status = status;
            }
            if let Some(priority) = update.priority {
                ticket.priority = priority;
            }
            if let Some(assignee) = &update.assigned_to {
                ticket.assigned_to = assignee.clone();
            }
            if let Some(notes) = &update.notes {
                ticket.additional_notes = Some(notes.clone());
            }
            ticket.updated_at = updated_at;

            store_merged_ticket(&conn, &ticket)?;
            publish_snapshots(&conn, &watchers)?;
            Ok(Some(ticket))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let db = Arc::clone(&self.db);
        let watchers = Arc::clone(&self.watchers);
        let id = id.to_string();

        task::spawn_blocking(move || -> Result<bool> {
            let conn = db.get_connection()?;
            let affected = conn
                .execute("DELETE FROM tickets WHERE id = ?1", params![&id])
                .map_err(map_sql_error)?;

            if affected > 0 {
                publish_snapshots(&conn, &watchers)?;
            }
            Ok(affected > 0)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn subscribe(&self, filter: TicketFilter) -> Result<TicketSubscription> {
        let db = Arc::clone(&self.db);
        let watchers = Arc::clone(&self.watchers);
        let capacity = self.buffer_capacity;

        task::spawn_blocking(move || -> Result<TicketSubscription> {
            let conn = db.get_connection()?;

            // Initial snapshot and registration happen under the registry
            // lock so a concurrent mutation cannot slip a snapshot in
            // between; per-subscriber ordering therefore starts monotonic.
            let mut registry = watchers.lock();

            let tickets = query_ordered_tickets(&conn)?;
            let snapshot: Vec<Ticket> =
                tickets.iter().filter(|ticket| filter.matches(ticket)).cloned().collect();

            let (sink, subscription) = subscription_channel(capacity);
            sink.publish(snapshot);
            registry.push(TicketWatcher { filter, sink });

            Ok(subscription)
        })
        .await
        .map_err(map_join_error)?
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Map a row to a Ticket
fn map_ticket_row(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        priority: parse_enum_column(row, 3)?,
        category: parse_enum_column(row, 4)?,
        status: parse_enum_column(row, 5)?,
        contact_email: row.get(6)?,
        contact_phone: row.get(7)?,
        preferred_contact: parse_enum_column(row, 8)?,
        expected_resolution_date: opt_timestamp_column(row, 9)?,
        additional_notes: row.get(10)?,
        attachment_url: row.get(11)?,
        created_by: row.get(12)?,
        assigned_to: row.get(13)?,
        created_at: timestamp_column(row, 14)?,
        updated_at: timestamp_column(row, 15)?,
    })
}

/// Insert a ticket row
fn insert_ticket(conn: &DbConnection, ticket: &Ticket) -> Result<()> {
    let priority = ticket.priority.to_string();
    let category = ticket.category.to_string();
    let status = ticket.status.to_string();
    let preferred_contact = ticket.preferred_contact.to_string();
    let expected_resolution_date =
        ticket.expected_resolution_date.map(|ts| ts.timestamp_millis());
    let created_at = ticket.created_at.timestamp_millis();
    let updated_at = ticket.updated_at.timestamp_millis();

    let params: [&dyn ToSql; 16] = [
        &ticket.id,
        &ticket.title,
        &ticket.description,
        &priority,
        &category,
        &status,
        &ticket.contact_email,
        &ticket.contact_phone,
        &preferred_contact,
        &expected_resolution_date,
        &ticket.additional_notes,
        &ticket.attachment_url,
        &ticket.created_by,
        &ticket.assigned_to,
        &created_at,
        &updated_at,
    ];

    conn.execute(
        "INSERT INTO tickets (
            id, title, description, priority, category, status, contact_email,
            contact_phone, preferred_contact, expected_resolution_date, additional_notes,
            attachment_url, created_by, assigned_to, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params.as_slice(),
    )
    .map_err(map_sql_error)?;

    Ok(())
}

/// Persist the mutable columns of a merged ticket
///
/// Only the fields an update can touch are written; the rest of the row is
/// immutable after creation.
fn store_merged_ticket(conn: &DbConnection, ticket: &Ticket) -> Result<()> {
    let priority = ticket.priority.to_string();
    let status = ticket.status.to_string();
    let updated_at = ticket.updated_at.timestamp_millis();

    let params: [&dyn ToSql; 6] = [
        &priority,
        &status,
        &ticket.assigned_to,
        &ticket.additional_notes,
        &updated_at,
        &ticket.id,
    ];

    conn.execute(
        "UPDATE tickets SET
            priority = ?1, status = ?2, assigned_to = ?3, additional_notes = ?4, updated_at = ?5
         WHERE id = ?6",
        params.as_slice(),
    )
    .map_err(map_sql_error)?;

    Ok(())
}

/// Fetch one ticket by id
fn fetch_ticket(conn: &DbConnection, id: &str) -> Result<Option<Ticket>> {
    let result = conn.query_row(
        &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1"),
        params![&id],
        map_ticket_row,
    );

    match result {
        Ok(ticket) => Ok(Some(ticket)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(err) => Err(map_sql_error(err)),
    }
}

/// Query every ticket in feed order (created_at desc, id desc)
fn query_ordered_tickets(conn: &DbConnection) -> Result<Vec<Ticket>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets ORDER BY created_at DESC, id DESC"
        ))
        .map_err(map_sql_error)?;

    let rows = stmt.query_map(params![], map_ticket_row).map_err(map_sql_error)?;

    let mut tickets = Vec::new();
    for row in rows {
        tickets.push(row.map_err(map_sql_error)?);
    }
    Ok(tickets)
}

/// Publish the current filtered snapshot to every live subscriber
///
/// Runs entirely under the registry lock so snapshots reach each subscriber
/// in mutation order. Subscribers whose channel is gone or full are pruned.
fn publish_snapshots(conn: &DbConnection, watchers: &Mutex<Vec<TicketWatcher>>) -> Result<()> {
    let mut registry = watchers.lock();
    if registry.is_empty() {
        return Ok(());
    }

    let tickets = query_ordered_tickets(conn)?;

    registry.retain(|watcher| {
        let snapshot: Vec<Ticket> =
            tickets.iter().filter(|ticket| watcher.filter.matches(ticket)).cloned().collect();
        watcher.sink.publish(snapshot)
    });

    Ok(())
}

// =============================================================================
// Column Mapping
// =============================================================================

fn parse_enum_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, err.into())
    })
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

fn opt_timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let millis: Option<i64> = row.get(idx)?;
    millis
        .map(|value| {
            DateTime::<Utc>::from_timestamp_millis(value).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    rusqlite::types::Type::Integer,
                    format!("timestamp out of range: {value}").into(),
                )
            })
        })
        .transpose()
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
