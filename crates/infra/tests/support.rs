//! Shared fixtures for the infra integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use supportdesk_common::testing::TempDir;
use supportdesk_domain::{
    ContactChannel, Profile, Role, Ticket, TicketCategory, TicketPriority, TicketStatus,
};
use supportdesk_infra::database::DbManager;
use uuid::Uuid;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with the schema applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new("infra-test").expect("temp dir should be created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    /// Execute a batch of SQL statements against the database.
    pub fn execute_batch(&self, sql: &str) {
        let conn = self
            .manager
            .get_connection()
            .expect("connection should be available for execute_batch");
        conn.execute_batch(sql).expect("SQL batch execution should succeed");
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a test tracing subscriber (idempotent).
pub fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Build a stored ticket owned by `created_by` with fixed timestamps.
pub fn make_ticket(created_by: &str, title: &str) -> Ticket {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().expect("valid timestamp");
    Ticket {
        id: Uuid::now_v7().to_string(),
        title: title.to_string(),
        description: "Integration fixture".into(),
        priority: TicketPriority::Medium,
        category: TicketCategory::General,
        status: TicketStatus::New,
        contact_email: "fixture@example.com".into(),
        contact_phone: None,
        preferred_contact: ContactChannel::Email,
        expected_resolution_date: None,
        additional_notes: None,
        attachment_url: None,
        created_by: created_by.to_string(),
        assigned_to: None,
        created_at: now,
        updated_at: now,
    }
}

/// Build a profile record with the given role.
pub fn make_profile(id: &str, role: Role, email: &str) -> Profile {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().expect("valid timestamp");
    Profile {
        id: id.to_string(),
        role,
        full_name: None,
        email: email.to_string(),
        created_at: now,
        updated_at: now,
    }
}
