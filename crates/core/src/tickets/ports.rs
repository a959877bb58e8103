//! Port interfaces for ticket persistence and attachments
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use supportdesk_domain::{Result, Ticket, TicketUpdate};

use crate::subscriptions::Subscription;

/// Live feed of full ticket snapshots for one subscriber.
pub type TicketSubscription = Subscription<Vec<Ticket>>;

/// Scope of a ticket subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketFilter {
    /// Every ticket in the store.
    All,
    /// Only tickets created by the given profile id.
    CreatedBy(String),
}

impl TicketFilter {
    /// Whether a ticket falls within this scope.
    pub fn matches(&self, ticket: &Ticket) -> bool {
        match self {
            TicketFilter::All => true,
            TicketFilter::CreatedBy(id) => ticket.created_by == *id,
        }
    }
}

/// Trait for ticket persistence and live queries
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Persist a new ticket and return its id
    async fn insert(&self, ticket: Ticket) -> Result<String>;

    /// Get a ticket by id
    async fn get(&self, id: &str) -> Result<Option<Ticket>>;

    /// Merge the present fields of an update into the stored ticket and
    /// stamp `updated_at`. Returns `None` when the id is unknown.
    async fn apply_update(
        &self,
        id: &str,
        update: &TicketUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Ticket>>;

    /// Delete a ticket. Returns `false` when the id is unknown.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Subscribe to the ticket list within the filter scope.
    ///
    /// The current snapshot is delivered immediately. Every later
    /// mutation publishes a fresh full snapshot (never a delta), ordered
    /// by `created_at` descending with `id` descending as tiebreak.
    async fn subscribe(&self, filter: TicketFilter) -> Result<TicketSubscription>;
}

/// Trait for attachment blob storage
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Store a blob under the given name and return a retrieval URL
    async fn upload(&self, name: &str, bytes: &[u8]) -> Result<String>;
}
