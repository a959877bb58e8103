//! In-memory mocks for the ticket ports.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use supportdesk_core::subscriptions::{subscription_channel, SubscriptionSink};
use supportdesk_core::tickets::ports::{
    AttachmentStore, TicketFilter, TicketStore, TicketSubscription,
};
use supportdesk_domain::{
    Caller, ContactChannel, Result as DomainResult, Role, SupportDeskError, Ticket,
    TicketCategory, TicketDraft, TicketPriority, TicketStatus, TicketUpdate,
};

/// In-memory mock for `TicketStore`.
///
/// Keeps tickets in a plain vector and replays the publish behaviour of
/// the real store: every mutation publishes a fresh full ordered snapshot
/// to each watcher whose filter matches.
#[derive(Default, Clone)]
pub struct MockTicketStore {
    inner: Arc<Mutex<TicketStoreState>>,
}

#[derive(Default)]
struct TicketStoreState {
    tickets: Vec<Ticket>,
    watchers: Vec<(TicketFilter, SubscriptionSink<Vec<Ticket>>)>,
}

impl MockTicketStore {
    /// Create an empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience helper for seeding a stored ticket.
    pub fn with_ticket(self, ticket: Ticket) -> Self {
        self.inner.lock().unwrap().tickets.push(ticket);
        self
    }

    /// Number of stored tickets.
    pub fn ticket_count(&self) -> usize {
        self.inner.lock().unwrap().tickets.len()
    }

    /// Status of a stored ticket, when present.
    pub fn status_of(&self, id: &str) -> Option<TicketStatus> {
        self.inner.lock().unwrap().tickets.iter().find(|t| t.id == id).map(|t| t.status)
    }
}

fn ordered(tickets: &[Ticket]) -> Vec<Ticket> {
    let mut list = tickets.to_vec();
    list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    list
}

fn publish_snapshots(state: &mut TicketStoreState) {
    let list = ordered(&state.tickets);
    state.watchers.retain(|(filter, sink)| {
        let snapshot: Vec<Ticket> = list.iter().filter(|t| filter.matches(t)).cloned().collect();
        sink.publish(snapshot)
    });
}

#[async_trait]
impl TicketStore for MockTicketStore {
    async fn insert(&self, ticket: Ticket) -> DomainResult<String> {
        let mut state = self.inner.lock().unwrap();
        let id = ticket.id.clone();
        state.tickets.push(ticket);
        publish_snapshots(&mut state);
        Ok(id)
    }

    async fn get(&self, id: &str) -> DomainResult<Option<Ticket>> {
        let state = self.inner.lock().unwrap();
        Ok(state.tickets.iter().find(|t| t.id == id).cloned())
    }

    async fn apply_update(
        &self,
        id: &str,
        update: &TicketUpdate,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<Option<Ticket>> {
        let mut state = self.inner.lock().unwrap();
        let Some(ticket) = state.tickets.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };

        if let Some(status) = update.status {
            ticket.status = status;
        }
        if let Some(priority) = update.priority {
            ticket.priority = priority;
        }
        if let Some(assigned_to) = &update.assigned_to {
            ticket.assigned_to = assigned_to.clone();
        }
        if let Some(notes) = &update.notes {
            ticket.additional_notes = Some(notes.clone());
        }
        ticket.updated_at = updated_at;
        let updated = ticket.clone();

        publish_snapshots(&mut state);
        Ok(Some(updated))
    }

    async fn delete(&self, id: &str) -> DomainResult<bool> {
        let mut state = self.inner.lock().unwrap();
        let before = state.tickets.len();
        state.tickets.retain(|t| t.id != id);
        let deleted = state.tickets.len() != before;
        if deleted {
            publish_snapshots(&mut state);
        }
        Ok(deleted)
    }

    async fn subscribe(&self, filter: TicketFilter) -> DomainResult<TicketSubscription> {
        let mut state = self.inner.lock().unwrap();
        let (sink, subscription) = subscription_channel(8);
        let snapshot: Vec<Ticket> =
            ordered(&state.tickets).into_iter().filter(|t| filter.matches(t)).collect();
        sink.publish(snapshot);
        state.watchers.push((filter, sink));
        Ok(subscription)
    }
}

/// In-memory mock for `AttachmentStore`.
///
/// Records uploaded blob names and can be switched into a failing mode to
/// exercise the abort-on-upload-failure path.
#[derive(Default, Clone)]
pub struct MockAttachmentStore {
    uploads: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl MockAttachmentStore {
    /// Create a mock that accepts every upload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose uploads always fail.
    pub fn failing() -> Self {
        Self { uploads: Arc::default(), fail: true }
    }

    /// Names of every stored blob, in upload order.
    pub fn uploaded_names(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl AttachmentStore for MockAttachmentStore {
    async fn upload(&self, name: &str, _bytes: &[u8]) -> DomainResult<String> {
        if self.fail {
            return Err(SupportDeskError::Dependency("attachment backend offline".into()));
        }
        self.uploads.lock().unwrap().push(name.to_string());
        Ok(format!("mock://{}", name))
    }
}

// Fixtures

/// Caller fixture with the customer role.
pub fn customer(id: &str) -> Caller {
    Caller { id: id.to_string(), role: Role::Customer }
}

/// Caller fixture with the agent role.
pub fn agent(id: &str) -> Caller {
    Caller { id: id.to_string(), role: Role::Agent }
}

/// A draft that passes every validation rule.
pub fn valid_draft() -> TicketDraft {
    TicketDraft {
        title: "Login broken".to_string(),
        description: "Cannot log in".to_string(),
        priority: TicketPriority::High,
        category: TicketCategory::Technical,
        contact_email: "u1@example.com".to_string(),
        contact_phone: None,
        preferred_contact: ContactChannel::Email,
        expected_resolution_date: None,
        additional_notes: None,
        agree_to_terms: true,
        attachment: None,
    }
}

/// A stored ticket owned by `created_by`, created at the given instant.
pub fn stored_ticket(id: &str, created_by: &str, created_at: DateTime<Utc>) -> Ticket {
    Ticket {
        id: id.to_string(),
        title: format!("Ticket {}", id),
        description: "Stored for tests".to_string(),
        priority: TicketPriority::Medium,
        category: TicketCategory::General,
        status: TicketStatus::New,
        contact_email: "u1@example.com".to_string(),
        contact_phone: None,
        preferred_contact: ContactChannel::Email,
        expected_resolution_date: None,
        additional_notes: None,
        attachment_url: None,
        created_by: created_by.to_string(),
        assigned_to: None,
        created_at,
        updated_at: created_at,
    }
}
