//! Ticket service - core business logic

use std::sync::Arc;

use chrono::Utc;
use supportdesk_common::validation::{
    EmailValidator, StringValidator, ValidationError, Validator,
};
use supportdesk_domain::constants::{ATTACHMENT_DIR, MAX_TITLE_LENGTH};
use supportdesk_domain::{
    Caller, Result, SupportDeskError, Ticket, TicketDraft, TicketStatus, TicketUpdate,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::ports::{AttachmentStore, TicketFilter, TicketStore, TicketSubscription};

/// Ticket lifecycle service
///
/// Enforces the role rules on every operation. The presentation layer may
/// hide a control, but this service is the gate that actually refuses.
pub struct TicketService {
    store: Arc<dyn TicketStore>,
    attachments: Arc<dyn AttachmentStore>,
}

impl TicketService {
    /// Create a new ticket service
    pub fn new(store: Arc<dyn TicketStore>, attachments: Arc<dyn AttachmentStore>) -> Self {
        Self { store, attachments }
    }

    /// Create a ticket from a submitted draft.
    ///
    /// The attachment, if any, is uploaded before the ticket is written.
    /// An upload failure aborts the whole creation, so a stored ticket
    /// never references a URL that was not confirmed uploaded.
    pub async fn create_ticket(&self, caller: &Caller, draft: TicketDraft) -> Result<Ticket> {
        validate_draft(&draft)?;

        let attachment_url = match &draft.attachment {
            Some(attachment) => {
                let name = format!(
                    "{ATTACHMENT_DIR}/{}_{}",
                    Utc::now().timestamp_millis(),
                    attachment.file_name
                );
                Some(self.attachments.upload(&name, &attachment.bytes).await?)
            }
            None => None,
        };

        let now = Utc::now();
        let ticket = Ticket {
            id: Uuid::now_v7().to_string(),
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            category: draft.category,
            status: TicketStatus::New,
            contact_email: draft.contact_email,
            contact_phone: draft.contact_phone,
            preferred_contact: draft.preferred_contact,
            expected_resolution_date: draft.expected_resolution_date,
            additional_notes: draft.additional_notes,
            attachment_url,
            created_by: caller.id.clone(),
            assigned_to: None,
            created_at: now,
            updated_at: now,
        };

        let id = self.store.insert(ticket.clone()).await?;
        info!(ticket_id = %id, caller_id = %caller.id, "ticket_created");
        Ok(ticket)
    }

    /// Open a live feed of tickets visible to the caller.
    ///
    /// Agents watch the whole store; customers watch only the tickets
    /// they created.
    pub async fn watch_tickets(&self, caller: &Caller) -> Result<TicketSubscription> {
        let filter = if caller.role.is_agent() {
            TicketFilter::All
        } else {
            TicketFilter::CreatedBy(caller.id.clone())
        };
        info!(caller_id = %caller.id, agent = caller.role.is_agent(), "ticket_watch_started");
        self.store.subscribe(filter).await
    }

    /// Merge a partial edit into an existing ticket. Agent-only.
    pub async fn update_ticket(
        &self,
        caller: &Caller,
        id: &str,
        update: TicketUpdate,
    ) -> Result<Ticket> {
        self.require_agent(caller, "update tickets")?;
        if update.is_empty() {
            return Err(SupportDeskError::Validation("update: no fields to apply".into()));
        }

        let updated = self
            .store
            .apply_update(id, &update, Utc::now())
            .await?
            .ok_or_else(|| SupportDeskError::NotFound(format!("ticket {id}")))?;
        info!(ticket_id = %id, caller_id = %caller.id, "ticket_updated");
        Ok(updated)
    }

    /// Set the ticket status. Agent-only.
    ///
    /// Any status may follow any other; the model imposes no forward-only
    /// ordering.
    pub async fn set_status(
        &self,
        caller: &Caller,
        id: &str,
        status: TicketStatus,
    ) -> Result<Ticket> {
        self.require_agent(caller, "change ticket status")?;

        let update = TicketUpdate { status: Some(status), ..TicketUpdate::default() };
        let updated = self
            .store
            .apply_update(id, &update, Utc::now())
            .await?
            .ok_or_else(|| SupportDeskError::NotFound(format!("ticket {id}")))?;
        info!(ticket_id = %id, status = %status, caller_id = %caller.id, "ticket_status_changed");
        Ok(updated)
    }

    /// Delete a ticket. Only the customer who created it may delete it.
    ///
    /// The role gate comes before any store access, so an agent is
    /// refused even for ids that do not exist. Deletion is unconditional
    /// with respect to status, resolved and closed tickets included.
    pub async fn delete_ticket(&self, caller: &Caller, id: &str) -> Result<()> {
        if caller.role.is_agent() {
            warn!(caller_id = %caller.id, ticket_id = %id, "ticket_delete_denied");
            return Err(SupportDeskError::Authorization("Agents cannot delete tickets".into()));
        }

        let ticket = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| SupportDeskError::NotFound(format!("ticket {id}")))?;

        if ticket.created_by != caller.id {
            warn!(caller_id = %caller.id, ticket_id = %id, "ticket_delete_denied");
            return Err(SupportDeskError::Authorization(
                "Only the ticket owner can delete a ticket".into(),
            ));
        }

        if !self.store.delete(id).await? {
            return Err(SupportDeskError::NotFound(format!("ticket {id}")));
        }
        info!(ticket_id = %id, caller_id = %caller.id, "ticket_deleted");
        Ok(())
    }

    fn require_agent(&self, caller: &Caller, action: &str) -> Result<()> {
        if caller.role.is_agent() {
            return Ok(());
        }
        warn!(caller_id = %caller.id, action, "ticket_access_denied");
        Err(SupportDeskError::Authorization(format!("Only agents can {action}")))
    }
}

/// Check every draft field and collect all failures into one error
/// naming each offending field.
fn validate_draft(draft: &TicketDraft) -> Result<()> {
    let mut validator = Validator::new();

    let title_rules = StringValidator::new().not_empty().max_length(MAX_TITLE_LENGTH);
    let _ = validator.validate_field("title", &draft.title, &title_rules);
    let _ = validator.validate_not_empty("description", &draft.description);
    let _ = validator.validate_field("contact_email", &draft.contact_email, &EmailValidator::new());
    if !draft.agree_to_terms {
        validator.add_error("agree_to_terms", "You must agree to the terms");
    }

    validator.finalize().map_err(map_validation)
}

fn map_validation(err: ValidationError) -> SupportDeskError {
    let detail = err
        .errors
        .iter()
        .map(|field| format!("{}: {}", field.field, field.message))
        .collect::<Vec<_>>()
        .join("; ");
    SupportDeskError::Validation(detail)
}
