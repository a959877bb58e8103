//! Ticket types
//!
//! Support tickets and their lifecycle vocabulary, as exchanged between the
//! services and their backing stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Ticket Vocabulary
// ============================================================================

/// Ticket lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    New,
    InProgress,
    Resolved,
    Closed,
}

crate::impl_domain_enum_conversions!(TicketStatus {
    New => "new",
    InProgress => "in_progress",
    Resolved => "resolved",
    Closed => "closed"
});

impl Default for TicketStatus {
    fn default() -> Self {
        Self::New
    }
}

/// Ticket priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

crate::impl_domain_enum_conversions!(TicketPriority {
    Low => "low",
    Medium => "medium",
    High => "high",
    Urgent => "urgent"
});

impl Default for TicketPriority {
    fn default() -> Self {
        Self::Medium
    }
}

/// Ticket category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketCategory {
    Technical,
    Billing,
    General,
    FeatureRequest,
}

crate::impl_domain_enum_conversions!(TicketCategory {
    Technical => "technical",
    Billing => "billing",
    General => "general",
    FeatureRequest => "feature_request"
});

impl Default for TicketCategory {
    fn default() -> Self {
        Self::General
    }
}

/// Contact channel agents should use for follow-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactChannel {
    Email,
    Phone,
}

crate::impl_domain_enum_conversions!(ContactChannel {
    Email => "email",
    Phone => "phone"
});

impl Default for ContactChannel {
    fn default() -> Self {
        Self::Email
    }
}

// ============================================================================
// Ticket Records
// ============================================================================

/// Support ticket as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String, // UUIDv7
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    pub category: TicketCategory,
    pub status: TicketStatus,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub preferred_contact: ContactChannel,
    pub expected_resolution_date: Option<DateTime<Utc>>,
    pub additional_notes: Option<String>,
    pub attachment_url: Option<String>,
    /// Profile id of the user who filed the ticket; never changes
    pub created_by: String,
    /// Profile id of the assigned agent, if any
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attachment payload submitted alongside a new ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentInput {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Creation payload for a new ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketDraft {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub priority: TicketPriority,
    #[serde(default)]
    pub category: TicketCategory,
    pub contact_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub preferred_contact: ContactChannel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_resolution_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    pub agree_to_terms: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentInput>,
}

/// Partial agent edit applied to an existing ticket
///
/// Absent fields are left untouched. `assigned_to` distinguishes "leave as
/// is" (field absent) from "unassign" (explicit null) through the double
/// Option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_with::rust::double_option"
    )]
    pub assigned_to: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TicketUpdate {
    /// True when no field is present
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.priority.is_none()
            && self.assigned_to.is_none()
            && self.notes.is_none()
    }
}
