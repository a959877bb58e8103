//! Domain types and models

pub mod profile;
pub mod session;
pub mod ticket;

pub use profile::{Profile, Role};
pub use session::{AuthenticatedUser, Caller, Identity, SessionState};
pub use ticket::{
    AttachmentInput, ContactChannel, Ticket, TicketCategory, TicketDraft, TicketPriority,
    TicketStatus, TicketUpdate,
};
