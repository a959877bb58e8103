//! # SupportDesk Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits)
//! - The ticket and account services
//! - The subscription primitive used by live queries
//!
//! ## Architecture Principles
//! - Only depends on `supportdesk-common` and `supportdesk-domain`
//! - No database, filesystem, or network code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod accounts;
pub mod subscriptions;
pub mod tickets;

// Re-export specific items to avoid ambiguity
pub use accounts::ports::{IdentityProvider, ProfileStore, SessionWatch};
pub use accounts::AccountService;
pub use subscriptions::{subscription_channel, Subscription, SubscriptionSink};
pub use tickets::ports::{AttachmentStore, TicketFilter, TicketStore, TicketSubscription};
pub use tickets::TicketService;
