//! # SupportDesk Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite-backed ticket and profile stores with live snapshot fan-out
//! - The local identity provider (argon2 password hashing, session watch)
//! - Filesystem attachment storage
//! - Configuration loading and the application context
//!
//! ## Architecture
//! - Implements traits defined in `supportdesk-core`
//! - Depends on `supportdesk-domain` and `supportdesk-core`
//! - Contains all "impure" code (database, filesystem, clock)

pub mod attachments;
pub mod config;
pub mod context;
pub mod database;
pub mod errors;
pub mod identity;

// Re-export commonly used items
pub use attachments::FsAttachmentStore;
pub use context::{AppContext, ComponentHealth, HealthStatus};
pub use database::{DbConnection, DbManager, SqliteProfileStore, SqliteTicketStore};
pub use errors::InfraError;
pub use identity::LocalIdentityProvider;
