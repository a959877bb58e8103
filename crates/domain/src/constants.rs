//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Field limits enforced at the service boundary
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MIN_PASSWORD_LENGTH: usize = 6;

// Attachment storage layout
pub const ATTACHMENT_DIR: &str = "attachments";
pub const DEFAULT_ATTACHMENTS_ROOT: &str = "data";

// Database configuration defaults
pub const DEFAULT_DB_POOL_SIZE: u32 = 5;
pub const DEFAULT_DB_PATH: &str = "supportdesk.db";

// Ticket feed configuration
pub const DEFAULT_SUBSCRIPTION_BUFFER: usize = 32;
