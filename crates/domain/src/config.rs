//! Configuration structures
//!
//! Plain data structures for application configuration. Loading (environment
//! variables, config files) lives in the infra crate; these types only define
//! the shape and the defaults.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ATTACHMENTS_ROOT, DEFAULT_DB_PATH, DEFAULT_DB_POOL_SIZE, DEFAULT_SUBSCRIPTION_BUFFER,
};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub attachments: AttachmentsConfig,
    #[serde(default)]
    pub subscriptions: SubscriptionsConfig,
}

/// SQLite database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the database file
    pub path: String,
    /// Connection pool size
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DB_PATH.to_string(), pool_size: DEFAULT_DB_POOL_SIZE }
    }
}

/// Attachment storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentsConfig {
    /// Directory that attachment files are written under
    pub root_dir: String,
}

impl Default for AttachmentsConfig {
    fn default() -> Self {
        Self { root_dir: DEFAULT_ATTACHMENTS_ROOT.to_string() }
    }
}

/// Ticket feed settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionsConfig {
    /// Per-subscriber snapshot buffer; subscribers that fall further behind
    /// are disconnected.
    pub buffer_capacity: usize,
}

impl Default for SubscriptionsConfig {
    fn default() -> Self {
        Self { buffer_capacity: DEFAULT_SUBSCRIPTION_BUFFER }
    }
}
