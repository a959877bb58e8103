//! Application context - dependency injection container
//!
//! Wires the SQLite adapters into the core services and owns the shared
//! handles for the lifetime of the application.

use std::sync::Arc;

use supportdesk_core::accounts::ports::{IdentityProvider, ProfileStore};
use supportdesk_core::tickets::ports::{AttachmentStore, TicketStore};
use supportdesk_core::{AccountService, TicketService};
use supportdesk_domain::{Config, Result};
use tokio::task;

use crate::attachments::FsAttachmentStore;
use crate::database::{DbManager, SqliteProfileStore, SqliteTicketStore};
use crate::errors::InfraError;
use crate::identity::LocalIdentityProvider;

mod health;

pub use health::{ComponentHealth, HealthStatus};

/// Type alias for ticket store trait object
type DynTicketStore = dyn TicketStore + 'static;

/// Type alias for attachment store trait object
type DynAttachmentStore = dyn AttachmentStore + 'static;

/// Type alias for identity provider trait object
type DynIdentityProvider = dyn IdentityProvider + 'static;

/// Type alias for profile store trait object
type DynProfileStore = dyn ProfileStore + 'static;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,

    // Port adapters
    pub ticket_store: Arc<DynTicketStore>,
    pub attachment_store: Arc<DynAttachmentStore>,
    pub identity_provider: Arc<DynIdentityProvider>,
    pub profile_store: Arc<DynProfileStore>,

    // Services
    pub ticket_service: Arc<TicketService>,
    pub account_service: Arc<AccountService>,
}

impl AppContext {
    /// Create a new application context with default configuration
    pub async fn new() -> Result<Self> {
        Self::new_with_config(Config::default()).await
    }

    /// Create a new application context with custom configuration
    ///
    /// This method is primarily for testing, allowing tests to specify a
    /// custom database path and attachment root to avoid conflicts with the
    /// production data directory.
    pub async fn new_with_config(config: Config) -> Result<Self> {
        // Initialize database and apply schema
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        let buffer_capacity = config.subscriptions.buffer_capacity;

        // Port adapters over the shared pool
        let ticket_store: Arc<DynTicketStore> =
            Arc::new(SqliteTicketStore::new(Arc::clone(&db), buffer_capacity));
        let attachment_store: Arc<DynAttachmentStore> =
            Arc::new(FsAttachmentStore::new(&config.attachments.root_dir));
        let identity_provider: Arc<DynIdentityProvider> =
            Arc::new(LocalIdentityProvider::new(Arc::clone(&db), buffer_capacity));
        let profile_store: Arc<DynProfileStore> =
            Arc::new(SqliteProfileStore::new(Arc::clone(&db)));

        // Services
        let ticket_service = Arc::new(TicketService::new(
            Arc::clone(&ticket_store),
            Arc::clone(&attachment_store),
        ));
        let account_service = Arc::new(
            AccountService::new(Arc::clone(&identity_provider), Arc::clone(&profile_store))
                .with_watch_buffer(buffer_capacity),
        );

        tracing::info!(
            db_path = %config.database.path,
            attachments_root = %config.attachments.root_dir,
            "app_context_ready"
        );

        Ok(Self {
            config,
            db,
            ticket_store,
            attachment_store,
            identity_provider,
            profile_store,
            ticket_service,
            account_service,
        })
    }

    /// Check health of all application components
    ///
    /// Returns a `HealthStatus` with individual component health checks and
    /// an overall health score. The score is calculated as
    /// (healthy_components / total_components), and the application is
    /// considered healthy if score >= 0.8.
    pub async fn health_check(&self) -> HealthStatus {
        let mut status = HealthStatus::new();

        // Check database connection (async to avoid blocking)
        status = status.add_component(self.check_database_health().await);

        // Stateless wrappers over the database; healthy while constructed
        status = status.add_component(ComponentHealth::healthy("ticket_service"));
        status = status.add_component(ComponentHealth::healthy("account_service"));
        status = status.add_component(ComponentHealth::healthy("attachment_store"));

        status.calculate_score();
        status
    }

    async fn check_database_health(&self) -> ComponentHealth {
        let db = Arc::clone(&self.db);

        let probe = task::spawn_blocking(move || db.health_check())
            .await
            .map_err(|err| InfraError::from(err).into());

        match probe.and_then(|inner| inner) {
            Ok(()) => ComponentHealth::healthy("database"),
            Err(err) => {
                tracing::warn!(error = %err, "database health check failed");
                ComponentHealth::unhealthy("database", err.to_string())
            }
        }
    }
}
