//! Command-line interface definitions
//!
//! Subcommand tree plus the shared wiring that turns loaded configuration
//! into controllers. Handlers live in their own modules and contain no
//! business logic; the workflow controllers do the work.

pub mod connection;
pub mod sync;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::api::resilience::ResilienceConfig;
use crate::api::{HttpSyncGateway, SyncGateway};
use crate::workflow::{
    ConnectionManager, ConsoleNavigator, ConsoleNotifier, Navigator, Notifier,
    SyncConfigurationList,
};

#[derive(Parser)]
#[command(
    name = "clevertap-cli",
    version,
    about = "Administer Salesforce to CleverTap data sync"
)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage CleverTap connection configurations
    #[command(subcommand)]
    Connection(ConnectionCommands),
    /// Manage sync configurations and their field mappings
    #[command(subcommand)]
    Sync(SyncCommands),
}

#[derive(Subcommand)]
pub enum ConnectionCommands {
    /// List stored connections
    List,
    /// Create a new connection
    Create,
    /// Edit an existing connection
    Edit {
        /// Connection identifier
        id: String,
    },
    /// Delete a connection
    Delete {
        /// Connection identifier
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show the sync configurations of a connection
    Map {
        /// Connection identifier
        id: String,
    },
}

#[derive(Subcommand)]
pub enum SyncCommands {
    /// List sync configurations
    List {
        /// Sort column: name, sync-type, salesforce-entity,
        /// clevertap-entity or status
        #[arg(long)]
        sort: Option<String>,
        /// Sort direction: asc or desc
        #[arg(long, default_value = "asc")]
        direction: String,
    },
    /// Create a sync configuration and define its field mappings
    Create,
    /// Edit a sync configuration and its field mappings
    Edit {
        /// Sync configuration identifier
        id: String,
    },
    /// Delete a sync configuration
    Delete {
        /// Sync configuration identifier
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Activate a sync configuration
    Activate {
        /// Sync configuration identifier
        id: String,
    },
    /// Deactivate a sync configuration
    Deactivate {
        /// Sync configuration identifier
        id: String,
    },
}

/// Shared wiring for command handlers
pub(crate) struct Workbench {
    pub gateway: Arc<dyn SyncGateway>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
    pub resilience: ResilienceConfig,
}

impl Workbench {
    pub fn from_config() -> Result<Self> {
        let config = crate::config::global_config()?;
        let resilience = config.resilience.to_resilience();
        let gateway = Arc::new(HttpSyncGateway::new(&config.gateway, &resilience)?);
        Ok(Self {
            gateway,
            notifier: Arc::new(ConsoleNotifier),
            navigator: Arc::new(ConsoleNavigator),
            resilience,
        })
    }

    pub fn connection_manager(&self) -> ConnectionManager {
        ConnectionManager::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.notifier),
            Arc::clone(&self.navigator),
            self.resilience.clone(),
        )
    }

    pub fn sync_list(&self) -> SyncConfigurationList {
        SyncConfigurationList::new(Arc::clone(&self.gateway), Arc::clone(&self.notifier))
    }
}
