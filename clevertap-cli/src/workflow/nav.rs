//! Navigation targets
//!
//! The admin surface moves between named pages carrying typed state.
//! Controllers express those transitions as [`NavTarget`] values
//! through the [`Navigator`] seam; the CLI logs them (command dispatch is
//! the real navigation there), tests assert on them.

use log::debug;

/// Mode the sync configuration editor is entered in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    New,
    Edit { record_id: String },
}

/// A named destination with its typed state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTarget {
    /// Connection settings page
    ConnectionSettings,
    /// Sync configuration list, optionally scoped to a connection;
    /// `refresh` forces the list to reload on arrival
    SyncList {
        connection_id: Option<String>,
        refresh: bool,
    },
    /// Sync configuration editor
    SyncEditor { mode: EditorMode },
}

/// Receiver for navigation requests from the workflow controllers
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: NavTarget);
}

/// CLI navigator: transitions are driven by subcommands, so requests are
/// only logged for traceability
#[derive(Debug, Default)]
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, target: NavTarget) {
        debug!("navigate -> {:?}", target);
    }
}
