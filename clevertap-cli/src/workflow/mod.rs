//! Workflow controllers for the sync administration surface
//!
//! Four controllers, each thin over the shared gateway client:
//! connection management, the sync configuration list, the two-phase sync
//! configuration editor, and the field mapping editor. Controllers talk
//! to the outside world only through the [`SyncGateway`](crate::api::SyncGateway),
//! [`Notifier`](notify::Notifier), and [`Navigator`](nav::Navigator) seams.

pub mod connections;
pub mod field_mapping;
pub mod nav;
pub mod notify;
pub mod sync_editor;
pub mod sync_list;

#[cfg(test)]
pub(crate) mod testing;

pub use connections::{ConnectionDraft, ConnectionManager};
pub use field_mapping::{FieldMappingEditor, MappingRow};
pub use nav::{ConsoleNavigator, EditorMode, NavTarget, Navigator};
pub use notify::{ConsoleNotifier, Notification, Notifier, Severity};
pub use sync_editor::{SyncConfigurationEditor, SyncDraft, WizardStep};
pub use sync_list::{
    RowAction, SortDirection, SortField, StatusAction, SyncConfigurationList, SyncRow,
};
