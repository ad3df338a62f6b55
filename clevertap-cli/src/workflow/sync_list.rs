//! Sync configuration list
//!
//! Maintains the list of configured sync jobs with derived presentation
//! state per row (status display class and available actions), client-side
//! sorting, status toggling, and two-step deletion.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use log::error;

use crate::api::models::{SyncConfiguration, SyncStatus};
use crate::api::SyncGateway;

use super::notify::Notifier;

/// Actions offered on a list row. Exactly one of Activate/Deactivate is
/// present, depending on the row's current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
    Activate,
    Deactivate,
}

impl RowAction {
    pub fn label(&self) -> &'static str {
        match self {
            RowAction::Edit => "Edit",
            RowAction::Delete => "Delete",
            RowAction::Activate => "Activate",
            RowAction::Deactivate => "Deactivate",
        }
    }
}

/// Status mutation requested from a row action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Activate,
    Deactivate,
}

impl StatusAction {
    /// Status the action moves the row to
    pub fn target_status(&self) -> SyncStatus {
        match self {
            StatusAction::Activate => SyncStatus::Active,
            StatusAction::Deactivate => SyncStatus::Inactive,
        }
    }

    fn done_label(&self) -> &'static str {
        match self {
            StatusAction::Activate => "activated",
            StatusAction::Deactivate => "deactivated",
        }
    }

    fn doing_label(&self) -> &'static str {
        match self {
            StatusAction::Activate => "activating",
            StatusAction::Deactivate => "deactivating",
        }
    }
}

/// Sortable columns of the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    SyncType,
    SalesforceEntity,
    ClevertapEntity,
    Status,
}

impl FromStr for SortField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "sync-type" | "synctype" => Ok(SortField::SyncType),
            "salesforce-entity" | "salesforceentity" => Ok(SortField::SalesforceEntity),
            "clevertap-entity" | "clevertapentity" => Ok(SortField::ClevertapEntity),
            "status" => Ok(SortField::Status),
            other => anyhow::bail!("unknown sort field '{}'", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl FromStr for SortDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => anyhow::bail!("unknown sort direction '{}'", other),
        }
    }
}

/// One list row with its derived presentation state
#[derive(Debug, Clone, PartialEq)]
pub struct SyncRow {
    pub record: SyncConfiguration,
    pub status_class: &'static str,
    pub actions: Vec<RowAction>,
}

/// Display class for a status value. Anything outside the three known
/// statuses renders without a class.
pub fn status_class(status: Option<SyncStatus>) -> &'static str {
    match status {
        Some(SyncStatus::Active) => "success",
        Some(SyncStatus::Inactive) => "muted",
        Some(SyncStatus::Error) => "error",
        _ => "",
    }
}

/// Action set for a row: Edit and Delete always, then exactly one of
/// Activate/Deactivate
pub fn row_actions(status: Option<SyncStatus>) -> Vec<RowAction> {
    let mut actions = vec![RowAction::Edit, RowAction::Delete];
    if status == Some(SyncStatus::Active) {
        actions.push(RowAction::Deactivate);
    } else {
        actions.push(RowAction::Activate);
    }
    actions
}

/// Controller for the sync configuration list
pub struct SyncConfigurationList {
    gateway: Arc<dyn SyncGateway>,
    notifier: Arc<dyn Notifier>,
    rows: Vec<SyncRow>,
    pending_delete: Option<String>,
    loading: bool,
}

impl SyncConfigurationList {
    pub fn new(gateway: Arc<dyn SyncGateway>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            notifier,
            rows: Vec::new(),
            pending_delete: None,
            loading: false,
        }
    }

    pub fn rows(&self) -> &[SyncRow] {
        &self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    /// Fetch the list and recompute derived row state
    pub async fn load(&mut self) -> Result<()> {
        match self.gateway.get_sync_configurations().await {
            Ok(records) => {
                self.rows = derive_rows(records);
                Ok(())
            }
            Err(cause) => {
                error!("Error fetching sync configurations: {:#}", cause);
                self.notifier
                    .error("Error", "Error fetching sync configurations");
                Err(cause)
            }
        }
    }

    /// Stable sort by the string value of a column. Rows missing the value
    /// compare as empty string, so they sort first ascending.
    pub fn sort(&mut self, field: SortField, direction: SortDirection) {
        self.rows.sort_by(|a, b| {
            let va = field_value(&a.record, field).unwrap_or_default();
            let vb = field_value(&b.record, field).unwrap_or_default();
            let ordering = va.cmp(&vb);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    /// First step of deletion: remember the selection, await confirmation
    pub fn request_delete(&mut self, id: &str) {
        self.pending_delete = Some(id.to_string());
    }

    /// Drop the pending selection without touching the backend
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Confirmed deletion of the pending selection
    pub async fn confirm_delete(&mut self) -> Result<()> {
        let Some(id) = self.pending_delete.clone() else {
            anyhow::bail!("No sync configuration selected for deletion");
        };
        self.loading = true;
        let result = self.gateway.delete_sync_configuration(&id).await;
        match result {
            Ok(()) => {
                self.notifier
                    .success("Success", "Sync configuration deleted successfully");
                self.pending_delete = None;
                self.refresh().await;
                self.loading = false;
                Ok(())
            }
            Err(cause) => {
                error!("Error deleting sync configuration: {:#}", cause);
                self.notifier
                    .error("Error", "Error deleting sync configuration");
                self.loading = false;
                Err(cause)
            }
        }
    }

    /// Activate or deactivate a row
    pub async fn set_status(&mut self, id: &str, action: StatusAction) -> Result<()> {
        self.loading = true;
        let result = self
            .gateway
            .update_sync_status(id, action.target_status())
            .await;
        match result {
            Ok(()) => {
                self.refresh().await;
                self.notifier.success(
                    "Success",
                    &format!("Sync configuration {} successfully", action.done_label()),
                );
                self.loading = false;
                Ok(())
            }
            Err(cause) => {
                error!(
                    "Error {} sync configuration: {:#}",
                    action.doing_label(),
                    cause
                );
                self.notifier.error(
                    "Error",
                    &format!("Error {} sync configuration", action.doing_label()),
                );
                self.loading = false;
                Err(cause)
            }
        }
    }

    /// Re-fetch and re-derive. Failures stay inside this method: a refresh
    /// problem is logged, never returned, so callers cannot be failed by it.
    pub async fn refresh(&mut self) {
        match self.gateway.get_sync_configurations().await {
            Ok(records) => self.rows = derive_rows(records),
            Err(cause) => error!("Error refreshing data: {:#}", cause),
        }
    }
}

fn derive_rows(records: Vec<SyncConfiguration>) -> Vec<SyncRow> {
    records
        .into_iter()
        .map(|record| SyncRow {
            status_class: status_class(record.status),
            actions: row_actions(record.status),
            record,
        })
        .collect()
}

fn field_value(record: &SyncConfiguration, field: SortField) -> Option<String> {
    match field {
        SortField::Name => Some(record.name.clone()),
        SortField::SyncType => Some(record.sync_type.label().to_string()),
        SortField::SalesforceEntity => Some(record.salesforce_entity.to_string()),
        SortField::ClevertapEntity => Some(record.clevertap_entity.to_string()),
        SortField::Status => record.status.map(|status| status.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::notify::Severity;
    use crate::workflow::testing::{MockGateway, RecordingNotifier, sync_configuration};

    fn list(gateway: Arc<MockGateway>, notifier: Arc<RecordingNotifier>) -> SyncConfigurationList {
        SyncConfigurationList::new(gateway, notifier)
    }

    #[test]
    fn every_status_yields_exactly_one_toggle_action() {
        let statuses = [
            Some(SyncStatus::Active),
            Some(SyncStatus::Inactive),
            Some(SyncStatus::Error),
            Some(SyncStatus::Unknown),
            None,
        ];
        for status in statuses {
            let actions = row_actions(status);
            assert!(actions.contains(&RowAction::Edit));
            assert!(actions.contains(&RowAction::Delete));
            let toggles = actions
                .iter()
                .filter(|a| matches!(a, RowAction::Activate | RowAction::Deactivate))
                .count();
            assert_eq!(toggles, 1, "status {:?}", status);
        }
        assert!(row_actions(Some(SyncStatus::Active)).contains(&RowAction::Deactivate));
        assert!(row_actions(Some(SyncStatus::Inactive)).contains(&RowAction::Activate));
    }

    #[test]
    fn status_class_is_empty_outside_known_statuses() {
        assert_eq!(status_class(Some(SyncStatus::Active)), "success");
        assert_eq!(status_class(Some(SyncStatus::Inactive)), "muted");
        assert_eq!(status_class(Some(SyncStatus::Error)), "error");
        assert_eq!(status_class(Some(SyncStatus::Unknown)), "");
        assert_eq!(status_class(None), "");
    }

    #[tokio::test]
    async fn missing_field_values_sort_first_ascending() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_sync_result(Ok(vec![
            sync_configuration("1", "With status", Some(SyncStatus::Active)),
            sync_configuration("2", "Without status", None),
        ]));
        let mut list = list(gateway, Arc::new(RecordingNotifier::new()));
        list.load().await.unwrap();

        list.sort(SortField::Status, SortDirection::Ascending);
        assert_eq!(list.rows()[0].record.id, "2");
        assert_eq!(list.rows()[1].record.id, "1");

        list.sort(SortField::Status, SortDirection::Descending);
        assert_eq!(list.rows()[0].record.id, "1");
    }

    #[tokio::test]
    async fn sort_is_stable_for_equal_keys() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_sync_result(Ok(vec![
            sync_configuration("a", "Same", Some(SyncStatus::Active)),
            sync_configuration("b", "Same", Some(SyncStatus::Active)),
            sync_configuration("c", "Same", Some(SyncStatus::Active)),
        ]));
        let mut list = list(gateway, Arc::new(RecordingNotifier::new()));
        list.load().await.unwrap();

        list.sort(SortField::Name, SortDirection::Ascending);
        let ids: Vec<_> = list.rows().iter().map(|r| r.record.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn cancel_delete_clears_selection_without_backend_call() {
        let gateway = Arc::new(MockGateway::new());
        let mut list = list(Arc::clone(&gateway), Arc::new(RecordingNotifier::new()));

        list.request_delete("SYNC1");
        assert_eq!(list.pending_delete(), Some("SYNC1"));
        list.cancel_delete();
        assert_eq!(list.pending_delete(), None);
        assert_eq!(gateway.call_count("delete_sync_configuration"), 0);
    }

    #[tokio::test]
    async fn confirmed_delete_calls_backend_and_refreshes() {
        let gateway = Arc::new(MockGateway::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let mut list = list(Arc::clone(&gateway), Arc::clone(&notifier));

        list.request_delete("SYNC1");
        list.confirm_delete().await.unwrap();

        assert_eq!(gateway.deleted_sync_ids.lock().unwrap().as_slice(), ["SYNC1"]);
        assert_eq!(gateway.call_count("get_sync_configurations"), 1);
        assert!(notifier.has_severity(Severity::Success));
        assert_eq!(list.pending_delete(), None);
    }

    #[tokio::test]
    async fn activate_maps_to_active_status() {
        let gateway = Arc::new(MockGateway::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let mut list = list(Arc::clone(&gateway), Arc::clone(&notifier));

        list.set_status("SYNC1", StatusAction::Activate).await.unwrap();

        assert_eq!(
            gateway.status_updates.lock().unwrap().as_slice(),
            [("SYNC1".to_string(), SyncStatus::Active)]
        );
        assert_eq!(
            notifier.last().unwrap().message,
            "Sync configuration activated successfully"
        );
    }

    #[tokio::test]
    async fn status_failure_carries_the_action_name() {
        let gateway = Arc::new(MockGateway::new());
        *gateway.fail_update_status.lock().unwrap() = Some("backend down".to_string());
        let notifier = Arc::new(RecordingNotifier::new());
        let mut list = list(Arc::clone(&gateway), Arc::clone(&notifier));

        assert!(list
            .set_status("SYNC1", StatusAction::Deactivate)
            .await
            .is_err());
        assert_eq!(
            notifier.last().unwrap().message,
            "Error deactivating sync configuration"
        );
    }

    #[tokio::test]
    async fn refresh_failure_is_contained() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_sync_result(Ok(vec![sync_configuration(
            "1",
            "Keep",
            Some(SyncStatus::Active),
        )]));
        let mut list = list(Arc::clone(&gateway), Arc::new(RecordingNotifier::new()));
        list.load().await.unwrap();

        gateway.push_sync_result(Err("gateway unavailable"));
        list.refresh().await;
        // Rows from the last good load are kept
        assert_eq!(list.rows().len(), 1);
    }
}
