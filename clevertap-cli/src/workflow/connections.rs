//! Connection configuration management
//!
//! Lists, creates, edits, and deletes CleverTap account bindings. The
//! gateway applies connection writes through an asynchronous metadata
//! deployment, so after an acknowledged save or delete the manager polls
//! the read path until it reflects the write instead of trusting the next
//! fetch.

use std::sync::Arc;

use anyhow::Result;
use log::{error, info};

use crate::api::models::{ConnectionConfig, Region, SUCCESS_ACK, SaveConnectionRequest};
use crate::api::resilience::{Convergence, ResilienceConfig, poll_until_converged};
use crate::api::SyncGateway;

use super::nav::{NavTarget, Navigator};
use super::notify::Notifier;

/// Editable snapshot of a connection.
///
/// Constructed fresh for every create/edit session and never aliased with
/// list-row state, so an abandoned edit cannot leak into the list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionDraft {
    /// Present when editing an existing connection
    pub id: Option<String>,
    /// Present when editing; assigned by the backend on create
    pub developer_name: Option<String>,
    pub name: String,
    pub region: Option<Region>,
    pub account_id: String,
    pub passcode: String,
}

impl ConnectionDraft {
    /// Empty draft for a new connection
    pub fn new() -> Self {
        Self::default()
    }

    fn from_config(config: &ConnectionConfig) -> Self {
        Self {
            id: Some(config.id.clone()),
            developer_name: Some(config.developer_name.clone()),
            name: config.name.clone(),
            region: Some(config.region),
            account_id: config.account_id.clone(),
            passcode: config.passcode.clone(),
        }
    }

    /// Check required fields and produce the typed save request
    pub fn validated(&self) -> Result<SaveConnectionRequest> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.region.is_none() {
            missing.push("region");
        }
        if self.account_id.trim().is_empty() {
            missing.push("account id");
        }
        if self.passcode.is_empty() {
            missing.push("passcode");
        }
        if !missing.is_empty() {
            anyhow::bail!("Missing required fields: {}", missing.join(", "));
        }
        Ok(SaveConnectionRequest {
            id: self.id.clone(),
            developer_name: self.developer_name.clone(),
            name: self.name.trim().to_string(),
            region: self.region.expect("validated above"),
            account_id: self.account_id.trim().to_string(),
            passcode: self.passcode.clone(),
        })
    }
}

/// Manages the connection configuration list and its CRUD workflow
pub struct ConnectionManager {
    gateway: Arc<dyn SyncGateway>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    resilience: ResilienceConfig,
    connections: Vec<ConnectionConfig>,
    loading: bool,
}

impl ConnectionManager {
    pub fn new(
        gateway: Arc<dyn SyncGateway>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        resilience: ResilienceConfig,
    ) -> Self {
        Self {
            gateway,
            notifier,
            navigator,
            resilience,
            connections: Vec::new(),
            loading: false,
        }
    }

    /// The currently loaded rows; sole source of truth for rendering
    pub fn connections(&self) -> &[ConnectionConfig] {
        &self.connections
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Fetch the connection list from the gateway
    pub async fn load(&mut self) -> Result<()> {
        match self.gateway.get_config().await {
            Ok(rows) => {
                info!("Loaded {} connection configuration(s)", rows.len());
                self.connections = rows;
                Ok(())
            }
            Err(cause) => {
                error!("Error fetching configurations: {:#}", cause);
                self.notifier
                    .error("Error", "Failed to fetch configurations");
                Err(cause)
            }
        }
    }

    /// Fresh draft for a new connection
    pub fn open_create(&self) -> ConnectionDraft {
        ConnectionDraft::new()
    }

    /// Draft populated from an already-loaded row; no network round-trip
    pub fn open_edit(&self, id: &str) -> Result<ConnectionDraft> {
        match self.connections.iter().find(|c| c.id == id) {
            Some(config) => Ok(ConnectionDraft::from_config(config)),
            None => {
                self.notifier.error("Error", "Connection identifier not found");
                anyhow::bail!("No connection with id {}", id)
            }
        }
    }

    /// Validate and persist a draft, then wait for the read path to catch
    /// up with the write
    pub async fn save(&mut self, draft: &ConnectionDraft) -> Result<()> {
        if self.loading {
            anyhow::bail!("Another connection operation is already in progress");
        }
        self.loading = true;
        let result = self.save_inner(draft).await;
        self.loading = false;
        result
    }

    async fn save_inner(&mut self, draft: &ConnectionDraft) -> Result<()> {
        let request = match draft.validated() {
            Ok(request) => request,
            Err(cause) => {
                self.notifier.error("Error", &cause.to_string());
                return Err(cause);
            }
        };

        let ack = match self.gateway.save_config(request.clone()).await {
            Ok(ack) => ack,
            Err(cause) => {
                error!("Error saving configuration: {:#}", cause);
                self.notifier.error("Error", &remote_message(&cause, "Failed to save configuration"));
                return Err(cause);
            }
        };

        if ack != SUCCESS_ACK {
            self.notifier.error("Error", "Failed to save configuration");
            anyhow::bail!("Gateway rejected the save: {}", ack);
        }

        self.notifier
            .success("Success", "Configuration saved successfully");
        self.notifier
            .info("Info", "Waiting for changes to process...");

        let gateway = Arc::clone(&self.gateway);
        let outcome = poll_until_converged(&self.resilience.convergence, "connection save", || {
            let gateway = Arc::clone(&gateway);
            let saved = request.clone();
            async move {
                let rows = gateway.get_config().await?;
                let visible = rows.iter().any(|row| reflects_save(row, &saved));
                Ok(visible.then_some(rows))
            }
        })
        .await;

        match outcome {
            Convergence::Converged { value, .. } => {
                self.connections = value;
                self.notifier
                    .success("Success", "Configuration refresh completed");
            }
            Convergence::Stale { elapsed, .. } => {
                self.notifier.warning(
                    "Warning",
                    &format!(
                        "Configuration saved, but the list has not reflected it after {:.0?}; refresh later",
                        elapsed
                    ),
                );
            }
        }
        Ok(())
    }

    /// Delete a connection by row id. Requires the row to carry a
    /// developer name; deletion is keyed on it.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        if self.loading {
            anyhow::bail!("Another connection operation is already in progress");
        }
        self.loading = true;
        let result = self.delete_inner(id).await;
        self.loading = false;
        result
    }

    async fn delete_inner(&mut self, id: &str) -> Result<()> {
        let developer_name = match self.connections.iter().find(|c| c.id == id) {
            Some(config) if !config.developer_name.is_empty() => config.developer_name.clone(),
            _ => {
                self.notifier
                    .error("Error", "Configuration identifier not found");
                anyhow::bail!("Connection {} has no developer name; cannot delete", id);
            }
        };

        self.notifier.info("Info", "Starting deletion process...");

        let ack = match self.gateway.delete_config(&developer_name).await {
            Ok(ack) => ack,
            Err(cause) => {
                error!("Error during deletion: {:#}", cause);
                self.notifier.error(
                    "Error",
                    &remote_message(&cause, "Failed to delete configuration"),
                );
                return Err(cause);
            }
        };

        if ack != SUCCESS_ACK {
            self.notifier.error("Error", "Failed to process deletion");
            anyhow::bail!("Gateway rejected the deletion: {}", ack);
        }

        self.notifier
            .info("Info", "Deletion initiated successfully");

        let gateway = Arc::clone(&self.gateway);
        let outcome =
            poll_until_converged(&self.resilience.convergence, "connection delete", || {
                let gateway = Arc::clone(&gateway);
                let target = developer_name.clone();
                async move {
                    let rows = gateway.get_config().await?;
                    let gone = !rows.iter().any(|row| row.developer_name == target);
                    Ok(gone.then_some(rows))
                }
            })
            .await;

        match outcome {
            Convergence::Converged { value, .. } => {
                self.connections = value;
                self.notifier
                    .success("Success", "Configuration deleted successfully");
            }
            Convergence::Stale { elapsed, .. } => {
                self.notifier.warning(
                    "Warning",
                    &format!(
                        "Deletion accepted, but the record was still listed after {:.0?}; refresh later",
                        elapsed
                    ),
                );
            }
        }
        Ok(())
    }

    /// Navigate to the sync configuration list for a connection. The id
    /// must resolve against the loaded rows; a stale row is an error, not
    /// a navigation.
    pub fn navigate_to_mappings(&self, id: &str) -> Result<()> {
        let connection = self
            .connections
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| {
                self.notifier
                    .error("Error", "Connection identifier not found");
                anyhow::anyhow!("No connection with id {}", id)
            })?;
        self.navigator.navigate(NavTarget::SyncList {
            connection_id: Some(connection.id.clone()),
            refresh: false,
        });
        Ok(())
    }
}

/// True once a fetched row reflects the saved values. The passcode is not
/// compared; the gateway masks it on reads.
fn reflects_save(row: &ConnectionConfig, saved: &SaveConnectionRequest) -> bool {
    let identity = match &saved.developer_name {
        Some(developer_name) if !developer_name.is_empty() => {
            row.developer_name == *developer_name
        }
        _ => row.name == saved.name,
    };
    identity && row.region == saved.region && row.account_id == saved.account_id && row.name == saved.name
}

fn remote_message(cause: &anyhow::Error, fallback: &str) -> String {
    let message = cause.to_string();
    if message.is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::notify::Severity;
    use crate::workflow::testing::{
        MockGateway, RecordingNavigator, RecordingNotifier, connection,
    };

    fn manager(
        gateway: Arc<MockGateway>,
        notifier: Arc<RecordingNotifier>,
        navigator: Arc<RecordingNavigator>,
    ) -> ConnectionManager {
        ConnectionManager::new(gateway, notifier, navigator, ResilienceConfig::immediate())
    }

    fn draft() -> ConnectionDraft {
        ConnectionDraft {
            id: None,
            developer_name: None,
            name: "Production".to_string(),
            region: Some(Region::Europe),
            account_id: "ACCT-1".to_string(),
            passcode: "p@ss".to_string(),
        }
    }

    #[tokio::test]
    async fn load_failure_notifies_and_logs() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_config_result(Err("gateway unavailable"));
        let notifier = Arc::new(RecordingNotifier::new());
        let mut manager = manager(gateway, Arc::clone(&notifier), Arc::new(RecordingNavigator::new()));

        assert!(manager.load().await.is_err());
        assert!(notifier.has_severity(Severity::Error));
    }

    #[tokio::test]
    async fn save_blocks_on_missing_required_fields() {
        let gateway = Arc::new(MockGateway::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let mut manager = manager(
            Arc::clone(&gateway),
            Arc::clone(&notifier),
            Arc::new(RecordingNavigator::new()),
        );

        let incomplete = ConnectionDraft {
            region: None,
            ..draft()
        };
        assert!(manager.save(&incomplete).await.is_err());
        assert_eq!(gateway.call_count("save_config"), 0);
        assert!(notifier.has_severity(Severity::Error));
    }

    #[tokio::test]
    async fn save_polls_until_the_record_is_visible() {
        let gateway = Arc::new(MockGateway::new());
        // First probe: still empty. Second probe: record visible.
        gateway.push_config_result(Ok(vec![]));
        gateway.push_config_result(Ok(vec![connection("1", "conn_dev_1", "Production")]));
        let notifier = Arc::new(RecordingNotifier::new());
        let mut manager = manager(
            Arc::clone(&gateway),
            Arc::clone(&notifier),
            Arc::new(RecordingNavigator::new()),
        );

        let mut saved = draft();
        saved.region = Some(Region::India);
        saved.account_id = "acct-1".to_string();
        manager.save(&saved).await.unwrap();

        assert_eq!(gateway.call_count("get_config"), 2);
        assert_eq!(manager.connections().len(), 1);
        let last = notifier.last().unwrap();
        assert_eq!(last.severity, Severity::Success);
        assert_eq!(last.message, "Configuration refresh completed");
    }

    #[tokio::test]
    async fn save_reports_staleness_without_raising() {
        let gateway = Arc::new(MockGateway::new());
        // All probes come back without the record
        let notifier = Arc::new(RecordingNotifier::new());
        let mut manager = manager(
            Arc::clone(&gateway),
            Arc::clone(&notifier),
            Arc::new(RecordingNavigator::new()),
        );

        manager.save(&draft()).await.unwrap();
        assert_eq!(notifier.last().unwrap().severity, Severity::Warning);
    }

    #[tokio::test]
    async fn delete_without_developer_name_makes_no_remote_call() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_config_result(Ok(vec![connection("1", "", "Legacy")]));
        let notifier = Arc::new(RecordingNotifier::new());
        let mut manager = manager(
            Arc::clone(&gateway),
            Arc::clone(&notifier),
            Arc::new(RecordingNavigator::new()),
        );
        manager.load().await.unwrap();

        assert!(manager.delete("1").await.is_err());
        assert_eq!(gateway.call_count("delete_config"), 0);
        assert_eq!(notifier.last().unwrap().severity, Severity::Error);
    }

    #[tokio::test]
    async fn delete_polls_until_the_record_disappears() {
        let target = connection("1", "conn_dev_1", "Production");
        let gateway = Arc::new(MockGateway::new());
        gateway.push_config_result(Ok(vec![target.clone()]));
        // First probe still lists the record, second probe does not
        gateway.push_config_result(Ok(vec![target.clone()]));
        gateway.push_config_result(Ok(vec![]));
        let notifier = Arc::new(RecordingNotifier::new());
        let mut manager = manager(
            Arc::clone(&gateway),
            Arc::clone(&notifier),
            Arc::new(RecordingNavigator::new()),
        );
        manager.load().await.unwrap();

        manager.delete("1").await.unwrap();

        assert_eq!(
            gateway.deleted_developer_names.lock().unwrap().as_slice(),
            ["conn_dev_1"]
        );
        // One initial load plus exactly two convergence probes
        assert_eq!(gateway.call_count("get_config"), 3);
        assert!(manager.connections().is_empty());
        let last = notifier.last().unwrap();
        assert_eq!(last.severity, Severity::Success);
        assert_eq!(last.message, "Configuration deleted successfully");
    }

    #[tokio::test]
    async fn delete_probe_failure_is_logged_not_notified() {
        let target = connection("1", "conn_dev_1", "Production");
        let gateway = Arc::new(MockGateway::new());
        gateway.push_config_result(Ok(vec![target.clone()]));
        // First probe errors; the poll absorbs it and the second converges
        gateway.push_config_result(Err("read path unavailable"));
        gateway.push_config_result(Ok(vec![]));
        let notifier = Arc::new(RecordingNotifier::new());
        let mut manager = manager(
            Arc::clone(&gateway),
            Arc::clone(&notifier),
            Arc::new(RecordingNavigator::new()),
        );
        manager.load().await.unwrap();

        manager.delete("1").await.unwrap();

        assert!(!notifier.has_severity(Severity::Error));
        assert_eq!(notifier.last().unwrap().severity, Severity::Success);
    }

    #[tokio::test]
    async fn open_edit_snapshots_the_row() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_config_result(Ok(vec![connection("1", "conn_dev_1", "Production")]));
        let notifier = Arc::new(RecordingNotifier::new());
        let mut manager = manager(
            Arc::clone(&gateway),
            notifier,
            Arc::new(RecordingNavigator::new()),
        );
        manager.load().await.unwrap();

        let mut first = manager.open_edit("1").unwrap();
        first.name = "Renamed".to_string();
        // A second session starts from the unmodified row
        let second = manager.open_edit("1").unwrap();
        assert_eq!(second.name, "Production");
        assert_eq!(manager.connections()[0].name, "Production");
    }

    #[tokio::test]
    async fn navigate_to_mappings_rejects_stale_ids() {
        let gateway = Arc::new(MockGateway::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let manager = manager(gateway, Arc::clone(&notifier), Arc::clone(&navigator));

        assert!(manager.navigate_to_mappings("missing").is_err());
        assert!(navigator.targets().is_empty());
        assert_eq!(notifier.last().unwrap().severity, Severity::Error);
    }

    #[tokio::test]
    async fn navigate_to_mappings_targets_the_sync_list() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_config_result(Ok(vec![connection("1", "conn_dev_1", "Production")]));
        let navigator = Arc::new(RecordingNavigator::new());
        let mut manager = manager(
            Arc::clone(&gateway),
            Arc::new(RecordingNotifier::new()),
            Arc::clone(&navigator),
        );
        manager.load().await.unwrap();

        manager.navigate_to_mappings("1").unwrap();
        assert_eq!(
            navigator.targets(),
            vec![NavTarget::SyncList {
                connection_id: Some("1".to_string()),
                refresh: false,
            }]
        );
    }
}
