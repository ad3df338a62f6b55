//! Test doubles for the workflow controllers
//!
//! A scripted [`MockGateway`] behind the [`SyncGateway`] seam plus
//! recording implementations of the notifier and navigator seams.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::api::models::{
    ConnectionConfig, FieldDescriptor, FieldMapping, PicklistOption, SUCCESS_ACK,
    SaveConnectionRequest, SyncConfiguration, SyncConfigurationRequest, SyncStatus,
};
use crate::api::SyncGateway;

use super::nav::{NavTarget, Navigator};
use super::notify::{Notification, Notifier, Severity};

type Scripted<T> = Mutex<VecDeque<Result<T, String>>>;

/// Scripted gateway. Per-operation response queues are consumed in order;
/// when a queue is empty the default value for that operation is served.
/// Every call is appended to `calls` for interaction assertions.
pub struct MockGateway {
    pub calls: Mutex<Vec<String>>,

    pub config_results: Scripted<Vec<ConnectionConfig>>,
    pub default_config: Mutex<Vec<ConnectionConfig>>,
    pub saved_connections: Mutex<Vec<SaveConnectionRequest>>,
    pub save_config_ack: Mutex<Option<String>>,
    pub delete_config_ack: Mutex<Option<String>>,
    pub deleted_developer_names: Mutex<Vec<String>>,

    pub sync_results: Scripted<Vec<SyncConfiguration>>,
    pub default_syncs: Mutex<Vec<SyncConfiguration>>,
    pub create_sync_id: Mutex<Option<Result<String, String>>>,
    pub created_syncs: Mutex<Vec<SyncConfigurationRequest>>,
    pub updated_syncs: Mutex<Vec<(String, SyncConfigurationRequest)>>,
    pub sync_by_id: Mutex<HashMap<String, SyncConfiguration>>,
    pub deleted_sync_ids: Mutex<Vec<String>>,
    pub fail_delete_sync: Mutex<Option<String>>,
    pub status_updates: Mutex<Vec<(String, SyncStatus)>>,
    pub fail_update_status: Mutex<Option<String>>,

    pub salesforce_fields: Mutex<Result<Vec<FieldDescriptor>, String>>,
    pub existing_mappings: Mutex<Result<Vec<FieldMapping>, String>>,
    pub saved_mappings: Mutex<Vec<(String, Vec<FieldMapping>)>>,
    pub fail_save_mappings: Mutex<Option<String>>,
    pub picklist_values: Mutex<Result<Vec<PicklistOption>, String>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            config_results: Mutex::new(VecDeque::new()),
            default_config: Mutex::new(Vec::new()),
            saved_connections: Mutex::new(Vec::new()),
            save_config_ack: Mutex::new(None),
            delete_config_ack: Mutex::new(None),
            deleted_developer_names: Mutex::new(Vec::new()),
            sync_results: Mutex::new(VecDeque::new()),
            default_syncs: Mutex::new(Vec::new()),
            create_sync_id: Mutex::new(None),
            created_syncs: Mutex::new(Vec::new()),
            updated_syncs: Mutex::new(Vec::new()),
            sync_by_id: Mutex::new(HashMap::new()),
            deleted_sync_ids: Mutex::new(Vec::new()),
            fail_delete_sync: Mutex::new(None),
            status_updates: Mutex::new(Vec::new()),
            fail_update_status: Mutex::new(None),
            salesforce_fields: Mutex::new(Ok(Vec::new())),
            existing_mappings: Mutex::new(Ok(Vec::new())),
            saved_mappings: Mutex::new(Vec::new()),
            fail_save_mappings: Mutex::new(None),
            picklist_values: Mutex::new(Ok(Vec::new())),
        }
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    /// Number of recorded calls to the named operation
    pub fn call_count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == name).count()
    }

    /// Queue a scripted `get_config` response
    pub fn push_config_result(&self, result: Result<Vec<ConnectionConfig>, &str>) {
        self.config_results
            .lock()
            .unwrap()
            .push_back(result.map_err(|e| e.to_string()));
    }

    /// Queue a scripted `get_sync_configurations` response
    pub fn push_sync_result(&self, result: Result<Vec<SyncConfiguration>, &str>) {
        self.sync_results
            .lock()
            .unwrap()
            .push_back(result.map_err(|e| e.to_string()));
    }
}

fn serve<T: Clone>(queue: &Scripted<T>, default: &Mutex<T>) -> Result<T> {
    match queue.lock().unwrap().pop_front() {
        Some(Ok(value)) => Ok(value),
        Some(Err(message)) => Err(anyhow!(message)),
        None => Ok(default.lock().unwrap().clone()),
    }
}

#[async_trait]
impl SyncGateway for MockGateway {
    async fn get_config(&self) -> Result<Vec<ConnectionConfig>> {
        self.record("get_config");
        serve(&self.config_results, &self.default_config)
    }

    async fn save_config(&self, config: SaveConnectionRequest) -> Result<String> {
        self.record("save_config");
        self.saved_connections.lock().unwrap().push(config);
        Ok(self
            .save_config_ack
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| SUCCESS_ACK.to_string()))
    }

    async fn delete_config(&self, developer_name: &str) -> Result<String> {
        self.record("delete_config");
        self.deleted_developer_names
            .lock()
            .unwrap()
            .push(developer_name.to_string());
        Ok(self
            .delete_config_ack
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| SUCCESS_ACK.to_string()))
    }

    async fn get_sync_configurations(&self) -> Result<Vec<SyncConfiguration>> {
        self.record("get_sync_configurations");
        serve(&self.sync_results, &self.default_syncs)
    }

    async fn create_sync_configuration(&self, data: SyncConfigurationRequest) -> Result<String> {
        self.record("create_sync_configuration");
        self.created_syncs.lock().unwrap().push(data);
        match self.create_sync_id.lock().unwrap().clone() {
            Some(Ok(id)) => Ok(id),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok("SYNC1".to_string()),
        }
    }

    async fn update_sync_configuration(
        &self,
        sync_id: &str,
        data: SyncConfigurationRequest,
    ) -> Result<SyncConfiguration> {
        self.record("update_sync_configuration");
        self.updated_syncs
            .lock()
            .unwrap()
            .push((sync_id.to_string(), data.clone()));
        Ok(SyncConfiguration {
            id: sync_id.to_string(),
            name: data.name,
            sync_type: data.sync_type,
            salesforce_entity: data.salesforce_entity,
            clevertap_entity: data.clevertap_entity,
            status: Some(data.status),
        })
    }

    async fn get_sync_configuration_by_id(&self, sync_id: &str) -> Result<SyncConfiguration> {
        self.record("get_sync_configuration_by_id");
        self.sync_by_id
            .lock()
            .unwrap()
            .get(sync_id)
            .cloned()
            .ok_or_else(|| anyhow!("No sync configuration with id {}", sync_id))
    }

    async fn delete_sync_configuration(&self, sync_id: &str) -> Result<()> {
        self.record("delete_sync_configuration");
        if let Some(message) = self.fail_delete_sync.lock().unwrap().clone() {
            return Err(anyhow!(message));
        }
        self.deleted_sync_ids.lock().unwrap().push(sync_id.to_string());
        Ok(())
    }

    async fn update_sync_status(&self, sync_id: &str, status: SyncStatus) -> Result<()> {
        self.record("update_sync_status");
        if let Some(message) = self.fail_update_status.lock().unwrap().clone() {
            return Err(anyhow!(message));
        }
        self.status_updates
            .lock()
            .unwrap()
            .push((sync_id.to_string(), status));
        Ok(())
    }

    async fn get_salesforce_fields(&self, _object_name: &str) -> Result<Vec<FieldDescriptor>> {
        self.record("get_salesforce_fields");
        self.salesforce_fields
            .lock()
            .unwrap()
            .clone()
            .map_err(|message| anyhow!(message))
    }

    async fn get_existing_mappings(&self, _sync_id: &str) -> Result<Vec<FieldMapping>> {
        self.record("get_existing_mappings");
        self.existing_mappings
            .lock()
            .unwrap()
            .clone()
            .map_err(|message| anyhow!(message))
    }

    async fn save_field_mappings(&self, sync_id: &str, mappings: Vec<FieldMapping>) -> Result<()> {
        self.record("save_field_mappings");
        if let Some(message) = self.fail_save_mappings.lock().unwrap().clone() {
            return Err(anyhow!(message));
        }
        self.saved_mappings
            .lock()
            .unwrap()
            .push((sync_id.to_string(), mappings));
        Ok(())
    }

    async fn get_picklist_values(
        &self,
        _object_name: &str,
        _field_name: &str,
    ) -> Result<Vec<PicklistOption>> {
        self.record("get_picklist_values");
        self.picklist_values
            .lock()
            .unwrap()
            .clone()
            .map_err(|message| anyhow!(message))
    }
}

/// Notifier that records every notification
#[derive(Default)]
pub struct RecordingNotifier {
    pub notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn severities(&self) -> Vec<Severity> {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.severity)
            .collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn has_severity(&self, severity: Severity) -> bool {
        self.severities().contains(&severity)
    }

    pub fn last(&self) -> Option<Notification> {
        self.notifications.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

/// Navigator that records every requested target
#[derive(Default)]
pub struct RecordingNavigator {
    pub targets: Mutex<Vec<NavTarget>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targets(&self) -> Vec<NavTarget> {
        self.targets.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: NavTarget) {
        self.targets.lock().unwrap().push(target);
    }
}

/// A connection row with sensible defaults for tests
pub fn connection(id: &str, developer_name: &str, name: &str) -> ConnectionConfig {
    ConnectionConfig {
        id: id.to_string(),
        developer_name: developer_name.to_string(),
        name: name.to_string(),
        region: crate::api::models::Region::India,
        account_id: format!("acct-{}", id),
        passcode: "secret".to_string(),
    }
}

/// A sync configuration row with sensible defaults for tests
pub fn sync_configuration(id: &str, name: &str, status: Option<SyncStatus>) -> SyncConfiguration {
    SyncConfiguration {
        id: id.to_string(),
        name: name.to_string(),
        sync_type: crate::api::models::SyncType::SalesforceToClevertap,
        salesforce_entity: crate::api::models::SalesforceEntity::Contact,
        clevertap_entity: crate::api::models::ClevertapEntity::Profile,
        status,
    }
}
