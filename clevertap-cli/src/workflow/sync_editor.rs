//! Sync configuration editor
//!
//! Linear two-phase wizard: basic attributes first, then field mapping.
//! The phase is an explicit state machine with a single allowed forward
//! transition that carries the created or updated identifier; leaving the
//! wizard exits it entirely rather than stepping back.

use std::sync::Arc;

use anyhow::Result;
use log::error;

use crate::api::models::{
    ClevertapEntity, SalesforceEntity, SyncConfigurationRequest, SyncStatus, SyncType,
};
use crate::api::SyncGateway;

use super::nav::{EditorMode, NavTarget, Navigator};
use super::notify::Notifier;

/// Wizard phase. `FieldMapping` is only reachable through a successful
/// submit, which supplies the identifier the mapping editor needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardStep {
    BasicConfig,
    FieldMapping { sync_id: String },
}

/// Form buffer for the basic attributes phase
#[derive(Debug, Clone, PartialEq)]
pub struct SyncDraft {
    pub name: String,
    pub sync_type: Option<SyncType>,
    pub salesforce_entity: Option<SalesforceEntity>,
    pub clevertap_entity: Option<ClevertapEntity>,
    pub status: SyncStatus,
}

impl Default for SyncDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            sync_type: None,
            salesforce_entity: None,
            clevertap_entity: None,
            // New configurations start out active
            status: SyncStatus::Active,
        }
    }
}

impl SyncDraft {
    /// Check that all four descriptive fields are present and produce the
    /// typed request
    fn validated(&self, status: SyncStatus) -> Option<SyncConfigurationRequest> {
        if self.name.trim().is_empty() {
            return None;
        }
        Some(SyncConfigurationRequest {
            name: self.name.trim().to_string(),
            sync_type: self.sync_type?,
            salesforce_entity: self.salesforce_entity?,
            clevertap_entity: self.clevertap_entity?,
            status,
        })
    }
}

/// Controller for the sync configuration wizard
pub struct SyncConfigurationEditor {
    gateway: Arc<dyn SyncGateway>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    mode: EditorMode,
    step: WizardStep,
    draft: SyncDraft,
    loading: bool,
}

impl SyncConfigurationEditor {
    pub fn new(
        gateway: Arc<dyn SyncGateway>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        mode: EditorMode,
    ) -> Self {
        Self {
            gateway,
            notifier,
            navigator,
            mode,
            step: WizardStep::BasicConfig,
            draft: SyncDraft::default(),
            loading: false,
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn step(&self) -> &WizardStep {
        &self.step
    }

    pub fn draft(&self) -> &SyncDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut SyncDraft {
        &mut self.draft
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// In edit mode, fetch the existing record and populate the draft.
    /// A record without a status defaults to Inactive.
    pub async fn load_existing(&mut self) -> Result<()> {
        let EditorMode::Edit { record_id } = self.mode.clone() else {
            return Ok(());
        };
        self.loading = true;
        let result = self.gateway.get_sync_configuration_by_id(&record_id).await;
        self.loading = false;
        match result {
            Ok(record) => {
                self.draft = SyncDraft {
                    name: record.name,
                    sync_type: Some(record.sync_type),
                    salesforce_entity: Some(record.salesforce_entity),
                    clevertap_entity: Some(record.clevertap_entity),
                    status: record.status.unwrap_or(SyncStatus::Inactive),
                };
                Ok(())
            }
            Err(cause) => {
                error!("Error loading sync configuration: {:#}", cause);
                self.notifier.error(
                    "Error",
                    &format!("Error loading sync configuration: {}", cause),
                );
                Err(cause)
            }
        }
    }

    /// Validate the draft, persist it, and take the forward transition
    /// into the field mapping phase. Returns the identifier the mapping
    /// phase was handed.
    pub async fn submit(&mut self) -> Result<String> {
        if let WizardStep::FieldMapping { .. } = self.step {
            anyhow::bail!("Basic attributes were already submitted");
        }
        if self.loading {
            anyhow::bail!("Submission already in progress");
        }
        self.loading = true;
        let result = self.submit_inner().await;
        self.loading = false;
        result
    }

    async fn submit_inner(&mut self) -> Result<String> {
        // New configurations are always submitted active; edits keep the
        // status the record was loaded with.
        let status = match self.mode {
            EditorMode::New => SyncStatus::Active,
            EditorMode::Edit { .. } => self.draft.status,
        };
        let Some(request) = self.draft.validated(status) else {
            self.notifier
                .error("Error", "Please fill in all required fields");
            anyhow::bail!("Sync configuration draft is incomplete");
        };

        let outcome = match self.mode.clone() {
            EditorMode::New => self
                .gateway
                .create_sync_configuration(request)
                .await
                .map(|sync_id| (sync_id, "created")),
            EditorMode::Edit { record_id } => self
                .gateway
                .update_sync_configuration(&record_id, request)
                .await
                .map(|_| (record_id, "updated")),
        };

        let (sync_id, done) = match outcome {
            Ok(value) => value,
            Err(cause) => {
                let action = match self.mode {
                    EditorMode::New => "create",
                    EditorMode::Edit { .. } => "update",
                };
                error!("Failed to {} sync configuration: {:#}", action, cause);
                self.notifier.error(
                    "Error",
                    &format!("Failed to {} sync configuration: {}", action, cause),
                );
                return Err(cause);
            }
        };

        self.notifier.success(
            "Success",
            &format!("Sync configuration {} successfully", done),
        );
        self.step = WizardStep::FieldMapping {
            sync_id: sync_id.clone(),
        };
        Ok(sync_id)
    }

    /// Field mapping phase finished; return to the list and force its
    /// refresh
    pub fn complete(&self) {
        self.navigator.navigate(NavTarget::SyncList {
            connection_id: None,
            refresh: true,
        });
    }

    /// Leave the wizard from either phase
    pub fn cancel(&self) {
        self.navigator.navigate(NavTarget::SyncList {
            connection_id: None,
            refresh: true,
        });
    }
}
