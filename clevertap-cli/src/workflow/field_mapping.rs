//! Field mapping editor
//!
//! Builds the mapping set for one sync configuration: the mandatory
//! `customer_id` mapping plus any number of additional rows. Rows live
//! client-side under synthetic identifiers until the whole set is
//! persisted as a single batch.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use log::{debug, error};
use uuid::Uuid;

use crate::api::models::{
    DataType, FieldDescriptor, FieldMapping, MANDATORY_FIELD, PicklistOption, SalesforceEntity,
};
use crate::api::SyncGateway;

use super::nav::{NavTarget, Navigator};
use super::notify::Notifier;

/// Backend object and field the data-type picklist is declared on
const DATA_TYPE_OBJECT: &str = "CleverTap_Mapping";
const DATA_TYPE_FIELD: &str = "Data_Type";

/// One editable mapping row. `row_id` exists for list management only and
/// is never sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRow {
    pub row_id: Uuid,
    pub clevertap_field: String,
    pub salesforce_field: String,
    pub data_type: DataType,
}

impl MappingRow {
    fn empty() -> Self {
        Self {
            row_id: Uuid::new_v4(),
            clevertap_field: String::new(),
            salesforce_field: String::new(),
            data_type: DataType::Text,
        }
    }

    fn from_mapping(mapping: &FieldMapping) -> Self {
        Self {
            row_id: Uuid::new_v4(),
            clevertap_field: mapping.clevertap_field.clone(),
            salesforce_field: mapping.salesforce_field.clone(),
            data_type: mapping.data_type,
        }
    }
}

/// Controller for the field mapping phase of the sync wizard
pub struct FieldMappingEditor {
    gateway: Arc<dyn SyncGateway>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    sync_id: String,
    salesforce_entity: SalesforceEntity,
    salesforce_fields: Vec<FieldDescriptor>,
    data_type_options: Vec<PicklistOption>,
    mandatory_source: String,
    rows: Vec<MappingRow>,
    loading: bool,
}

impl FieldMappingEditor {
    pub fn new(
        gateway: Arc<dyn SyncGateway>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        sync_id: String,
        salesforce_entity: SalesforceEntity,
    ) -> Self {
        Self {
            gateway,
            notifier,
            navigator,
            sync_id,
            salesforce_entity,
            salesforce_fields: Vec::new(),
            data_type_options: Vec::new(),
            mandatory_source: String::new(),
            rows: Vec::new(),
            loading: false,
        }
    }

    pub fn sync_id(&self) -> &str {
        &self.sync_id
    }

    pub fn salesforce_fields(&self) -> &[FieldDescriptor] {
        &self.salesforce_fields
    }

    pub fn data_type_options(&self) -> &[PicklistOption] {
        &self.data_type_options
    }

    pub fn mandatory_source(&self) -> &str {
        &self.mandatory_source
    }

    pub fn set_mandatory_source(&mut self, field: &str) {
        self.mandatory_source = field.to_string();
    }

    pub fn rows(&self) -> &[MappingRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [MappingRow] {
        &mut self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Load candidate source fields, existing mappings, and data-type
    /// options. The three loads are independent and run concurrently;
    /// each failure is notified in its own scope and none aborts the
    /// others.
    pub async fn initialize(&mut self) {
        self.loading = true;
        let (fields, existing, picklist) = futures::join!(
            self.gateway
                .get_salesforce_fields(self.salesforce_entity.object_name()),
            self.gateway.get_existing_mappings(&self.sync_id),
            self.gateway
                .get_picklist_values(DATA_TYPE_OBJECT, DATA_TYPE_FIELD),
        );
        self.loading = false;

        match fields {
            Ok(fields) => self.salesforce_fields = fields,
            Err(cause) => {
                error!("Failed to load Salesforce fields: {:#}", cause);
                self.notifier.error(
                    "Error",
                    &format!("Failed to load Salesforce fields: {}", cause),
                );
            }
        }

        match existing {
            Ok(mappings) => self.adopt_existing(mappings),
            Err(cause) => {
                error!("Failed to load existing mappings: {:#}", cause);
                self.notifier.error(
                    "Error",
                    &format!("Failed to load existing mappings: {}", cause),
                );
            }
        }

        match picklist {
            Ok(options) if !options.is_empty() => self.data_type_options = options,
            Ok(_) | Err(_) => {
                debug!("Using built-in data type options");
                self.data_type_options = DataType::ALL
                    .iter()
                    .map(|dt| PicklistOption {
                        label: dt.to_string(),
                        value: dt.to_string(),
                    })
                    .collect();
            }
        }
    }

    /// Split persisted mappings into the mandatory row and additional
    /// rows, each under a fresh local identifier
    fn adopt_existing(&mut self, mappings: Vec<FieldMapping>) {
        if let Some(mandatory) = mappings.iter().find(|m| m.is_mandatory) {
            self.mandatory_source = mandatory.salesforce_field.clone();
        }
        self.rows = mappings
            .iter()
            .filter(|m| !m.is_mandatory)
            .map(MappingRow::from_mapping)
            .collect();
    }

    /// Append an empty row; returns its index
    pub fn add_row(&mut self) -> usize {
        self.rows.push(MappingRow::empty());
        self.rows.len() - 1
    }

    /// Remove the row at `index`; out-of-range indexes are ignored
    pub fn remove_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
    }

    /// Validate in order: mandatory mapping present, fields resolvable,
    /// destination keys unique (case-insensitive)
    fn validate(&self) -> Result<()> {
        if self.mandatory_source.trim().is_empty() {
            self.notifier
                .error("Error", "Please map the mandatory customer_id field");
            anyhow::bail!("Mandatory {} field is not mapped", MANDATORY_FIELD);
        }

        if !self.salesforce_fields.is_empty() {
            let known: HashSet<&str> = self
                .salesforce_fields
                .iter()
                .map(|f| f.value.as_str())
                .collect();
            let mut unknown: Vec<&str> = Vec::new();
            if !known.contains(self.mandatory_source.as_str()) {
                unknown.push(self.mandatory_source.as_str());
            }
            for row in &self.rows {
                if !row.salesforce_field.is_empty() && !known.contains(row.salesforce_field.as_str())
                {
                    unknown.push(row.salesforce_field.as_str());
                }
            }
            if !unknown.is_empty() {
                self.notifier.error(
                    "Error",
                    &format!("Unknown Salesforce field(s): {}", unknown.join(", ")),
                );
                anyhow::bail!("Mappings reference unknown Salesforce fields");
            }
        }

        let mut seen = HashSet::new();
        for row in &self.rows {
            if row.clevertap_field.is_empty() {
                continue;
            }
            if !seen.insert(row.clevertap_field.to_lowercase()) {
                self.notifier
                    .error("Error", "Duplicate CleverTap field names are not allowed");
                anyhow::bail!("Duplicate destination field: {}", row.clevertap_field);
            }
        }

        Ok(())
    }

    /// Assemble the batch: the mandatory mapping first, then every
    /// additional row with both sides populated. One-sided rows are
    /// silently dropped.
    fn batch(&self) -> Vec<FieldMapping> {
        let mut mappings = vec![FieldMapping::mandatory(self.mandatory_source.clone())];
        mappings.extend(
            self.rows
                .iter()
                .filter(|row| !row.clevertap_field.is_empty() && !row.salesforce_field.is_empty())
                .map(|row| FieldMapping {
                    clevertap_field: row.clevertap_field.clone(),
                    salesforce_field: row.salesforce_field.clone(),
                    data_type: row.data_type,
                    is_mandatory: false,
                }),
        );
        mappings
    }

    /// Validate and persist the full mapping set as one batch, then
    /// return to the sync list with a forced refresh
    pub async fn save(&mut self) -> Result<()> {
        if self.loading {
            anyhow::bail!("Save already in progress");
        }
        self.validate()?;

        self.loading = true;
        let result = self
            .gateway
            .save_field_mappings(&self.sync_id, self.batch())
            .await;
        self.loading = false;

        match result {
            Ok(()) => {
                self.notifier
                    .success("Success", "Field mappings saved successfully");
                self.navigator.navigate(NavTarget::SyncList {
                    connection_id: None,
                    refresh: true,
                });
                Ok(())
            }
            Err(cause) => {
                error!("Failed to save mappings: {:#}", cause);
                self.notifier
                    .error("Error", &format!("Failed to save mappings: {}", cause));
                Err(cause)
            }
        }
    }

    /// Leave the mapping phase without saving
    pub fn cancel(&self) {
        self.navigator.navigate(NavTarget::SyncList {
            connection_id: None,
            refresh: true,
        });
    }
}
