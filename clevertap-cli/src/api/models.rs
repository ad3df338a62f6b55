//! Typed models for the CleverTap sync gateway
//!
//! Every payload that crosses the gateway boundary is a tagged structure
//! validated by serde on the way in and out. Nothing is assembled as an
//! ad-hoc JSON blob.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Literal acknowledgement the gateway returns for connection writes
pub const SUCCESS_ACK: &str = "Success";

/// CleverTap data-center region for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "IN")]
    India,
    #[serde(rename = "US")]
    UnitedStates,
    #[serde(rename = "EU")]
    Europe,
}

impl Region {
    /// All selectable regions, in display order
    pub const ALL: [Region; 3] = [Region::India, Region::UnitedStates, Region::Europe];

    /// Human-readable label for pickers
    pub fn label(&self) -> &'static str {
        match self {
            Region::India => "India",
            Region::UnitedStates => "United States",
            Region::Europe => "Europe",
        }
    }

    /// Wire code (IN/US/EU)
    pub fn code(&self) -> &'static str {
        match self {
            Region::India => "IN",
            Region::UnitedStates => "US",
            Region::Europe => "EU",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IN" => Ok(Region::India),
            "US" => Ok(Region::UnitedStates),
            "EU" => Ok(Region::Europe),
            other => anyhow::bail!("unknown region '{}', expected IN, US or EU", other),
        }
    }
}

/// One stored CleverTap account binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Backend-assigned opaque identifier, stable across edits
    pub id: String,
    /// Immutable identifier the backend keys deletes on. May be empty on
    /// records created outside this tool; such records cannot be deleted
    /// through this workflow.
    #[serde(default)]
    pub developer_name: String,
    /// Display label
    pub name: String,
    pub region: Region,
    pub account_id: String,
    pub passcode: String,
}

/// Request body for `save_config` (create and update share one shape)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveConnectionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_name: Option<String>,
    pub name: String,
    pub region: Region,
    pub account_id: String,
    pub passcode: String,
}

/// Direction of a configured sync job. The gateway currently accepts a
/// single value; the enum keeps the wire format closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncType {
    #[serde(rename = "salesforce_to_clevertap")]
    SalesforceToClevertap,
}

impl SyncType {
    pub fn label(&self) -> &'static str {
        match self {
            SyncType::SalesforceToClevertap => "Salesforce to CleverTap",
        }
    }
}

impl fmt::Display for SyncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncType::SalesforceToClevertap => "salesforce_to_clevertap",
        })
    }
}

impl FromStr for SyncType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "salesforce_to_clevertap" => Ok(SyncType::SalesforceToClevertap),
            other => anyhow::bail!("unknown sync type '{}'", other),
        }
    }
}

/// Salesforce source object a sync job reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalesforceEntity {
    Contact,
    Lead,
    Account,
}

impl SalesforceEntity {
    pub const ALL: [SalesforceEntity; 3] = [
        SalesforceEntity::Contact,
        SalesforceEntity::Lead,
        SalesforceEntity::Account,
    ];

    /// Object API name as the gateway expects it
    pub fn object_name(&self) -> &'static str {
        match self {
            SalesforceEntity::Contact => "Contact",
            SalesforceEntity::Lead => "Lead",
            SalesforceEntity::Account => "Account",
        }
    }
}

impl fmt::Display for SalesforceEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.object_name())
    }
}

impl FromStr for SalesforceEntity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "contact" => Ok(SalesforceEntity::Contact),
            "lead" => Ok(SalesforceEntity::Lead),
            "account" => Ok(SalesforceEntity::Account),
            other => anyhow::bail!(
                "unknown Salesforce entity '{}', expected Contact, Lead or Account",
                other
            ),
        }
    }
}

/// CleverTap destination a sync job writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClevertapEntity {
    Profile,
    Event,
}

impl ClevertapEntity {
    pub const ALL: [ClevertapEntity; 2] = [ClevertapEntity::Profile, ClevertapEntity::Event];

    pub fn label(&self) -> &'static str {
        match self {
            ClevertapEntity::Profile => "Profile",
            ClevertapEntity::Event => "Event",
        }
    }
}

impl fmt::Display for ClevertapEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClevertapEntity::Profile => "profile",
            ClevertapEntity::Event => "event",
        })
    }
}

impl FromStr for ClevertapEntity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "profile" => Ok(ClevertapEntity::Profile),
            "event" => Ok(ClevertapEntity::Event),
            other => anyhow::bail!(
                "unknown CleverTap entity '{}', expected profile or event",
                other
            ),
        }
    }
}

/// Lifecycle status of a sync configuration.
///
/// Active and Inactive toggle through explicit user actions. Error is set
/// by backend-side validation only; nothing in this tool transitions a row
/// into or out of it. Unknown absorbs any status value the backend adds
/// later so a list load never fails on one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    Active,
    Inactive,
    Error,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncStatus::Active => "Active",
            SyncStatus::Inactive => "Inactive",
            SyncStatus::Error => "Error",
            SyncStatus::Unknown => "",
        })
    }
}

/// One configured sync job as the gateway returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfiguration {
    pub id: String,
    pub name: String,
    pub sync_type: SyncType,
    pub salesforce_entity: SalesforceEntity,
    pub clevertap_entity: ClevertapEntity,
    /// Absent on records the backend has not yet derived a status for
    #[serde(default)]
    pub status: Option<SyncStatus>,
}

/// Request body for creating or updating a sync configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfigurationRequest {
    pub name: String,
    pub sync_type: SyncType,
    pub salesforce_entity: SalesforceEntity,
    pub clevertap_entity: ClevertapEntity,
    pub status: SyncStatus,
}

/// Declared data type of a mapped field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Text,
    Number,
    Date,
    Boolean,
}

impl DataType {
    pub const ALL: [DataType; 4] = [
        DataType::Text,
        DataType::Number,
        DataType::Date,
        DataType::Boolean,
    ];
}

impl Default for DataType {
    fn default() -> Self {
        DataType::Text
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataType::Text => "Text",
            DataType::Number => "Number",
            DataType::Date => "Date",
            DataType::Boolean => "Boolean",
        })
    }
}

impl FromStr for DataType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(DataType::Text),
            "number" => Ok(DataType::Number),
            "date" => Ok(DataType::Date),
            "boolean" => Ok(DataType::Boolean),
            other => anyhow::bail!(
                "unknown data type '{}', expected Text, Number, Date or Boolean",
                other
            ),
        }
    }
}

/// One source-to-destination field correspondence, as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Destination key on the CleverTap side
    pub clevertap_field: String,
    /// Source field API name on the Salesforce side
    pub salesforce_field: String,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub is_mandatory: bool,
}

/// The fixed destination key every sync configuration must map
pub const MANDATORY_FIELD: &str = "customer_id";

impl FieldMapping {
    /// The mandatory `customer_id` mapping for a given source field
    pub fn mandatory(salesforce_field: impl Into<String>) -> Self {
        Self {
            clevertap_field: MANDATORY_FIELD.to_string(),
            salesforce_field: salesforce_field.into(),
            data_type: DataType::Text,
            is_mandatory: true,
        }
    }
}

/// Candidate source field offered by the mapping editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub label: String,
    pub value: String,
}

/// One selectable option from a backend picklist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PicklistOption {
    pub label: String,
    pub value: String,
}
