//! CleverTap Sync Gateway API Module
//!
//! Typed client for the remote sync gateway that owns persistence,
//! validation, and metadata deployment for Salesforce to CleverTap sync.
//! Exposes the gateway's named operations behind the [`SyncGateway`] trait
//! with retry and read-after-write convergence support.

pub mod client;
pub mod models;
pub mod resilience;

pub use client::{HttpSyncGateway, SyncGateway};
pub use models::{
    ClevertapEntity, ConnectionConfig, DataType, FieldDescriptor, FieldMapping, MANDATORY_FIELD,
    PicklistOption, Region, SUCCESS_ACK, SalesforceEntity, SaveConnectionRequest,
    SyncConfiguration, SyncConfigurationRequest, SyncStatus, SyncType,
};
pub use resilience::{Convergence, ConvergenceConfig, ResilienceConfig, RetryConfig, RetryPolicy};
