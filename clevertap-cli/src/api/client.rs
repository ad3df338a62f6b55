//! Sync gateway client
//!
//! All persistence, validation, and metadata deployment live in the remote
//! sync gateway; this module is the only place that talks to it. The
//! [`SyncGateway`] trait is the seam the workflow controllers depend on,
//! so tests can substitute a scripted gateway.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::models::{
    ConnectionConfig, FieldDescriptor, FieldMapping, PicklistOption, SaveConnectionRequest,
    SyncConfiguration, SyncConfigurationRequest, SyncStatus,
};
use super::resilience::{ResilienceConfig, RetryPolicy};
use crate::config::GatewayConfig;

/// Remote operations exposed by the sync gateway
#[async_trait]
pub trait SyncGateway: Send + Sync {
    /// List all stored connection configurations
    async fn get_config(&self) -> Result<Vec<ConnectionConfig>>;

    /// Create or update a connection. Returns the gateway's literal
    /// acknowledgement string ("Success" on the happy path).
    async fn save_config(&self, config: SaveConnectionRequest) -> Result<String>;

    /// Delete a connection by its developer name. Returns the literal
    /// acknowledgement string.
    async fn delete_config(&self, developer_name: &str) -> Result<String>;

    /// List all sync configurations
    async fn get_sync_configurations(&self) -> Result<Vec<SyncConfiguration>>;

    /// Create a sync configuration; returns the newly assigned identifier
    async fn create_sync_configuration(&self, data: SyncConfigurationRequest) -> Result<String>;

    /// Update an existing sync configuration
    async fn update_sync_configuration(
        &self,
        sync_id: &str,
        data: SyncConfigurationRequest,
    ) -> Result<SyncConfiguration>;

    /// Fetch one sync configuration by identifier
    async fn get_sync_configuration_by_id(&self, sync_id: &str) -> Result<SyncConfiguration>;

    /// Delete a sync configuration by identifier
    async fn delete_sync_configuration(&self, sync_id: &str) -> Result<()>;

    /// Set the status of a sync configuration
    async fn update_sync_status(&self, sync_id: &str, status: SyncStatus) -> Result<()>;

    /// Candidate source fields for a Salesforce object
    async fn get_salesforce_fields(&self, object_name: &str) -> Result<Vec<FieldDescriptor>>;

    /// Existing persisted mappings for a sync configuration
    async fn get_existing_mappings(&self, sync_id: &str) -> Result<Vec<FieldMapping>>;

    /// Replace the full mapping set for a sync configuration in one batch
    async fn save_field_mappings(&self, sync_id: &str, mappings: Vec<FieldMapping>) -> Result<()>;

    /// Picklist values declared on a backend object field
    async fn get_picklist_values(
        &self,
        object_name: &str,
        field_name: &str,
    ) -> Result<Vec<PicklistOption>>;
}

/// HTTP implementation of [`SyncGateway`] against the gateway's JSON API
pub struct HttpSyncGateway {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl HttpSyncGateway {
    pub fn new(gateway: &GatewayConfig, resilience: &ResilienceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(gateway.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: gateway.base_url.trim_end_matches('/').to_string(),
            api_key: gateway.api_key.clone(),
            retry: RetryPolicy::new(resilience.retry.clone()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, name: &str, path: &str) -> Result<T> {
        self.retry
            .execute(name, || async move {
                let response = self
                    .apply_auth(self.http.get(self.url(path)))
                    .send()
                    .await
                    .with_context(|| format!("{} request failed", name))?;
                Self::decode(name, response).await
            })
            .await
    }

    async fn send_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        name: &str,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.retry
            .execute(name, || {
                let method = method.clone();
                async move {
                    let response = self
                        .apply_auth(self.http.request(method, self.url(path)))
                        .json(body)
                        .send()
                        .await
                        .with_context(|| format!("{} request failed", name))?;
                    Self::decode(name, response).await
                }
            })
            .await
    }

    async fn delete_json<T: DeserializeOwned>(&self, name: &str, path: &str) -> Result<T> {
        self.retry
            .execute(name, || async move {
                let response = self
                    .apply_auth(self.http.delete(self.url(path)))
                    .send()
                    .await
                    .with_context(|| format!("{} request failed", name))?;
                Self::decode(name, response).await
            })
            .await
    }

    /// Turn a gateway response into a typed value, surfacing the backend's
    /// own message on application errors
    async fn decode<T: DeserializeOwned>(name: &str, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            debug!("{} -> {}", name, status);
            return response
                .json::<T>()
                .await
                .with_context(|| format!("{} returned an unexpected payload", name));
        }

        let detail = response.text().await.unwrap_or_default();
        let message = backend_message(&detail).unwrap_or_else(|| detail.trim().to_string());
        if message.is_empty() {
            anyhow::bail!("{} failed with status {}", name, status);
        }
        if status == StatusCode::NOT_FOUND {
            anyhow::bail!("{}", message);
        }
        anyhow::bail!("{} ({})", message, status)
    }
}

/// Extract the `message` field from a gateway error body, if present
fn backend_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
}

#[async_trait]
impl SyncGateway for HttpSyncGateway {
    async fn get_config(&self) -> Result<Vec<ConnectionConfig>> {
        self.get_json("get_config", "connections").await
    }

    async fn save_config(&self, config: SaveConnectionRequest) -> Result<String> {
        self.send_json("save_config", reqwest::Method::POST, "connections", &config)
            .await
    }

    async fn delete_config(&self, developer_name: &str) -> Result<String> {
        let path = format!("connections/{}", urlencoding::encode(developer_name));
        self.delete_json("delete_config", &path).await
    }

    async fn get_sync_configurations(&self) -> Result<Vec<SyncConfiguration>> {
        self.get_json("get_sync_configurations", "sync-configurations")
            .await
    }

    async fn create_sync_configuration(&self, data: SyncConfigurationRequest) -> Result<String> {
        self.send_json(
            "create_sync_configuration",
            reqwest::Method::POST,
            "sync-configurations",
            &data,
        )
        .await
    }

    async fn update_sync_configuration(
        &self,
        sync_id: &str,
        data: SyncConfigurationRequest,
    ) -> Result<SyncConfiguration> {
        let path = format!("sync-configurations/{}", urlencoding::encode(sync_id));
        self.send_json(
            "update_sync_configuration",
            reqwest::Method::PUT,
            &path,
            &data,
        )
        .await
    }

    async fn get_sync_configuration_by_id(&self, sync_id: &str) -> Result<SyncConfiguration> {
        let path = format!("sync-configurations/{}", urlencoding::encode(sync_id));
        self.get_json("get_sync_configuration_by_id", &path).await
    }

    async fn delete_sync_configuration(&self, sync_id: &str) -> Result<()> {
        let path = format!("sync-configurations/{}", urlencoding::encode(sync_id));
        self.delete_json("delete_sync_configuration", &path).await
    }

    async fn update_sync_status(&self, sync_id: &str, status: SyncStatus) -> Result<()> {
        #[derive(Serialize)]
        struct StatusUpdate {
            status: SyncStatus,
        }
        let path = format!("sync-configurations/{}/status", urlencoding::encode(sync_id));
        self.send_json(
            "update_sync_status",
            reqwest::Method::POST,
            &path,
            &StatusUpdate { status },
        )
        .await
    }

    async fn get_salesforce_fields(&self, object_name: &str) -> Result<Vec<FieldDescriptor>> {
        let path = format!("salesforce-fields/{}", urlencoding::encode(object_name));
        self.get_json("get_salesforce_fields", &path).await
    }

    async fn get_existing_mappings(&self, sync_id: &str) -> Result<Vec<FieldMapping>> {
        let path = format!("sync-configurations/{}/mappings", urlencoding::encode(sync_id));
        self.get_json("get_existing_mappings", &path).await
    }

    async fn save_field_mappings(&self, sync_id: &str, mappings: Vec<FieldMapping>) -> Result<()> {
        let path = format!("sync-configurations/{}/mappings", urlencoding::encode(sync_id));
        self.send_json("save_field_mappings", reqwest::Method::PUT, &path, &mappings)
            .await
    }

    async fn get_picklist_values(
        &self,
        object_name: &str,
        field_name: &str,
    ) -> Result<Vec<PicklistOption>> {
        let path = format!(
            "picklists/{}/{}",
            urlencoding::encode(object_name),
            urlencoding::encode(field_name)
        );
        self.get_json("get_picklist_values", &path).await
    }
}
