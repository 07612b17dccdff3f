//! Remote client trait for the HDInsight management API
//!
//! The orchestrator in `provider.rs` only talks to this trait. Polling of
//! long-running operations happens behind it: every `*_then_poll` method
//! returns once the remote operation reached a terminal state.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::cluster_id::ClusterId;
use crate::models::{
    Autoscale, Cluster, ClusterCreateParametersExtended, Configurations, MonitoringRequest,
    MonitoringStatus, UpdateGatewaySettingsParameters,
};

/// Errors reported by a remote client
#[derive(Debug, Error)]
pub enum ClientError {
    /// The resource does not exist (HTTP 404)
    #[error("resource was not found")]
    NotFound,

    /// The API answered with an unexpected status
    #[error("unexpected status {status}: {code}: {message}")]
    Status {
        status: u16,
        code: String,
        message: String,
    },

    /// A long-running operation reached a failed or cancelled state
    #[error("long-running operation finished with status {status}: {message}")]
    OperationFailed { status: String, message: String },

    /// The long-running operation did not reach a terminal state in time
    #[error("long-running operation did not complete after {attempts} polls")]
    PollingExhausted { attempts: u32 },

    /// Connection, TLS or other transport failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded
    #[error("decoding response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound)
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// The remote collaborator the cluster resource is built on
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Fetch a cluster. A missing cluster is `ClientError::NotFound`.
    async fn get(&self, id: &ClusterId) -> ClientResult<Cluster>;

    /// Create a cluster and wait until provisioning finished
    async fn create_then_poll(
        &self,
        id: &ClusterId,
        params: &ClusterCreateParametersExtended,
    ) -> ClientResult<()>;

    /// Replace the cluster tags
    async fn update_tags(&self, id: &ClusterId, tags: &BTreeMap<String, String>)
    -> ClientResult<()>;

    /// Resize the worker role and wait until done
    async fn resize_then_poll(&self, id: &ClusterId, target_instance_count: i64)
    -> ClientResult<()>;

    /// Replace the worker-role autoscale configuration; `None` disables it
    async fn update_autoscale_then_poll(
        &self,
        id: &ClusterId,
        autoscale: Option<&Autoscale>,
    ) -> ClientResult<()>;

    /// Update the gateway credentials and wait until done
    async fn update_gateway_settings_then_poll(
        &self,
        id: &ClusterId,
        settings: &UpdateGatewaySettingsParameters,
    ) -> ClientResult<()>;

    /// Delete a cluster and wait until it is gone
    async fn delete_then_poll(&self, id: &ClusterId) -> ClientResult<()>;

    /// Fetch every configuration section in one call
    async fn list_configurations(&self, id: &ClusterId) -> ClientResult<Configurations>;

    async fn get_monitoring_status(&self, id: &ClusterId) -> ClientResult<MonitoringStatus>;

    async fn enable_monitoring_then_poll(
        &self,
        id: &ClusterId,
        request: &MonitoringRequest,
    ) -> ClientResult<()>;

    async fn disable_monitoring_then_poll(&self, id: &ClusterId) -> ClientResult<()>;

    async fn get_azure_monitor_status(&self, id: &ClusterId) -> ClientResult<MonitoringStatus>;

    async fn enable_azure_monitor_then_poll(
        &self,
        id: &ClusterId,
        request: &MonitoringRequest,
    ) -> ClientResult<()>;

    async fn disable_azure_monitor_then_poll(&self, id: &ClusterId) -> ClientResult<()>;
}
