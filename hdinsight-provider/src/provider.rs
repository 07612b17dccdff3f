//! HDInsight provider implementation
//!
//! Orchestrates the create, read, update and delete lifecycle of a Spark
//! cluster on top of a `ClusterClient`. Every remote call is bounded by the
//! deadline of the operation it belongs to.

use std::collections::HashMap;
use std::future::Future;

use hdinsight_core::provider::{ProviderError, ProviderResult};
use hdinsight_core::resource::{Resource, ResourceId, State, Value};
use tokio::time::Instant;

use crate::arm::ArmClient;
use crate::client::{ClientError, ClientResult, ClusterClient};
use crate::cluster::{RemoteCluster, SparkCluster};
use crate::cluster_id::ClusterId;
use crate::config::ProviderConfig;
use crate::mappings::roles::{check_worker_count, expand_worker_autoscale};
use crate::mappings::{MonitorConfig, SPARK_ROLES};
use crate::schemas::spark_cluster;

/// Run one remote call under the operation deadline
async fn within<T>(
    deadline: Instant,
    operation: &str,
    request: impl Future<Output = ClientResult<T>>,
) -> ProviderResult<ClientResult<T>> {
    tokio::time::timeout_at(deadline, request)
        .await
        .map_err(|_| ProviderError::timeout(format!("{}: deadline exceeded", operation)))
}

/// Like `within`, with client errors turned into provider errors. A missing
/// cluster stays distinguishable as not-found.
async fn call<T>(
    deadline: Instant,
    operation: &str,
    request: impl Future<Output = ClientResult<T>>,
) -> ProviderResult<T> {
    within(deadline, operation, request).await?.map_err(|e| {
        let error = if e.is_not_found() {
            ProviderError::not_found(operation)
        } else {
            ProviderError::remote(operation)
        };
        error.with_cause(e)
    })
}

fn validate_attributes(attributes: &HashMap<String, Value>) -> ProviderResult<()> {
    spark_cluster::schema().validate(attributes).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        ProviderError::validation(messages.join("; "))
    })
}

/// HDInsight Spark cluster provider
pub struct HdInsightProvider<C = ArmClient> {
    client: C,
    config: ProviderConfig,
}

impl HdInsightProvider<ArmClient> {
    /// Create a provider talking to Azure Resource Manager
    pub fn new(config: ProviderConfig) -> ProviderResult<Self> {
        let client = ArmClient::new(config.clone())
            .map_err(|e| ProviderError::remote("building the ARM client").with_cause(e))?;
        Ok(Self::with_client(config, client))
    }
}

impl<C: ClusterClient> HdInsightProvider<C> {
    pub fn with_client(config: ProviderConfig, client: C) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Read a cluster. A cluster that no longer exists yields a not-found
    /// state instead of an error.
    pub async fn read_resource(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
        prior: Option<&State>,
    ) -> ProviderResult<State> {
        let Some(identifier) = identifier else {
            return Ok(State::not_found(id.clone()));
        };
        let deadline = Instant::now() + self.config.timeouts.read;

        async {
            let cluster_id = ClusterId::parse(identifier)?;
            let prior = prior
                .filter(|p| p.exists && !p.attributes.is_empty())
                .map(|p| SparkCluster::from_attributes(&p.attributes))
                .transpose()?;
            self.read_cluster(id, &cluster_id, prior.as_ref(), deadline)
                .await
        }
        .await
        .map_err(|e| e.for_resource(id.clone()))
    }

    async fn read_cluster(
        &self,
        id: &ResourceId,
        cluster_id: &ClusterId,
        prior: Option<&SparkCluster>,
        deadline: Instant,
    ) -> ProviderResult<State> {
        let operation = format!("retrieving {}", cluster_id);
        let cluster = match within(deadline, &operation, self.client.get(cluster_id)).await? {
            Ok(cluster) => cluster,
            Err(e) if e.is_not_found() => {
                log::debug!("{} was not found - removing from state", cluster_id);
                return Ok(State::not_found(id.clone()));
            }
            Err(e) => return Err(ProviderError::remote(operation).with_cause(e)),
        };

        let configurations = call(
            deadline,
            &format!("retrieving configurations for {}", cluster_id),
            self.client.list_configurations(cluster_id),
        )
        .await?;
        let monitoring = call(
            deadline,
            &format!("retrieving monitoring status for {}", cluster_id),
            self.client.get_monitoring_status(cluster_id),
        )
        .await?;
        let azure_monitor = call(
            deadline,
            &format!("retrieving Azure Monitor extension status for {}", cluster_id),
            self.client.get_azure_monitor_status(cluster_id),
        )
        .await?;

        let flattened = SparkCluster::from_remote(
            RemoteCluster {
                id: cluster_id,
                cluster: &cluster,
                configurations: &configurations,
                monitoring: &monitoring,
                azure_monitor: &azure_monitor,
            },
            prior,
        )?;

        Ok(State::existing(id.clone(), flattened.to_attributes()).with_identifier(cluster_id.id()))
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Create a cluster. Once the cluster exists, later failures are
    /// reported as partial success carrying its identifier.
    pub async fn create_resource(&self, resource: &Resource) -> ProviderResult<State> {
        self.create_cluster(resource)
            .await
            .map_err(|e| e.for_resource(resource.id.clone()))
    }

    async fn create_cluster(&self, resource: &Resource) -> ProviderResult<State> {
        let deadline = Instant::now() + self.config.timeouts.create;

        validate_attributes(&resource.attributes)?;
        let cluster = SparkCluster::from_attributes(&resource.attributes)?;
        let params = cluster.create_parameters()?;
        let cluster_id = cluster.cluster_id(&self.config.subscription_id);

        let operation = format!("checking for presence of existing {}", cluster_id);
        match within(deadline, &operation, self.client.get(&cluster_id)).await? {
            Ok(_) => {
                return Err(ProviderError::conflict(format!(
                    "a resource with the ID {:?} already exists - needs to be imported into the state",
                    cluster_id.id()
                )));
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(ProviderError::remote(operation).with_cause(e)),
        }

        log::debug!("creating {}", cluster_id);
        call(
            deadline,
            &format!("creating {}", cluster_id),
            self.client.create_then_poll(&cluster_id, &params),
        )
        .await?;
        let identifier = cluster_id.id();
        log::info!("created {}", identifier);

        self.finish_create(resource, &cluster, &cluster_id, deadline)
            .await
            .map_err(|e| {
                log::warn!("{} was created but a follow-up step failed: {}", identifier, e);
                e.into_partial_success(identifier.clone())
            })
    }

    async fn finish_create(
        &self,
        resource: &Resource,
        cluster: &SparkCluster,
        cluster_id: &ClusterId,
        deadline: Instant,
    ) -> ProviderResult<State> {
        if let Some(monitor) = &cluster.monitor {
            self.enable_monitoring(cluster_id, monitor, deadline).await?;
        }
        if let Some(extension) = &cluster.extension {
            self.enable_azure_monitor(cluster_id, extension, deadline)
                .await?;
        }
        self.read_cluster(&resource.id, cluster_id, Some(cluster), deadline)
            .await
    }

    async fn enable_monitoring(
        &self,
        cluster_id: &ClusterId,
        monitor: &MonitorConfig,
        deadline: Instant,
    ) -> ProviderResult<()> {
        log::debug!("enabling monitoring for {}", cluster_id);
        call(
            deadline,
            &format!("enabling monitoring for {}", cluster_id),
            self.client
                .enable_monitoring_then_poll(cluster_id, &monitor.expand()),
        )
        .await
    }

    async fn enable_azure_monitor(
        &self,
        cluster_id: &ClusterId,
        extension: &MonitorConfig,
        deadline: Instant,
    ) -> ProviderResult<()> {
        log::debug!("enabling Azure Monitor extension for {}", cluster_id);
        call(
            deadline,
            &format!("enabling Azure Monitor extension for {}", cluster_id),
            self.client
                .enable_azure_monitor_then_poll(cluster_id, &extension.expand()),
        )
        .await
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Apply in-place changes. Attributes that can only be set at creation
    /// are rejected before any remote call.
    pub async fn update_resource(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        self.update_cluster(id, identifier, from, to)
            .await
            .map_err(|e| e.for_resource(id.clone()))
    }

    async fn update_cluster(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        let deadline = Instant::now() + self.config.timeouts.update;
        let cluster_id = ClusterId::parse(identifier)?;

        validate_attributes(&to.attributes)?;
        let current = SparkCluster::from_attributes(&from.attributes)?.normalized();
        let desired = SparkCluster::from_attributes(&to.attributes)?.normalized();

        let replaced = spark_cluster::schema()
            .replacement_paths(&current.to_attributes(), &desired.to_attributes());
        if !replaced.is_empty() {
            return Err(ProviderError::validation(format!(
                "changing {} requires replacement",
                replaced
                    .iter()
                    .map(|p| format!("`{}`", p))
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        let current_worker = &current.roles.worker_node;
        let desired_worker = &desired.roles.worker_node;
        let resize = desired_worker
            .target_instance_count
            .filter(|count| Some(*count) != current_worker.target_instance_count);
        if let Some(count) = resize {
            check_worker_count(count, &SPARK_ROLES)?;
        }
        let autoscale = if desired_worker.autoscale != current_worker.autoscale {
            Some(expand_worker_autoscale(desired_worker, &SPARK_ROLES)?)
        } else {
            None
        };

        if desired.tags != current.tags {
            log::debug!("updating tags of {}", cluster_id);
            call(
                deadline,
                &format!("updating tags of {}", cluster_id),
                self.client.update_tags(&cluster_id, &desired.tags),
            )
            .await?;
        }

        if let Some(count) = resize {
            log::debug!("resizing worker role of {} to {}", cluster_id, count);
            call(
                deadline,
                &format!("resizing worker role of {}", cluster_id),
                self.client.resize_then_poll(&cluster_id, count),
            )
            .await?;
        }

        if let Some(autoscale) = autoscale {
            log::debug!("updating autoscale of {}", cluster_id);
            call(
                deadline,
                &format!("updating autoscale configuration of {}", cluster_id),
                self.client
                    .update_autoscale_then_poll(&cluster_id, autoscale.as_ref()),
            )
            .await?;
        }

        if desired.gateway != current.gateway {
            log::debug!("updating gateway settings of {}", cluster_id);
            call(
                deadline,
                &format!("updating gateway settings of {}", cluster_id),
                self.client
                    .update_gateway_settings_then_poll(&cluster_id, &desired.gateway.expand_update()),
            )
            .await?;
        }

        if desired.monitor != current.monitor {
            match &desired.monitor {
                Some(monitor) => self.enable_monitoring(&cluster_id, monitor, deadline).await?,
                None => {
                    log::debug!("disabling monitoring for {}", cluster_id);
                    call(
                        deadline,
                        &format!("disabling monitoring for {}", cluster_id),
                        self.client.disable_monitoring_then_poll(&cluster_id),
                    )
                    .await?
                }
            }
        }

        if desired.extension != current.extension {
            match &desired.extension {
                Some(extension) => {
                    self.enable_azure_monitor(&cluster_id, extension, deadline)
                        .await?
                }
                None => {
                    log::debug!("disabling Azure Monitor extension for {}", cluster_id);
                    call(
                        deadline,
                        &format!("disabling Azure Monitor extension for {}", cluster_id),
                        self.client.disable_azure_monitor_then_poll(&cluster_id),
                    )
                    .await?
                }
            }
        }

        self.read_cluster(id, &cluster_id, Some(&desired), deadline)
            .await
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Delete a cluster. A cluster that is already gone counts as deleted.
    pub async fn delete_resource(&self, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        let deadline = Instant::now() + self.config.timeouts.delete;

        async {
            let cluster_id = ClusterId::parse(identifier)?;
            let operation = format!("deleting {}", cluster_id);
            match within(deadline, &operation, self.client.delete_then_poll(&cluster_id)).await? {
                Ok(()) => {
                    log::info!("deleted {}", cluster_id);
                    Ok(())
                }
                Err(ClientError::NotFound) => {
                    log::debug!("{} was already gone", cluster_id);
                    Ok(())
                }
                Err(e) => Err(ProviderError::remote(operation).with_cause(e)),
            }
        }
        .await
        .map_err(|e| e.for_resource(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use hdinsight_core::provider::ErrorKind;

    use crate::cluster::tests::spark_cluster;
    use crate::config::Timeouts;
    use crate::mappings::configurations::GATEWAY_SECTION;
    use crate::mappings::roles::{AutoscaleCapacity, NodeAutoscale, WORKER_NODE_ROLE};
    use crate::models::{
        Autoscale, Cluster, ClusterCreateParametersExtended, Configurations, MonitoringRequest,
        MonitoringStatus, UpdateGatewaySettingsParameters,
    };

    const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000000";

    /// In-memory management API that records every call
    #[derive(Default)]
    struct MockClient {
        clusters: Mutex<HashMap<ClusterId, (Cluster, Configurations)>>,
        monitoring: Mutex<HashMap<ClusterId, MonitoringStatus>>,
        azure_monitor: Mutex<HashMap<ClusterId, MonitoringStatus>>,
        created: Mutex<Vec<ClusterCreateParametersExtended>>,
        calls: Mutex<Vec<String>>,
        fail_monitoring: bool,
        stall_create: bool,
    }

    impl MockClient {
        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, call: &str) -> usize {
            self.calls().iter().filter(|c| *c == call).count()
        }

        fn with_cluster(&self, id: &ClusterId, cluster: &SparkCluster) {
            let params = cluster.create_parameters().unwrap();
            self.store(id, &params);
        }

        fn store(&self, id: &ClusterId, params: &ClusterCreateParametersExtended) {
            let configurations = params
                .properties
                .cluster_definition
                .as_ref()
                .and_then(|d| d.configurations.clone())
                .unwrap_or_default();
            self.clusters.lock().unwrap().insert(
                id.clone(),
                (Cluster::provisioned_from(&id.id(), params), configurations),
            );
        }

        fn update_worker(&self, id: &ClusterId, update: impl FnOnce(&mut crate::models::Role)) {
            let mut clusters = self.clusters.lock().unwrap();
            let (cluster, _) = clusters.get_mut(id).unwrap();
            let worker = cluster
                .properties
                .as_mut()
                .and_then(|p| p.compute_profile.as_mut())
                .and_then(|c| {
                    c.roles
                        .iter_mut()
                        .find(|r| r.name.eq_ignore_ascii_case(WORKER_NODE_ROLE))
                })
                .unwrap();
            update(worker);
        }
    }

    #[async_trait]
    impl ClusterClient for MockClient {
        async fn get(&self, id: &ClusterId) -> ClientResult<Cluster> {
            self.record("get");
            self.clusters
                .lock()
                .unwrap()
                .get(id)
                .map(|(c, _)| c.clone())
                .ok_or(ClientError::NotFound)
        }

        async fn create_then_poll(
            &self,
            id: &ClusterId,
            params: &ClusterCreateParametersExtended,
        ) -> ClientResult<()> {
            self.record("create");
            if self.stall_create {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
            }
            self.created.lock().unwrap().push(params.clone());
            self.store(id, params);
            Ok(())
        }

        async fn update_tags(
            &self,
            id: &ClusterId,
            tags: &BTreeMap<String, String>,
        ) -> ClientResult<()> {
            self.record("update_tags");
            let mut clusters = self.clusters.lock().unwrap();
            let (cluster, _) = clusters.get_mut(id).ok_or(ClientError::NotFound)?;
            cluster.tags = Some(tags.clone());
            Ok(())
        }

        async fn resize_then_poll(&self, id: &ClusterId, count: i64) -> ClientResult<()> {
            self.record("resize");
            self.update_worker(id, |worker| worker.target_instance_count = Some(count));
            Ok(())
        }

        async fn update_autoscale_then_poll(
            &self,
            id: &ClusterId,
            autoscale: Option<&Autoscale>,
        ) -> ClientResult<()> {
            self.record("update_autoscale");
            let autoscale = autoscale.cloned();
            self.update_worker(id, |worker| worker.autoscale = autoscale);
            Ok(())
        }

        async fn update_gateway_settings_then_poll(
            &self,
            id: &ClusterId,
            settings: &UpdateGatewaySettingsParameters,
        ) -> ClientResult<()> {
            self.record("update_gateway");
            let mut clusters = self.clusters.lock().unwrap();
            let (_, configurations) = clusters.get_mut(id).ok_or(ClientError::NotFound)?;
            let section = configurations
                .entry(GATEWAY_SECTION.to_string())
                .or_default();
            section.insert(
                "restAuthCredential.username".to_string(),
                settings.user_name.clone(),
            );
            section.insert(
                "restAuthCredential.password".to_string(),
                settings.password.clone(),
            );
            Ok(())
        }

        async fn delete_then_poll(&self, id: &ClusterId) -> ClientResult<()> {
            self.record("delete");
            self.clusters
                .lock()
                .unwrap()
                .remove(id)
                .map(|_| ())
                .ok_or(ClientError::NotFound)
        }

        async fn list_configurations(&self, id: &ClusterId) -> ClientResult<Configurations> {
            self.record("list_configurations");
            self.clusters
                .lock()
                .unwrap()
                .get(id)
                .map(|(_, c)| c.clone())
                .ok_or(ClientError::NotFound)
        }

        async fn get_monitoring_status(&self, id: &ClusterId) -> ClientResult<MonitoringStatus> {
            self.record("get_monitoring");
            Ok(self
                .monitoring
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .unwrap_or_default())
        }

        async fn enable_monitoring_then_poll(
            &self,
            id: &ClusterId,
            request: &MonitoringRequest,
        ) -> ClientResult<()> {
            self.record("enable_monitoring");
            if self.fail_monitoring {
                return Err(ClientError::Status {
                    status: 400,
                    code: "InvalidWorkspace".to_string(),
                    message: "workspace not found".to_string(),
                });
            }
            self.monitoring.lock().unwrap().insert(
                id.clone(),
                MonitoringStatus {
                    cluster_monitoring_enabled: Some(true),
                    workspace_id: Some(request.workspace_id.clone()),
                },
            );
            Ok(())
        }

        async fn disable_monitoring_then_poll(&self, id: &ClusterId) -> ClientResult<()> {
            self.record("disable_monitoring");
            self.monitoring.lock().unwrap().remove(id);
            Ok(())
        }

        async fn get_azure_monitor_status(&self, id: &ClusterId) -> ClientResult<MonitoringStatus> {
            self.record("get_azure_monitor");
            Ok(self
                .azure_monitor
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .unwrap_or_default())
        }

        async fn enable_azure_monitor_then_poll(
            &self,
            id: &ClusterId,
            request: &MonitoringRequest,
        ) -> ClientResult<()> {
            self.record("enable_azure_monitor");
            self.azure_monitor.lock().unwrap().insert(
                id.clone(),
                MonitoringStatus {
                    cluster_monitoring_enabled: Some(true),
                    workspace_id: Some(request.workspace_id.clone()),
                },
            );
            Ok(())
        }

        async fn disable_azure_monitor_then_poll(&self, id: &ClusterId) -> ClientResult<()> {
            self.record("disable_azure_monitor");
            self.azure_monitor.lock().unwrap().remove(id);
            Ok(())
        }
    }

    fn provider(client: MockClient) -> HdInsightProvider<MockClient> {
        HdInsightProvider::with_client(ProviderConfig::new(SUBSCRIPTION, "token"), client)
    }

    fn resource(cluster: &SparkCluster) -> Resource {
        Resource::new(spark_cluster::RESOURCE_TYPE, "main").with_attributes(cluster.to_attributes())
    }

    fn cluster_id() -> ClusterId {
        ClusterId::new(SUBSCRIPTION, "analytics", "spark01")
    }

    fn monitor() -> MonitorConfig {
        MonitorConfig {
            log_analytics_workspace_id: "5b6bd2a0-workspace".to_string(),
            primary_key: "cHJpbWFyeQ==".to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_read_spark_cluster() {
        let provider = provider(MockClient::default());
        let resource = resource(&spark_cluster());

        let state = provider.create_resource(&resource).await.unwrap();

        assert!(state.exists);
        assert_eq!(state.identifier, Some(cluster_id().id()));
        assert_eq!(provider.client().count("create"), 1);

        let created = provider.client().created.lock().unwrap()[0].clone();
        let definition = created.properties.cluster_definition.unwrap();
        assert_eq!(
            definition.component_version,
            Some(BTreeMap::from([("Spark".to_string(), "2.4".to_string())]))
        );
        let worker = created
            .properties
            .compute_profile
            .unwrap()
            .roles
            .into_iter()
            .find(|r| r.name == WORKER_NODE_ROLE)
            .unwrap();
        assert_eq!(worker.target_instance_count, Some(3));
        assert!(created.identity.is_none());

        let read = provider
            .read_resource(&resource.id, state.identifier.as_deref(), Some(&state))
            .await
            .unwrap();
        let cluster = SparkCluster::from_attributes(&read.attributes).unwrap();
        assert_eq!(cluster.component_version.spark, "2.4");
        assert_eq!(cluster.roles.worker_node.target_instance_count, Some(3));
        assert_eq!(cluster.tier, "Standard");
        assert_eq!(cluster.cluster_version, "4.0");
        assert_eq!(cluster.storage_accounts, spark_cluster().storage_accounts);
        assert_eq!(
            cluster.https_endpoint.as_deref(),
            Some("spark01.azurehdinsight.net")
        );
    }

    #[tokio::test]
    async fn create_existing_cluster_is_a_conflict() {
        let client = MockClient::default();
        client.with_cluster(&cluster_id(), &spark_cluster());
        let provider = provider(client);

        let err = provider
            .create_resource(&resource(&spark_cluster()))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(err.message.contains("already exists - needs to be imported"));
        assert_eq!(provider.client().calls(), vec!["get"]);
    }

    #[tokio::test]
    async fn invalid_settings_fail_before_any_call() {
        let mut cluster = spark_cluster();
        cluster.storage_accounts[0].is_default = false;
        let provider = provider(MockClient::default());

        let err = provider
            .create_resource(&resource(&cluster))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(provider.client().calls().is_empty());
    }

    #[tokio::test]
    async fn failing_monitoring_is_a_partial_success() {
        let client = MockClient {
            fail_monitoring: true,
            ..Default::default()
        };
        let provider = provider(client);
        let mut cluster = spark_cluster();
        cluster.monitor = Some(monitor());

        let err = provider
            .create_resource(&resource(&cluster))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::PartialSuccess);
        assert_eq!(err.identifier, Some(cluster_id().id()));
        assert_eq!(
            provider.client().calls(),
            vec!["get", "create", "enable_monitoring"]
        );
    }

    #[tokio::test]
    async fn monitoring_is_enabled_after_create() {
        let provider = provider(MockClient::default());
        let mut cluster = spark_cluster();
        cluster.monitor = Some(monitor());

        let state = provider.create_resource(&resource(&cluster)).await.unwrap();

        let calls = provider.client().calls();
        let create = calls.iter().position(|c| c == "create").unwrap();
        let enable = calls.iter().position(|c| c == "enable_monitoring").unwrap();
        assert!(create < enable);
        let read = SparkCluster::from_attributes(&state.attributes).unwrap();
        assert_eq!(read.monitor, Some(monitor()));
    }

    #[tokio::test(start_paused = true)]
    async fn create_times_out() {
        let client = MockClient {
            stall_create: true,
            ..Default::default()
        };
        let config = ProviderConfig::new(SUBSCRIPTION, "token").with_timeouts(Timeouts {
            create: Duration::from_secs(60),
            ..Default::default()
        });
        let provider = HdInsightProvider::with_client(config, client);

        let err = provider
            .create_resource(&resource(&spark_cluster()))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn read_of_deleted_cluster_clears_state() {
        let provider = provider(MockClient::default());
        let id = ResourceId::new(spark_cluster::RESOURCE_TYPE, "main");

        let state = provider
            .read_resource(&id, Some(&cluster_id().id()), None)
            .await
            .unwrap();

        assert!(!state.exists);
        assert_eq!(provider.client().calls(), vec!["get"]);
    }

    #[tokio::test]
    async fn read_rejects_malformed_identifier() {
        let provider = provider(MockClient::default());
        let id = ResourceId::new(spark_cluster::RESOURCE_TYPE, "main");

        let err = provider
            .read_resource(&id, Some("/subscriptions/x/clusters/y"), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(provider.client().calls().is_empty());
    }

    async fn created(provider: &HdInsightProvider<MockClient>) -> State {
        provider
            .create_resource(&resource(&spark_cluster()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn worker_resize_is_a_single_call() {
        let provider = provider(MockClient::default());
        let state = created(&provider).await;
        provider.client().calls.lock().unwrap().clear();

        let mut desired = spark_cluster();
        desired.roles.worker_node.target_instance_count = Some(5);
        let updated = provider
            .update_resource(
                &state.id,
                &cluster_id().id(),
                &state,
                &resource(&desired),
            )
            .await
            .unwrap();

        assert_eq!(provider.client().count("resize"), 1);
        assert_eq!(provider.client().count("update_tags"), 0);
        assert_eq!(provider.client().count("update_gateway"), 0);
        let cluster = SparkCluster::from_attributes(&updated.attributes).unwrap();
        assert_eq!(cluster.roles.worker_node.target_instance_count, Some(5));
    }

    #[tokio::test]
    async fn replacing_changes_are_rejected_without_calls() {
        let provider = provider(MockClient::default());
        let state = created(&provider).await;
        provider.client().calls.lock().unwrap().clear();

        let mut desired = spark_cluster();
        desired.component_version.spark = "3.1".to_string();
        desired.roles.worker_node.vm_size = "Standard_E8_V3".to_string();
        let err = provider
            .update_resource(
                &state.id,
                &cluster_id().id(),
                &state,
                &resource(&desired),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("requires replacement"));
        assert!(err.message.contains("`component_version.spark`"));
        assert!(err.message.contains("`roles.worker_node.vm_size`"));
        assert!(provider.client().calls().is_empty());
    }

    #[tokio::test]
    async fn vm_size_casing_does_not_force_replacement() {
        let provider = provider(MockClient::default());
        let state = created(&provider).await;
        let mut recorded = SparkCluster::from_attributes(&state.attributes).unwrap();
        recorded.roles.worker_node.vm_size = recorded.roles.worker_node.vm_size.to_lowercase();
        let state = State::existing(state.id.clone(), recorded.to_attributes())
            .with_identifier(cluster_id().id());
        provider.client().calls.lock().unwrap().clear();

        let mut desired = spark_cluster();
        desired.tags = BTreeMap::from([("env".to_string(), "prod".to_string())]);
        provider
            .update_resource(
                &state.id,
                &cluster_id().id(),
                &state,
                &resource(&desired),
            )
            .await
            .unwrap();

        assert_eq!(provider.client().count("update_tags"), 1);
        assert_eq!(provider.client().count("resize"), 0);
    }

    #[tokio::test]
    async fn update_applies_tags_gateway_and_autoscale() {
        let provider = provider(MockClient::default());
        let state = created(&provider).await;
        provider.client().calls.lock().unwrap().clear();

        let mut desired = spark_cluster();
        desired.tags = BTreeMap::from([("env".to_string(), "prod".to_string())]);
        desired.gateway.password = "N3wGatew4y!".to_string();
        desired.roles.worker_node.autoscale = Some(NodeAutoscale {
            capacity: Some(AutoscaleCapacity {
                min_instance_count: 3,
                max_instance_count: 8,
            }),
            recurrence: None,
        });
        let updated = provider
            .update_resource(
                &state.id,
                &cluster_id().id(),
                &state,
                &resource(&desired),
            )
            .await
            .unwrap();

        assert_eq!(provider.client().count("update_tags"), 1);
        assert_eq!(provider.client().count("update_gateway"), 1);
        assert_eq!(provider.client().count("update_autoscale"), 1);
        assert_eq!(provider.client().count("resize"), 0);
        let cluster = SparkCluster::from_attributes(&updated.attributes).unwrap();
        assert_eq!(cluster.tags, desired.tags);
        assert_eq!(cluster.gateway.password, "N3wGatew4y!");
        assert_eq!(cluster.roles.worker_node.autoscale, desired.roles.worker_node.autoscale);
    }

    #[tokio::test]
    async fn removing_monitor_disables_it() {
        let provider = provider(MockClient::default());
        let mut cluster = spark_cluster();
        cluster.monitor = Some(monitor());
        let state = provider.create_resource(&resource(&cluster)).await.unwrap();
        provider.client().calls.lock().unwrap().clear();

        let updated = provider
            .update_resource(
                &state.id,
                &cluster_id().id(),
                &state,
                &resource(&spark_cluster()),
            )
            .await
            .unwrap();

        assert_eq!(provider.client().count("disable_monitoring"), 1);
        assert!(!updated.attributes.contains_key("monitor"));
    }

    fn extension() -> MonitorConfig {
        MonitorConfig {
            log_analytics_workspace_id: "9c2e7a41-workspace".to_string(),
            primary_key: "ZXh0ZW5zaW9u".to_string(),
        }
    }

    #[tokio::test]
    async fn azure_monitor_is_enabled_after_create() {
        let provider = provider(MockClient::default());
        let mut cluster = spark_cluster();
        cluster.extension = Some(extension());

        let state = provider.create_resource(&resource(&cluster)).await.unwrap();

        let calls = provider.client().calls();
        let create = calls.iter().position(|c| c == "create").unwrap();
        let enable = calls
            .iter()
            .position(|c| c == "enable_azure_monitor")
            .unwrap();
        assert!(create < enable);
        let created = SparkCluster::from_attributes(&state.attributes).unwrap();
        assert_eq!(created.extension, Some(extension()));
        assert_eq!(created.monitor, None);

        // The primary key is never returned and comes from the prior state
        let read = provider
            .read_resource(&state.id, Some(&cluster_id().id()), Some(&state))
            .await
            .unwrap();
        let read = SparkCluster::from_attributes(&read.attributes).unwrap();
        assert_eq!(read.extension, Some(extension()));
    }

    #[tokio::test]
    async fn adding_extension_enables_it() {
        let provider = provider(MockClient::default());
        let state = created(&provider).await;
        provider.client().calls.lock().unwrap().clear();

        let mut desired = spark_cluster();
        desired.extension = Some(extension());
        let updated = provider
            .update_resource(
                &state.id,
                &cluster_id().id(),
                &state,
                &resource(&desired),
            )
            .await
            .unwrap();

        assert_eq!(provider.client().count("enable_azure_monitor"), 1);
        assert_eq!(provider.client().count("enable_monitoring"), 0);
        let cluster = SparkCluster::from_attributes(&updated.attributes).unwrap();
        assert_eq!(cluster.extension, Some(extension()));
    }

    #[tokio::test]
    async fn removing_extension_disables_it() {
        let provider = provider(MockClient::default());
        let mut cluster = spark_cluster();
        cluster.extension = Some(extension());
        let state = provider.create_resource(&resource(&cluster)).await.unwrap();
        provider.client().calls.lock().unwrap().clear();

        let updated = provider
            .update_resource(
                &state.id,
                &cluster_id().id(),
                &state,
                &resource(&spark_cluster()),
            )
            .await
            .unwrap();

        assert_eq!(provider.client().count("disable_azure_monitor"), 1);
        assert_eq!(provider.client().count("disable_monitoring"), 0);
        assert!(!updated.attributes.contains_key("extension"));
        assert!(provider.client().azure_monitor.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_of_vanished_cluster_is_not_found() {
        let provider = provider(MockClient::default());
        let state = created(&provider).await;
        provider.client().clusters.lock().unwrap().clear();
        provider.client().calls.lock().unwrap().clear();

        let mut desired = spark_cluster();
        desired.tags = BTreeMap::from([("env".to_string(), "prod".to_string())]);
        let err = provider
            .update_resource(
                &state.id,
                &cluster_id().id(),
                &state,
                &resource(&desired),
            )
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(err.message.contains("updating tags"));
        assert_eq!(provider.client().calls(), vec!["update_tags"]);
    }

    #[tokio::test]
    async fn delete_tolerates_missing_cluster() {
        let provider = provider(MockClient::default());
        let state = created(&provider).await;

        provider
            .delete_resource(&state.id, &cluster_id().id())
            .await
            .unwrap();
        provider
            .delete_resource(&state.id, &cluster_id().id())
            .await
            .unwrap();

        assert_eq!(provider.client().count("delete"), 2);
        let read = provider
            .read_resource(&state.id, Some(&cluster_id().id()), Some(&state))
            .await
            .unwrap();
        assert!(!read.exists);
    }
}
