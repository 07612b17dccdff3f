//! HDInsight Provider
//!
//! Manages Azure HDInsight Spark clusters through the Azure Resource Manager
//! API.
//!
//! ## Module Structure
//!
//! - `provider` - HdInsightProvider create/read/update/delete orchestration
//! - `client` - Remote client trait and its error taxonomy
//! - `arm` - ARM REST implementation of the client
//! - `cluster` - Typed cluster settings, expand and flatten
//! - `mappings` - Expand/flatten pairs per settings block
//! - `schemas` - Attribute schemas
//! - `utils` - Helper functions for value normalization

pub mod arm;
pub mod attrs;
pub mod client;
pub mod cluster;
pub mod cluster_id;
pub mod config;
pub mod mappings;
pub mod models;
pub mod provider;
pub mod resources;
pub mod schemas;
pub mod utils;

// Re-export main types
pub use arm::ArmClient;
pub use client::{ClientError, ClientResult, ClusterClient};
pub use cluster::SparkCluster;
pub use cluster_id::ClusterId;
pub use config::{ProviderConfig, Timeouts};
pub use provider::HdInsightProvider;
pub use utils::{normalize_location, normalize_tier};

use hdinsight_core::provider::{BoxFuture, Provider, ProviderResult, ResourceType};
use hdinsight_core::resource::{Resource, ResourceId, State};

use resources::resource_types;

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl<C: ClusterClient> Provider for HdInsightProvider<C> {
    fn name(&self) -> &'static str {
        "azurerm"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        resource_types()
    }

    fn read<'a>(
        &'a self,
        id: &'a ResourceId,
        identifier: Option<&'a str>,
        prior: Option<&'a State>,
    ) -> BoxFuture<'a, ProviderResult<State>> {
        Box::pin(async move { self.read_resource(id, identifier, prior).await })
    }

    fn create<'a>(&'a self, resource: &'a Resource) -> BoxFuture<'a, ProviderResult<State>> {
        Box::pin(async move { self.create_resource(resource).await })
    }

    fn update<'a>(
        &'a self,
        id: &'a ResourceId,
        identifier: &'a str,
        from: &'a State,
        to: &'a Resource,
    ) -> BoxFuture<'a, ProviderResult<State>> {
        Box::pin(async move { self.update_resource(id, identifier, from, to).await })
    }

    fn delete<'a>(
        &'a self,
        id: &'a ResourceId,
        identifier: &'a str,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move { self.delete_resource(id, identifier).await })
    }
}
