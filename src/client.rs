use serde_json::Value;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::{IndexServerError, IndexServerResult};
use crate::executor::{CoreListing, QueryExecutor};
use crate::query::{compile, Projection, QueryParams, SelectionCriteria};
use crate::query_builder::SolrQueryBuilder;
use crate::topology::{IndexServerTopology, NodeRecord, NodeScope};
use crate::transport::{HttpTransport, ReqwestTransport, ScriptRunner};

/// Main client for querying and maintaining one index server
#[derive(Clone)]
pub struct IndexServerClient {
    /// Nodes of the index server
    topology: IndexServerTopology,

    /// Transport and fallback handling
    executor: QueryExecutor,

    config: ClientConfig,
}

impl IndexServerClient {
    /// Create a client talking to the nodes over HTTP
    pub fn new(topology: IndexServerTopology, config: ClientConfig) -> IndexServerResult<Self> {
        config.validate()?;
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_transport(topology, config, transport))
    }

    /// Create a client with a custom primary transport
    pub fn with_transport(
        topology: IndexServerTopology,
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let executor = QueryExecutor::new(transport).with_fallback_enabled(config.fallback_enabled);
        Self {
            topology,
            executor,
            config,
        }
    }

    /// Channel used to run forbidden reads from a proxy node
    pub fn with_script_runner(mut self, runner: Arc<dyn ScriptRunner>) -> Self {
        self.executor = self.executor.with_script_runner(runner);
        self
    }

    pub fn topology(&self) -> &IndexServerTopology {
        &self.topology
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get a query builder for a core
    pub fn query(&self, core: &str) -> SolrQueryBuilder<'_> {
        SolrQueryBuilder::new(self, core)
    }

    /// Look up a node by client name
    pub fn index_node(&self, node_name: &str) -> IndexServerResult<&NodeRecord> {
        self.topology.node(node_name).ok_or_else(|| {
            IndexServerError::node_not_found(node_name, self.topology.engine_name())
        })
    }

    /// Run a select query on `core`.
    ///
    /// Without `node`, the first node of the index server answers.
    pub async fn execute_query(
        &self,
        core: &str,
        node: Option<&str>,
        selection: &SelectionCriteria,
        projection: &Projection,
        params: &QueryParams,
    ) -> IndexServerResult<Value> {
        validate_core(core)?;
        let compiled = compile(selection, projection, params)?;
        let target = self.topology.resolve(node, NodeScope::Any, "query")?;
        self.executor.execute_read(&target, core, &compiled).await
    }

    /// Delete documents matching `selection` from `core`; all documents
    /// when `selection` is `None`.
    pub async fn delete_docs(
        &self,
        core: &str,
        selection: Option<&SelectionCriteria>,
    ) -> IndexServerResult<()> {
        validate_core(core)?;
        if self.topology.is_cloud() {
            return Err(IndexServerError::UnsupportedForCloud(
                "Deleting documents".to_string(),
            ));
        }

        let empty = SelectionCriteria::new();
        let compiled = compile(
            selection.unwrap_or(&empty),
            &Projection::new(),
            &QueryParams::new(),
        )?;
        let target = self.topology.resolve(None, NodeScope::Any, "delete by query")?;
        self.executor
            .execute_delete_by_query(&target, core, &compiled)
            .await
    }

    /// Hard commit `core` on the first node
    pub async fn hard_commit(&self, core: &str) -> IndexServerResult<()> {
        validate_core(core)?;
        if self.topology.is_cloud() {
            return Err(IndexServerError::UnsupportedForCloud(
                "Hard commit".to_string(),
            ));
        }

        let target = self.topology.resolve(None, NodeScope::Any, "hard commit")?;
        self.executor.execute_commit(&target, core).await
    }

    /// List the cores of a node. Multi-node index servers need `node`.
    pub async fn get_all_cores(&self, node: Option<&str>) -> IndexServerResult<CoreListing> {
        let target = self
            .topology
            .resolve(node, NodeScope::Required, "core listing")?;
        self.executor.list_cores(&target).await
    }

    /// Raw health summary of a node. Multi-node index servers need `node`.
    pub async fn get_health_indicators(&self, node: Option<&str>) -> IndexServerResult<String> {
        let target = self
            .topology
            .resolve(node, NodeScope::Required, "health summary")?;
        self.executor.health_summary(&target).await
    }
}

fn validate_core(core: &str) -> IndexServerResult<()> {
    if core.trim().is_empty() || core.contains('/') {
        return Err(IndexServerError::invalid_input(format!(
            "invalid core name '{}'",
            core
        )));
    }
    Ok(())
}
