use serde_json::Value;

use crate::client::IndexServerClient;
use crate::error::IndexServerResult;
use crate::query::{
    compile, CompiledQuery, CriterionKey, CriterionValue, Projection, QueryParams, QueryValue,
    SelectionCriteria,
};

/// Builder for constructing and executing select queries
#[derive(Clone)]
pub struct SolrQueryBuilder<'a> {
    client: &'a IndexServerClient,

    /// Core to query
    core: String,

    /// Target node (None for the first node)
    node: Option<String>,

    selection: SelectionCriteria,

    /// Fields to retrieve
    fields: Projection,

    params: QueryParams,
}

impl<'a> SolrQueryBuilder<'a> {
    /// Create a new query builder
    pub fn new(client: &'a IndexServerClient, core: &str) -> Self {
        Self {
            client,
            core: core.to_string(),
            node: None,
            selection: SelectionCriteria::new(),
            fields: Projection::new(),
            params: QueryParams::new(),
        }
    }

    /// Select fields to retrieve
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Replace the selection criteria
    pub fn filter(mut self, selection: SelectionCriteria) -> Self {
        self.selection = selection;
        self
    }

    /// Add or replace one criterion
    pub fn matching(mut self, key: CriterionKey, value: impl Into<CriterionValue>) -> Self {
        self.selection.insert(key, value.into());
        self
    }

    /// Target a specific node
    pub fn on_node(mut self, node_name: &str) -> Self {
        self.node = Some(node_name.to_string());
        self
    }

    pub fn param(mut self, name: &str, value: impl Into<QueryValue>) -> Self {
        self.params = self.params.set(name, value);
        self
    }

    pub fn rows(self, rows: u32) -> Self {
        self.param("rows", rows)
    }

    pub fn start(self, start: u32) -> Self {
        self.param("start", start)
    }

    /// Compile without executing
    pub fn compile(&self) -> IndexServerResult<CompiledQuery> {
        compile(&self.selection, &self.fields, &self.params)
    }

    /// Execute the query
    pub async fn execute(&self) -> IndexServerResult<Value> {
        self.client
            .execute_query(
                &self.core,
                self.node.as_deref(),
                &self.selection,
                &self.fields,
                &self.params,
            )
            .await
    }
}
