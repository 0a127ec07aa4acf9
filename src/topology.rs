//! Index server topology and node resolution.
//!
//! A topology is an ordered list of [`NodeRecord`]s. Position 0 is the
//! default node for operations that are not node-scoped.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IndexServerError, IndexServerResult};

/// Server type reported for solr cloud index servers
pub const CLOUD_SERVER_TYPE: i64 = 5;

/// Operating system of a single node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeOsType {
    Windows,
    Unix,
}

impl NodeOsType {
    /// Classify a free-form OS description such as "Windows Server 2019"
    pub fn from_os_info(info: &str) -> Self {
        if info.to_lowercase().contains("windows") {
            NodeOsType::Windows
        } else {
            NodeOsType::Unix
        }
    }
}

/// Operating system mix across all nodes of an index server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexServerOsType {
    Windows,
    Unix,
    Mixed,
}

impl fmt::Display for IndexServerOsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexServerOsType::Windows => write!(f, "Windows"),
            IndexServerOsType::Unix => write!(f, "Unix"),
            IndexServerOsType::Mixed => write!(f, "Mixed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexServerMode {
    Standalone,
    Cloud,
}

/// One physical member of an index server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub client_name: String,
    pub host_name: String,
    pub server_url: String,
    pub base_port: u32,
    pub client_id: i64,
    #[serde(default)]
    pub os_type: Option<NodeOsType>,
}

impl NodeRecord {
    pub fn new(
        client_name: &str,
        host_name: &str,
        server_url: &str,
        base_port: u32,
        client_id: i64,
    ) -> Self {
        Self {
            client_name: client_name.to_string(),
            host_name: host_name.to_string(),
            server_url: server_url.to_string(),
            base_port,
            client_id,
            os_type: None,
        }
    }

    pub fn with_os_type(mut self, os_type: NodeOsType) -> Self {
        self.os_type = Some(os_type);
        self
    }
}

/// Whether an operation must name its node on a multi-node index server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeScope {
    /// Defaults to the first node when no name is given
    Any,
    /// Health and core listing: multi-node servers need an explicit name
    Required,
}

/// Node selected for one call
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionTarget {
    pub base_url: String,
    pub node_name: String,
    pub os_type: Option<NodeOsType>,
}

/// Topology of a logical index server
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexServerTopology {
    engine_name: String,
    cloud_name: String,
    cloud_id: i64,
    server_type: i64,
    nodes: Vec<NodeRecord>,
}

impl IndexServerTopology {
    /// Create a standalone topology. At least one node is required.
    pub fn new(engine_name: &str, nodes: Vec<NodeRecord>) -> IndexServerResult<Self> {
        if nodes.is_empty() {
            return Err(IndexServerError::invalid_topology(format!(
                "index server '{}' has no nodes",
                engine_name
            )));
        }
        Ok(Self {
            engine_name: engine_name.to_string(),
            cloud_name: engine_name.to_string(),
            cloud_id: 0,
            server_type: 1,
            nodes,
        })
    }

    /// Create a topology from per-attribute sequences, index `i` of each
    /// describing the same node.
    pub fn from_parallel(
        engine_name: &str,
        client_names: Vec<String>,
        host_names: Vec<String>,
        server_urls: Vec<String>,
        base_ports: Vec<u32>,
        client_ids: Vec<i64>,
    ) -> IndexServerResult<Self> {
        let count = client_names.len();
        let lengths = [
            ("hostName", host_names.len()),
            ("serverURL", server_urls.len()),
            ("basePort", base_ports.len()),
            ("clientId", client_ids.len()),
        ];
        if let Some((name, len)) = lengths.iter().find(|(_, len)| *len != count) {
            return Err(IndexServerError::invalid_topology(format!(
                "'{}' has {} entries but clientName has {}",
                name, len, count
            )));
        }

        let nodes = client_names
            .into_iter()
            .zip(host_names)
            .zip(server_urls)
            .zip(base_ports)
            .zip(client_ids)
            .map(
                |((((client_name, host_name), server_url), base_port), client_id)| NodeRecord {
                    client_name,
                    host_name,
                    server_url,
                    base_port,
                    client_id,
                    os_type: None,
                },
            )
            .collect();
        Self::new(engine_name, nodes)
    }

    pub fn with_cloud_name(mut self, cloud_name: &str) -> Self {
        self.cloud_name = cloud_name.to_string();
        self
    }

    pub fn with_cloud_id(mut self, cloud_id: i64) -> Self {
        self.cloud_id = cloud_id;
        self
    }

    pub fn with_server_type(mut self, server_type: i64) -> Self {
        self.server_type = server_type;
        self
    }

    pub(crate) fn push_node(&mut self, node: NodeRecord) {
        self.nodes.push(node);
    }

    pub fn engine_name(&self) -> &str {
        &self.engine_name
    }

    pub fn cloud_name(&self) -> &str {
        &self.cloud_name
    }

    pub fn cloud_id(&self) -> i64 {
        self.cloud_id
    }

    pub fn server_type(&self) -> i64 {
        self.server_type
    }

    pub fn mode(&self) -> IndexServerMode {
        if self.server_type == CLOUD_SERVER_TYPE {
            IndexServerMode::Cloud
        } else {
            IndexServerMode::Standalone
        }
    }

    pub fn is_cloud(&self) -> bool {
        self.mode() == IndexServerMode::Cloud
    }

    /// More than one node, or cloud mode
    pub fn is_multi_node(&self) -> bool {
        self.is_cloud() || self.nodes.len() > 1
    }

    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn first_node(&self) -> &NodeRecord {
        // Construction guarantees at least one node
        &self.nodes[0]
    }

    pub fn node(&self, client_name: &str) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| n.client_name == client_name)
    }

    /// Record the OS of a node once it is known
    pub fn set_node_os_type(
        &mut self,
        client_name: &str,
        os_type: NodeOsType,
    ) -> IndexServerResult<()> {
        match self.nodes.iter_mut().find(|n| n.client_name == client_name) {
            Some(node) => {
                node.os_type = Some(os_type);
                Ok(())
            }
            None => Err(IndexServerError::node_not_found(client_name, &self.engine_name)),
        }
    }

    pub fn client_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.client_name.as_str()).collect()
    }

    pub fn server_urls(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.server_url.as_str()).collect()
    }

    /// Collection name of the multi-node file system index
    pub fn fs_collection(&self) -> String {
        let name: String = self
            .cloud_name
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        format!("fsindex_{}_multinode", name)
    }

    /// OS mix across nodes, judged from the first node's OS.
    ///
    /// `None` when the first node's OS is unknown.
    pub fn os_type(&self) -> Option<IndexServerOsType> {
        let first = self.first_node().os_type?;
        let differs = self.nodes[1..]
            .iter()
            .any(|n| n.os_type.map_or(false, |os| os != first));
        Some(match (first, differs) {
            (_, true) => IndexServerOsType::Mixed,
            (NodeOsType::Windows, false) => IndexServerOsType::Windows,
            (NodeOsType::Unix, false) => IndexServerOsType::Unix,
        })
    }

    /// Pick the node to address.
    ///
    /// `operation` names the call in errors and logs.
    pub fn resolve(
        &self,
        node_name: Option<&str>,
        scope: NodeScope,
        operation: &str,
    ) -> IndexServerResult<ExecutionTarget> {
        let node = match node_name {
            None => {
                if scope == NodeScope::Required && self.is_multi_node() {
                    return Err(IndexServerError::node_name_required(
                        operation,
                        &self.engine_name,
                    ));
                }
                self.first_node()
            }
            Some(name) => self
                .node(name)
                .ok_or_else(|| IndexServerError::node_not_found(name, &self.engine_name))?,
        };

        crate::log_topology_debug!(
            "Resolved {} on '{}' to node '{}' ({})",
            operation,
            self.engine_name,
            node.client_name,
            node.server_url
        );

        Ok(ExecutionTarget {
            base_url: node.server_url.clone(),
            node_name: node.client_name.clone(),
            os_type: node.os_type,
        })
    }
}

/// Resolve the target node of a call. See [`IndexServerTopology::resolve`].
pub fn resolve(
    topology: &IndexServerTopology,
    node_name: Option<&str>,
    scope: NodeScope,
) -> IndexServerResult<ExecutionTarget> {
    topology.resolve(node_name, scope, "request")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_nodes() -> IndexServerTopology {
        IndexServerTopology::from_parallel(
            "is1",
            vec!["n1".to_string(), "n2".to_string()],
            vec!["h1".to_string(), "h2".to_string()],
            vec!["u1".to_string(), "u2".to_string()],
            vec![20000, 20001],
            vec![11, 12],
        )
        .unwrap()
    }

    fn one_node() -> IndexServerTopology {
        IndexServerTopology::new(
            "single",
            vec![NodeRecord::new("n1", "h1", "http://h1:20000", 20000, 1)],
        )
        .unwrap()
    }

    #[test]
    fn test_explicit_node_selects_same_index() {
        let target = resolve(&two_nodes(), Some("n2"), NodeScope::Any).unwrap();
        assert_eq!(target.base_url, "u2");
        assert_eq!(target.node_name, "n2");
    }

    #[test]
    fn test_unknown_node_is_not_found() {
        let err = resolve(&two_nodes(), Some("n3"), NodeScope::Any).unwrap_err();
        assert!(matches!(err, IndexServerError::NodeNotFound { ref node, .. } if node == "n3"));
    }

    #[test]
    fn test_node_names_are_case_sensitive() {
        assert!(resolve(&two_nodes(), Some("N2"), NodeScope::Any).is_err());
    }

    #[test]
    fn test_default_is_first_node() {
        let target = resolve(&one_node(), None, NodeScope::Required).unwrap();
        assert_eq!(target.node_name, "n1");

        let target = resolve(&two_nodes(), None, NodeScope::Any).unwrap();
        assert_eq!(target.base_url, "u1");
    }

    #[test]
    fn test_node_scoped_call_requires_name_on_multi_node() {
        let err = two_nodes()
            .resolve(None, NodeScope::Required, "core listing")
            .unwrap_err();
        assert!(matches!(err, IndexServerError::NodeNameRequired { .. }));
    }

    #[test]
    fn test_cloud_single_node_requires_name() {
        let topology = one_node().with_server_type(CLOUD_SERVER_TYPE);
        assert!(topology.is_multi_node());
        assert!(topology.resolve(None, NodeScope::Required, "health").is_err());
    }

    #[test]
    fn test_unequal_sequences_rejected() {
        let err = IndexServerTopology::from_parallel(
            "bad",
            vec!["n1".to_string(), "n2".to_string()],
            vec!["h1".to_string(), "h2".to_string()],
            vec!["u1".to_string()],
            vec![1, 2],
            vec![1, 2],
        )
        .unwrap_err();
        assert!(matches!(err, IndexServerError::InvalidTopology(_)));
    }

    #[test]
    fn test_empty_topology_rejected() {
        assert!(IndexServerTopology::new("empty", Vec::new()).is_err());
    }

    #[test]
    fn test_fs_collection_name() {
        let topology = one_node().with_cloud_name("my-cloud_01");
        assert_eq!(topology.fs_collection(), "fsindex_mycloud01_multinode");
    }

    #[test]
    fn test_os_type_mix() {
        let mut topology = two_nodes();
        assert_eq!(topology.os_type(), None);

        topology.set_node_os_type("n1", NodeOsType::Windows).unwrap();
        assert_eq!(topology.os_type(), Some(IndexServerOsType::Windows));

        topology
            .set_node_os_type("n2", NodeOsType::from_os_info("Linux x86_64"))
            .unwrap();
        assert_eq!(topology.os_type(), Some(IndexServerOsType::Mixed));

        assert!(matches!(
            topology.set_node_os_type("n9", NodeOsType::Unix),
            Err(IndexServerError::NodeNotFound { .. })
        ));
    }
}
