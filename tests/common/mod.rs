//! Helpers shared by the integration tests

#![allow(dead_code)]

use index_server_sdk::transport::{MockScriptRunner, MockTransport};
use index_server_sdk::{ClientConfig, IndexServerClient, IndexServerTopology, NodeOsType, NodeRecord};
use std::sync::Arc;

pub fn single_node() -> IndexServerTopology {
    IndexServerTopology::new(
        "is1",
        vec![NodeRecord::new("n1", "h1", "http://h1:20000", 20000, 11)],
    )
    .unwrap()
}

pub fn two_nodes() -> IndexServerTopology {
    IndexServerTopology::new(
        "is2",
        vec![
            NodeRecord::new("n1", "h1", "http://h1:20000", 20000, 11)
                .with_os_type(NodeOsType::Windows),
            NodeRecord::new("n2", "h2", "http://h2:20000/", 20000, 12)
                .with_os_type(NodeOsType::Unix),
        ],
    )
    .unwrap()
}

pub fn client_with(
    topology: IndexServerTopology,
    transport: Arc<MockTransport>,
    runner: Option<Arc<MockScriptRunner>>,
) -> IndexServerClient {
    let client = IndexServerClient::with_transport(topology, ClientConfig::default(), transport);
    match runner {
        Some(runner) => client.with_script_runner(runner),
        None => client,
    }
}
