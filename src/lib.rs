//! # Index Server SDK
//!
//! Client for clustered content-indexing servers that expose a Solr-style
//! REST interface. An index server is a group of nodes described by an
//! [`IndexServerTopology`]; the client compiles structured selection
//! criteria into select queries, picks the node to address and runs the
//! request over HTTP. Reads that a node answers with `403 Forbidden` are
//! retried by running a fetch script on the node itself through a
//! [`ScriptRunner`].
//!
//! ## Example
//!
//! ```no_run
//! use index_server_sdk::{ClientConfig, IndexServerClient, IndexServerTopology, NodeRecord};
//! use index_server_sdk::query::SelectionCriteria;
//!
//! # async fn run() -> index_server_sdk::IndexServerResult<()> {
//! let topology = IndexServerTopology::new(
//!     "search01",
//!     vec![NodeRecord::new("node1", "host1", "http://host1:20000", 20000, 2)],
//! )?;
//! let client = IndexServerClient::new(topology, ClientConfig::from_env())?;
//!
//! let result = client
//!     .query("mailcore")
//!     .filter(SelectionCriteria::new().field("owner", "alice"))
//!     .select(&["id", "subject"])
//!     .rows(20)
//!     .execute()
//!     .await?;
//! println!("{}", result);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod directory;
pub mod error;
pub mod executor;
pub mod logging;
pub mod query;
pub mod query_builder;
pub mod topology;
pub mod transport;

pub use client::IndexServerClient;
pub use config::{load_client_config, ClientConfig};
pub use directory::{find_by_name, topologies_from_listing, IndexServerEntry};
pub use error::{IndexServerError, IndexServerResult, QueryBuildError};
pub use executor::{CoreListing, QueryExecutor};
pub use query::{compile, CompiledQuery, Projection, QueryParams, SelectionCriteria};
pub use query_builder::SolrQueryBuilder;
pub use topology::{
    ExecutionTarget, IndexServerMode, IndexServerOsType, IndexServerTopology, NodeOsType,
    NodeRecord, NodeScope,
};
pub use transport::{HttpTransport, ReqwestTransport, RemoteScript, ScriptOutput, ScriptRunner};
