//! Error types for the index server SDK

use thiserror::Error;

/// Reasons a selection could not be turned into a query string.
///
/// Always surfaced wrapped in [`IndexServerError::QueryConstructionFailed`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryBuildError {
    /// A list-valued criterion had no values to OR together
    #[error("value list for '{field}' is empty")]
    EmptyValueList { field: String },

    /// A field group with no member fields
    #[error("field group has no fields")]
    EmptyFieldGroup,

    /// The reserved keyword criterion must carry a raw text clause
    #[error("keyword criterion must be a text clause")]
    KeywordNotText,

    /// A value that cannot be rendered as a query term
    #[error("unsupported value for '{field}': {found}")]
    UnsupportedValue { field: String, found: String },

    /// Selection input was not a JSON object
    #[error("selection criteria must be a JSON object")]
    NotAnObject,
}

/// Errors that can occur while talking to an index server
#[derive(Error, Debug)]
pub enum IndexServerError {
    /// The query compiler failed while composing the query string
    #[error("Query construction failed: {source}")]
    QueryConstructionFailed {
        #[source]
        source: QueryBuildError,
    },

    /// An explicit node name is not part of the index server
    #[error("Node '{node}' not found in index server '{index_server}'")]
    NodeNotFound { node: String, index_server: String },

    /// A node-scoped operation on a multi-node index server without a node name
    #[error("Node name required for {operation} on multi-node index server '{index_server}'")]
    NodeNameRequired {
        operation: String,
        index_server: String,
    },

    /// The primary transport answered with an unsuccessful status
    #[error("Request to {url} rejected with HTTP {status}")]
    TransportRejected { status: u16, url: String },

    /// The remote-script fallback did not produce a usable payload
    #[error("Fallback query execution failed: {0}")]
    FallbackFailed(String),

    /// The backend payload carried an error object or non-zero status
    #[error("Index server reported an error: {0}")]
    BackendReportedError(String),

    /// Topology sequences are empty or of unequal length
    #[error("Invalid index server topology: {0}")]
    InvalidTopology(String),

    /// Operation not available on a cloud-mode index server
    #[error("{0} is not supported for solr cloud index servers")]
    UnsupportedForCloud(String),

    /// A successful response whose body did not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// HTTP transport errors (connection, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid caller input such as an empty core name
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IndexServerError {
    /// Wrap a compiler failure
    pub fn query_construction(source: QueryBuildError) -> Self {
        Self::QueryConstructionFailed { source }
    }

    /// Create a new node-not-found error
    pub fn node_not_found(node: impl Into<String>, index_server: impl Into<String>) -> Self {
        Self::NodeNotFound {
            node: node.into(),
            index_server: index_server.into(),
        }
    }

    /// Create a new node-name-required error
    pub fn node_name_required(
        operation: impl Into<String>,
        index_server: impl Into<String>,
    ) -> Self {
        Self::NodeNameRequired {
            operation: operation.into(),
            index_server: index_server.into(),
        }
    }

    /// Create a new fallback failure
    pub fn fallback_failed(msg: impl Into<String>) -> Self {
        Self::FallbackFailed(msg.into())
    }

    /// Create a new backend-reported error
    pub fn backend_error(msg: impl Into<String>) -> Self {
        Self::BackendReportedError(msg.into())
    }

    /// Create a new invalid topology error
    pub fn invalid_topology(msg: impl Into<String>) -> Self {
        Self::InvalidTopology(msg.into())
    }

    /// Create a new unexpected response error
    pub fn unexpected_response(msg: impl Into<String>) -> Self {
        Self::UnexpectedResponse(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<QueryBuildError> for IndexServerError {
    fn from(error: QueryBuildError) -> Self {
        IndexServerError::query_construction(error)
    }
}

/// Result type for index server operations
pub type IndexServerResult<T> = Result<T, IndexServerError>;
